//! Harvest orchestration.
//!
//! Wires the input reader, the worker pool, the certificate fetcher and the
//! output writer together for one run.

mod dispatcher;

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::app::{log_progress, print_error_statistics, print_summary, shutdown_gracefully};
use crate::config::{Config, HarvestSettings, OutputFormat, LOGGING_INTERVAL, QUEUE_CAPACITY_FACTOR};
use crate::domain::NameSet;
use crate::error_handling::ProcessingStats;
use crate::initialization::init_resolver;
use crate::models::{HarvestReport, HarvestResult};
use crate::tls::CertificateFetcher;

pub use dispatcher::{DispatchSummary, Dispatcher};

/// Runs a harvest over newline-delimited hostnames read from `input`.
///
/// Every discovered name is written to `output`, either one per line or as
/// one JSON object per hostname.
///
/// # Errors
///
/// Returns an error if the configuration is invalid (nothing is dispatched
/// in that case), if the TLS client or resolver cannot be built, or if
/// writing the output fails. Per-port connection failures are logged and
/// counted, never returned.
///
/// # Example
///
/// ```no_run
/// use cert_harvest::{run_harvest, Config};
/// use tokio::io::BufReader;
///
/// # async fn example() -> anyhow::Result<()> {
/// let input = BufReader::new(&b"example.com\nexample.org\n"[..]);
/// let config = Config {
///     ports: "443,8443".to_string(),
///     ..Default::default()
/// };
/// let report = run_harvest(config, input, tokio::io::stdout()).await?;
/// println!("{} names", report.names_written);
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest<R, W>(config: Config, input: R, output: W) -> Result<HarvestReport>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let settings = config.validate().context("Invalid configuration")?;
    run_harvest_with_settings(settings, input, output).await
}

/// Runs a harvest with already validated settings.
///
/// Allows overriding what the command line does not expose, such as the
/// resolver pool.
///
/// # Errors
///
/// See [`run_harvest`].
pub async fn run_harvest_with_settings<R, W>(
    settings: HarvestSettings,
    input: R,
    output: W,
) -> Result<HarvestReport>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let start_time = std::time::Instant::now();
    let stats = Arc::new(ProcessingStats::new());

    let resolver = init_resolver(&settings).context("Failed to initialize DNS resolver")?;
    let fetcher = Arc::new(
        CertificateFetcher::new(resolver, settings.fetch, Arc::clone(&stats))
            .context("Failed to initialize TLS client")?,
    );
    info!(
        "Harvesting ports {:?} with {} workers",
        settings.ports, settings.workers
    );

    let (result_tx, result_rx) = mpsc::channel(settings.workers * QUEUE_CAPACITY_FACTOR);
    let writer = tokio::spawn(write_results(
        result_rx,
        output,
        settings.output_format,
        settings.unique,
    ));

    let completed_hosts = Arc::new(AtomicUsize::new(0));
    let hosts_with_names = Arc::new(AtomicUsize::new(0));
    let failed_ports = Arc::new(AtomicUsize::new(0));

    let cancel = CancellationToken::new();
    let cancel_logging = cancel.child_token();
    let completed_for_logging = Arc::clone(&completed_hosts);
    let logging_task = tokio::task::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(LOGGING_INTERVAL));
        // The first tick fires immediately
        interval.tick().await;
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    log_progress(start_time, &completed_for_logging);
                }
                _ = cancel_logging.cancelled() => {
                    break;
                }
            }
        }
    });

    let mut dispatcher = {
        let ports = Arc::clone(&settings.ports);
        let completed_hosts = Arc::clone(&completed_hosts);
        let hosts_with_names = Arc::clone(&hosts_with_names);
        let failed_ports = Arc::clone(&failed_ports);
        Dispatcher::spawn(settings.workers, move |host: String| {
            let fetcher = Arc::clone(&fetcher);
            let ports = Arc::clone(&ports);
            let result_tx = result_tx.clone();
            let completed_hosts = Arc::clone(&completed_hosts);
            let hosts_with_names = Arc::clone(&hosts_with_names);
            let failed_ports = Arc::clone(&failed_ports);
            async move {
                let result = fetcher.fetch_names(&host, &ports).await;
                completed_hosts.fetch_add(1, Ordering::SeqCst);
                failed_ports.fetch_add(result.failed_ports, Ordering::SeqCst);
                if !result.names.is_empty() {
                    hosts_with_names.fetch_add(1, Ordering::SeqCst);
                }
                if result_tx.send(result).await.is_err() {
                    warn!("Output writer stopped, dropping names for {host}");
                }
            }
        })
    };

    let mut lines = input.lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                warn!("Skipping unreadable input line: {e}");
                continue;
            }
            Err(e) => {
                warn!("Failed to read input, stopping: {e}");
                break;
            }
        };

        let Some(host) = normalize_host(&line) else {
            continue;
        };
        if let Err(e) = dispatcher.submit(host).await {
            warn!("Worker pool closed, dropping {}", e.0);
            break;
        }
    }

    let summary = dispatcher.finish().await;
    debug!("Dispatch finished: {summary:?}");
    shutdown_gracefully(cancel, Some(logging_task)).await;
    log_progress(start_time, &completed_hosts);

    // Every result sender lived in the worker handler, so the writer sees
    // the channel close once the workers are gone.
    let names_written = writer
        .await
        .context("Output writer panicked")?
        .context("Failed to write output")?;

    if settings.show_stats {
        print_error_statistics(&stats);
    }

    let report = HarvestReport {
        total_hosts: summary.submitted,
        hosts_with_names: hosts_with_names.load(Ordering::SeqCst),
        failed_ports: failed_ports.load(Ordering::SeqCst),
        names_written,
        elapsed_seconds: start_time.elapsed().as_secs_f64(),
    };
    print_summary(&report);

    Ok(report)
}

/// Trims and lower-cases one input line; `None` for blanks and `#` comments.
fn normalize_host(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    Some(trimmed.to_lowercase())
}

/// Serializes results to `output` until every worker has hung up.
///
/// Returns the number of names written.
async fn write_results<W>(
    mut results: mpsc::Receiver<HarvestResult>,
    output: W,
    format: OutputFormat,
    unique: bool,
) -> io::Result<usize>
where
    W: AsyncWrite + Unpin,
{
    let mut out = BufWriter::new(output);
    let mut seen = unique.then(NameSet::new);
    let mut written = 0;

    while let Some(mut result) = results.recv().await {
        if let Some(seen) = seen.as_mut() {
            result.names.retain(|name| seen.insert(name));
        }

        match format {
            OutputFormat::Plain => {
                for name in &result.names {
                    out.write_all(name.as_bytes()).await?;
                    out.write_all(b"\n").await?;
                }
            }
            OutputFormat::Jsonl => {
                let line = serde_json::to_string(&result).map_err(io::Error::other)?;
                out.write_all(line.as_bytes()).await?;
                out.write_all(b"\n").await?;
            }
        }
        written += result.names.len();
        out.flush().await?;
    }

    out.flush().await?;
    Ok(written)
}
