//! End-to-end harvesting runs over in-memory input.

mod helpers;

use std::net::{Ipv4Addr, SocketAddr};

use cert_harvest::{run_harvest, run_harvest_with_settings, Config, HarvestSettings, OutputFormat};
use helpers::{fast_settings, make_certificate, spawn_mock_dns, spawn_tls_server, unused_port};
use tokio::io::{AsyncReadExt, BufReader};

fn settings(ports: &[u16], dns: SocketAddr) -> HarvestSettings {
    let mut settings = Config::default().validate().unwrap();
    settings.ports = ports.into();
    settings.workers = 3;
    settings.fetch = fast_settings();
    settings.resolvers = vec![dns];
    settings
}

/// Runs a harvest and returns the report together with everything written.
async fn harvest(
    settings: HarvestSettings,
    input: &'static str,
) -> (cert_harvest::HarvestReport, String) {
    let (output, mut reader) = tokio::io::duplex(1024);
    let collect = tokio::spawn(async move {
        let mut text = String::new();
        reader.read_to_string(&mut text).await.unwrap();
        text
    });

    let report = run_harvest_with_settings(settings, BufReader::new(input.as_bytes()), output)
        .await
        .unwrap();
    (report, collect.await.unwrap())
}

#[tokio::test]
async fn test_harvest_writes_names_for_every_host() {
    let dns = spawn_mock_dns("mock.test", Ipv4Addr::LOCALHOST).await;
    let port = spawn_tls_server(make_certificate(
        Some("*.mock.test"),
        &["www.mock.test", "*.other.test"],
    ))
    .await;

    let input = "Mock.Test\n\n# skipped\n   \n127.0.0.1\n";
    let (report, text) = harvest(settings(&[port], dns), input).await;

    assert_eq!(report.total_hosts, 2);
    assert_eq!(report.hosts_with_names, 2);
    assert_eq!(report.failed_ports, 0);
    assert_eq!(report.names_written, 6);

    let mut lines: Vec<&str> = text.lines().collect();
    lines.sort_unstable();
    assert_eq!(
        lines,
        vec![
            "mock.test",
            "mock.test",
            "other.test",
            "other.test",
            "www.mock.test",
            "www.mock.test"
        ]
    );
}

#[tokio::test]
async fn test_unique_prints_each_name_once() {
    let dns = spawn_mock_dns("mock.test", Ipv4Addr::LOCALHOST).await;
    let port = spawn_tls_server(make_certificate(Some("mock.test"), &["api.mock.test"])).await;

    let mut settings = settings(&[port], dns);
    settings.unique = true;
    let (report, text) = harvest(settings, "mock.test\n127.0.0.1\nMOCK.TEST\n").await;

    assert_eq!(report.total_hosts, 3);
    assert_eq!(report.names_written, 2);
    let mut lines: Vec<&str> = text.lines().collect();
    lines.sort_unstable();
    assert_eq!(lines, vec!["api.mock.test", "mock.test"]);
}

#[tokio::test]
async fn test_jsonl_output() {
    let dns = spawn_mock_dns("mock.test", Ipv4Addr::LOCALHOST).await;
    let port = spawn_tls_server(make_certificate(Some("mock.test"), &["a.mock.test"])).await;

    let mut settings = settings(&[port], dns);
    settings.output_format = OutputFormat::Jsonl;
    let (_, text) = harvest(settings, "mock.test\n").await;

    let value: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
    assert_eq!(value["host"], "mock.test");
    assert_eq!(value["names"], serde_json::json!(["mock.test", "a.mock.test"]));
}

#[tokio::test]
async fn test_failures_are_reported_not_returned() {
    let dns = spawn_mock_dns("mock.test", Ipv4Addr::LOCALHOST).await;
    let closed = unused_port();

    let (report, text) = harvest(settings(&[closed], dns), "mock.test\nnowhere.test\n").await;

    assert_eq!(report.total_hosts, 2);
    assert_eq!(report.hosts_with_names, 0);
    assert_eq!(report.failed_ports, 2);
    assert_eq!(report.names_written, 0);
    assert!(text.is_empty());
}

#[tokio::test]
async fn test_empty_input() {
    let dns = spawn_mock_dns("mock.test", Ipv4Addr::LOCALHOST).await;
    let (report, text) = harvest(settings(&[443], dns), "").await;
    assert_eq!(report.total_hosts, 0);
    assert!(text.is_empty());
}

#[tokio::test]
async fn test_invalid_config_dispatches_nothing() {
    let config = Config {
        threads: 0,
        ..Default::default()
    };
    let result = run_harvest(
        config,
        BufReader::new(&b"example.com\n"[..]),
        tokio::io::sink(),
    )
    .await;
    let err = result.unwrap_err();
    assert!(format!("{err:#}").contains("Worker count"), "got {err:#}");
}
