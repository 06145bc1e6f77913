//! Input source selection.

use std::path::Path;
use std::pin::Pin;

use anyhow::{Context, Result};
use log::info;
use tokio::io::{AsyncBufRead, BufReader};

/// Line-oriented hostname source.
pub type HostInput = Pin<Box<dyn AsyncBufRead + Send>>;

/// Opens the hostname source: stdin for `-`, the named file otherwise.
///
/// # Errors
///
/// Returns an error if the file cannot be opened.
pub async fn open_input(path: &Path) -> Result<HostInput> {
    if path.as_os_str() == "-" {
        info!("Reading hostnames from stdin");
        return Ok(Box::pin(BufReader::new(tokio::io::stdin())));
    }

    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("Failed to open input file {}", path.display()))?;
    info!("Reading hostnames from {}", path.display());
    Ok(Box::pin(BufReader::new(file)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tokio::io::AsyncBufReadExt;

    #[tokio::test]
    async fn test_open_input_reads_file_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "example.com").unwrap();
        writeln!(file, "example.org").unwrap();

        let input = open_input(file.path()).await.unwrap();
        let mut lines = input.lines();
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("example.com"));
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("example.org"));
        assert_eq!(lines.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_open_input_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("hosts.txt");
        let err = open_input(&missing).await.err().unwrap();
        assert!(format!("{err:#}").contains("Failed to open input file"));
    }
}
