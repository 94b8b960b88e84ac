use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::warn;

use crate::probe::ProbeResult;

pub fn format_line(result: &ProbeResult) -> String {
    let mut line = result.to_string();
    line.push('\n');
    line
}

pub async fn open_output_file(path: &str) -> std::io::Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
}

/// Writes every result as one line the moment it arrives, to `out` and to
/// the optional mirror file, until all senders are dropped. Returns how many
/// lines were written to `out`.
///
/// A failed write to `out` ends the task. The receiver is dropped with it, so
/// senders see a closed channel and workers stop probing.
pub async fn write_results<W>(
    mut rx: mpsc::Receiver<ProbeResult>,
    mut out: W,
    mut mirror: Option<File>,
) -> usize
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0usize;
    while let Some(result) = rx.recv().await {
        let line = format_line(&result);
        if let Err(e) = out.write_all(line.as_bytes()).await {
            warn!(error = %e, "failed to write result, stopping output");
            break;
        }
        let _ = out.flush().await;
        written += 1;

        if let Some(file) = mirror.as_mut() {
            if let Err(e) = file.write_all(line.as_bytes()).await {
                warn!(error = %e, "failed to write result to output file, disabling it");
                mirror = None;
            }
        }
    }
    if let Some(mut file) = mirror {
        let _ = file.flush().await;
    }
    written
}
