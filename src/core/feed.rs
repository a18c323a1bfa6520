//! Newline-delimited JSON event source.
//!
//! Each non-empty line is one host event. Lines that fail to parse are
//! logged and skipped; they never stop the feed.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

use super::model::HostEvent;

/// Parse one feed line. Blank lines and comments (`#`) yield `None`.
pub fn parse_line(line: &str) -> Option<Result<HostEvent, serde_json::Error>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    Some(HostEvent::from_json(line))
}

/// Forward events from `reader` into `tx` until EOF or the receiver goes away.
/// Returns the number of events forwarded.
pub async fn pump<R>(reader: R, tx: mpsc::Sender<HostEvent>) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut forwarded = 0;
    let mut line_no = 0;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        match parse_line(&line) {
            None => {}
            Some(Ok(event)) => {
                if tx.send(event).await.is_err() {
                    break;
                }
                forwarded += 1;
            }
            Some(Err(e)) => log::warn!("Skipping event on line {}: {}", line_no, e),
        }
    }
    Ok(forwarded)
}
