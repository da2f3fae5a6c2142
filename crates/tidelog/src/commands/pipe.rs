//! Pipe command implementation - one record per stdin line

use anyhow::{Context, Result};
use tidelog_core::LoggerConfig;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use crate::output::print_success;

/// Strip the line terminator (`\n` or `\r\n`) and decode the line.
///
/// Returns `None` for a line that is not valid UTF-8.
pub fn decode_line(mut raw: Vec<u8>) -> Option<String> {
    if raw.last() == Some(&b'\n') {
        raw.pop();
        if raw.last() == Some(&b'\r') {
            raw.pop();
        }
    }
    String::from_utf8(raw).ok()
}

pub async fn execute(config: &LoggerConfig) -> Result<()> {
    let manager = super::open_manager(config)?;
    let mut reader = BufReader::new(tokio::io::stdin());
    let mut count = 0usize;
    let mut skipped = 0usize;
    let mut line_no = 0usize;

    loop {
        let mut raw = Vec::new();
        let read = reader
            .read_until(b'\n', &mut raw)
            .await
            .context("Failed to read stdin")?;
        if read == 0 {
            break;
        }
        line_no += 1;

        match decode_line(raw) {
            Some(line) => {
                manager.append(line);
                count += 1;
            }
            None => {
                warn!("Skipping stdin line {}: not valid UTF-8", line_no);
                skipped += 1;
            }
        }
    }
    debug!("stdin closed after {} line(s)", line_no);

    manager.shutdown().await?;
    if skipped > 0 {
        print_success(&format!(
            "Logged {} line(s), skipped {} invalid line(s)",
            count, skipped
        ));
    } else {
        print_success(&format!("Logged {} line(s)", count));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_line() {
        assert_eq!(decode_line(b"plain\n".to_vec()).as_deref(), Some("plain"));
        assert_eq!(decode_line(b"crlf\r\n".to_vec()).as_deref(), Some("crlf"));
        assert_eq!(decode_line(b"no newline".to_vec()).as_deref(), Some("no newline"));
        assert_eq!(decode_line(b"\n".to_vec()).as_deref(), Some(""));
        assert_eq!(decode_line(b"\xff\xfe bad\n".to_vec()), None);
    }
}
