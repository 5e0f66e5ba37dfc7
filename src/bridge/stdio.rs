//! `notes serve`: the backend exposed as JSON lines over a byte stream.
//!
//! Each input line is one [`Command`]; each output line is the matching
//! [`Reply`], in order. A line that does not parse gets an error reply and the
//! loop carries on.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use super::client::BridgeClient;
use super::protocol::{Command, Reply};
use crate::error::{FsError, FsErrorKind, Result};

/// Relay lines from `reader` to the backend until end of input.
pub async fn serve<R, W>(client: &BridgeClient, reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut handled = 0usize;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let reply = match serde_json::from_str::<Command>(line) {
            Ok(command) => client.request(command).await?,
            Err(err) => {
                tracing::warn!(error = %err, "unparseable command line");
                Reply::error(
                    "unknown",
                    FsError::new(FsErrorKind::Other, format!("bad command: {}", err)),
                )
            }
        };

        if reply.is_error() {
            tracing::debug!(line, "command failed");
        }
        let mut out = serde_json::to_string(&reply)?;
        out.push('\n');
        writer.write_all(out.as_bytes()).await?;
        writer.flush().await?;
        handled += 1;
    }

    tracing::info!(handled, "input closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{self, Backend};
    use crate::fs::tree::TreeOptions;
    use serde_json::Value;
    use std::fs;
    use tempfile::TempDir;

    async fn run_lines(input: String) -> (TempDir, Vec<Value>) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        fs::write(root.join("todo.md"), "buy milk").unwrap();
        let (client, _handle) = bridge::spawn(Backend::new(root, TreeOptions::default()));

        let input = input.replace("$ROOT", &dir.path().canonicalize().unwrap().to_string_lossy());
        let mut output = Vec::new();
        serve(&client, input.as_bytes(), &mut output).await.unwrap();

        let replies = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        (dir, replies)
    }

    #[tokio::test]
    async fn one_reply_per_command_in_order() {
        let input = concat!(
            r#"{"command":"open-file","path":"$ROOT/todo.md"}"#,
            "\n\n",
            r#"{"command":"delete-file","path":"$ROOT/gone.md"}"#,
            "\n",
        )
        .to_string();
        let (_dir, replies) = run_lines(input).await;

        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0]["reply"], "file-opened");
        assert_eq!(replies[0]["content"], "buy milk");
        assert_eq!(replies[1]["reply"], "error");
        assert_eq!(replies[1]["command"], "delete-file");
        assert_eq!(replies[1]["kind"], "not-found");
    }

    #[tokio::test]
    async fn garbage_line_gets_error_and_loop_continues() {
        let input = concat!("not json\n", r#"{"command":"load-tree"}"#, "\n").to_string();
        let (_dir, replies) = run_lines(input).await;

        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0]["reply"], "error");
        assert_eq!(replies[0]["command"], "unknown");
        assert_eq!(replies[1]["reply"], "tree-loaded");
    }
}
