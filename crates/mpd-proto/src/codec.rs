//! The response deserializer (C4, §4.4).
//!
//! Generic over `AsyncBufRead` so the engine can drive it over a TCP or
//! Unix-domain stream without this crate depending on either. The
//! WouldBlock/re-entrance dance spec.md describes for a non-blocking socket
//! collapses into a plain `.await` here: Tokio's buffered reader keeps its
//! partial-line state across suspension points for us, so a short read just
//! suspends the future rather than requiring us to save and restore parser
//! state by hand.

use crate::accumulator::Accumulator;
use crate::error::{AckError, MpdError};
use crate::version::Version;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

/// Bytes read per `feed_binary` call while draining a binary payload, so a
/// single enormous `binary: <N>` announcement doesn't force one huge
/// allocation.
const BINARY_CHUNK: usize = 64 * 1024;

/// Drives `reader` through one complete reply, feeding `acc` along the way,
/// until `OK`, `list_OK`, or `ACK` terminates it (§4.4).
///
/// `timeout`, when set, bounds each individual read rather than the whole
/// reply: the deadline resets on every line or chunk read, so a large reply
/// that keeps arriving in pieces never times out as long as it keeps making
/// progress (§4.5.4) — only a read that stalls for a full `timeout` fails.
pub async fn read_response<R>(
    reader: &mut R,
    version: Version,
    acc: &mut dyn Accumulator,
    timeout: Option<Duration>,
) -> Result<(), MpdError>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    loop {
        let mut drained_binary = false;
        while acc.remaining_binary() > 0 {
            drained_binary = true;
            let want = acc.remaining_binary().min(BINARY_CHUNK as u64) as usize;
            let mut chunk = vec![0u8; want];
            with_timeout(timeout, reader.read_exact(&mut chunk)).await?;
            acc.feed_binary(version, &chunk)?;
        }
        if drained_binary {
            // The protocol appends one bare newline after the raw payload.
            line.clear();
            with_timeout(timeout, reader.read_line(&mut line)).await?;
        }

        line.clear();
        let n = with_timeout(timeout, reader.read_line(&mut line)).await?;
        if n == 0 {
            return Err(MpdError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "connection closed mid-response",
            )));
        }
        let trimmed = line.trim_end_matches(['\r', '\n']);

        if trimmed == "OK" || trimmed == "list_OK" {
            return Ok(());
        }
        if let Some(rest) = trimmed.strip_prefix("ACK") {
            let _ = rest;
            return Err(MpdError::Protocol(AckError::parse(trimmed)));
        }

        match trimmed.split_once(": ") {
            Some((key, value)) => acc.feed_pair(version, key, value),
            None => {
                return Err(MpdError::invalid_data(format!(
                    "malformed response line: {trimmed:?}"
                )))
            }
        }
    }
}

/// Runs one read with a fresh `timeout` deadline, or none at all.
async fn with_timeout<F>(timeout: Option<Duration>, fut: F) -> Result<usize, MpdError>
where
    F: std::future::Future<Output = std::io::Result<usize>>,
{
    match timeout {
        Some(d) => match tokio::time::timeout(d, fut).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(MpdError::TimedOut),
        },
        None => Ok(fut.await?),
    }
}
