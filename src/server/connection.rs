//! Per-connection worker
//!
//! One worker runs for every accepted connection. It loops over
//! read → parse → dispatch → format → write until the peer closes the
//! stream, a transport error occurs or the server shuts down. Protocol and
//! application failures never end the loop: they are answered with an
//! `ERROR` line like any other response.
//!
//! Shutdown is only observed while waiting for input, so a request that has
//! been read is always answered before the worker exits.

use super::config::ConnectionConfig;
use crate::core::{AccountLookup, Dispatcher, MoneyTransfer};
use crate::protocol::{
    format_response, parse_command, Frame, FrameReader, LINE_TOO_LONG_MESSAGE,
};
use crate::types::Response;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Why a connection worker stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The peer closed its side of the stream
    PeerClosed,
    /// The server is shutting down
    Shutdown,
}

/// Serve one client until it disconnects or the server shuts down
///
/// # Arguments
///
/// * `stream` - The accepted connection (any async byte stream)
/// * `dispatcher` - Shared command dispatcher
/// * `config` - Framing and buffer settings
/// * `shutdown` - Cancelled when the server stops
///
/// # Returns
///
/// Why the loop ended and how many responses were written
///
/// # Errors
///
/// Returns the transport error that ended the connection. Nothing is retried.
pub async fn serve_connection<S, A, T>(
    mut stream: S,
    dispatcher: &Dispatcher<A, T>,
    config: ConnectionConfig,
    shutdown: CancellationToken,
) -> std::io::Result<(CloseReason, u64)>
where
    S: AsyncRead + AsyncWrite + Unpin,
    A: AccountLookup,
    T: MoneyTransfer,
{
    let mut reader = FrameReader::new(config.framing, config.buffer_size);
    let mut responses = 0u64;

    let reason = loop {
        let frame = tokio::select! {
            _ = shutdown.cancelled() => break CloseReason::Shutdown,
            frame = reader.next_frame(&mut stream) => frame?,
        };

        let response = match frame {
            None => break CloseReason::PeerClosed,
            Some(Frame::Line(line)) if line.is_empty() => continue,
            Some(Frame::Line(line)) => {
                trace!(request = %line, "request");
                dispatcher.dispatch(parse_command(&line)).await
            }
            Some(Frame::Oversized) => {
                debug!("discarding oversized line");
                Response::error(LINE_TOO_LONG_MESSAGE)
            }
        };

        let wire = format_response(&response);
        if response.is_error() {
            debug!(response = wire.trim_end(), "request rejected");
        } else {
            trace!(response = wire.trim_end(), "response");
        }
        stream.write_all(wire.as_bytes()).await?;
        stream.flush().await?;
        responses += 1;
    };

    // The peer may already be gone; closing is best effort
    let _ = stream.shutdown().await;
    Ok((reason, responses))
}
