//! Splitting a byte stream into command lines
//!
//! Two framing modes are supported:
//!
//! - [`FramingMode::Read`]: every successful transport read is one command,
//!   whatever it contains. A command split across two TCP segments is seen as
//!   two commands, and two commands arriving together are seen as one.
//! - [`FramingMode::Line`]: bytes are buffered until a `\n` arrives, so every
//!   line is exactly one command. Lines longer than the buffer size are
//!   reported as [`Frame::Oversized`] and skipped up to their newline.
//!
//! Bytes are decoded as UTF-8, invalid sequences are replaced.

use clap::ValueEnum;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Message sent for a line exceeding the buffer size in line mode
pub const LINE_TOO_LONG_MESSAGE: &str = "Line too long";

/// How connection bytes are cut into commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum FramingMode {
    /// One transport read is one command
    #[default]
    Read,
    /// One `\n` terminated line is one command
    Line,
}

/// One unit of client input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A command line with its line ending stripped (may be empty)
    Line(String),
    /// A line longer than the buffer size (line mode only)
    Oversized,
}

/// Stateful frame reader for one connection
///
/// Does not own the stream so that the caller can keep writing to it
/// between reads.
#[derive(Debug)]
pub struct FrameReader {
    mode: FramingMode,
    buffer_size: usize,
    pending: Vec<u8>,
    discarding: bool,
}

impl FrameReader {
    /// Create a reader
    ///
    /// # Arguments
    ///
    /// * `mode` - Framing mode
    /// * `buffer_size` - Maximum bytes per read, and maximum line length in
    ///   line mode (values below 1 are treated as 1)
    pub fn new(mode: FramingMode, buffer_size: usize) -> Self {
        FrameReader {
            mode,
            buffer_size: buffer_size.max(1),
            pending: Vec::new(),
            discarding: false,
        }
    }

    /// Read the next frame
    ///
    /// # Returns
    ///
    /// * `Ok(Some(frame))` - The next frame
    /// * `Ok(None)` - The peer closed the stream and nothing is left
    ///
    /// # Errors
    ///
    /// Returns the transport error of the underlying read.
    pub async fn next_frame<R>(&mut self, reader: &mut R) -> std::io::Result<Option<Frame>>
    where
        R: AsyncRead + Unpin,
    {
        match self.mode {
            FramingMode::Read => self.next_read(reader).await,
            FramingMode::Line => self.next_line(reader).await,
        }
    }

    async fn next_read<R>(&mut self, reader: &mut R) -> std::io::Result<Option<Frame>>
    where
        R: AsyncRead + Unpin,
    {
        let mut buf = vec![0u8; self.buffer_size];
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            return Ok(None);
        }

        Ok(Some(Frame::Line(decode_line(&buf[..n]))))
    }

    async fn next_line<R>(&mut self, reader: &mut R) -> std::io::Result<Option<Frame>>
    where
        R: AsyncRead + Unpin,
    {
        let mut buf = vec![0u8; self.buffer_size];
        loop {
            if let Some(frame) = self.take_buffered_line() {
                return Ok(Some(frame));
            }

            if content_len(&self.pending) > self.buffer_size {
                self.pending.clear();
                if !self.discarding {
                    self.discarding = true;
                    return Ok(Some(Frame::Oversized));
                }
            }

            let n = reader.read(&mut buf).await?;
            if n == 0 {
                let rest = std::mem::take(&mut self.pending);
                if self.discarding || rest.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(Frame::Line(decode_line(&rest))));
            }
            self.pending.extend_from_slice(&buf[..n]);
        }
    }

    /// Pop the first complete line out of the pending bytes
    fn take_buffered_line(&mut self) -> Option<Frame> {
        loop {
            let pos = self.pending.iter().position(|&b| b == b'\n')?;
            let line: Vec<u8> = self.pending.drain(..=pos).collect();

            if self.discarding {
                self.discarding = false;
                continue;
            }
            if content_len(&line[..pos]) > self.buffer_size {
                return Some(Frame::Oversized);
            }
            return Some(Frame::Line(decode_line(&line)));
        }
    }
}

/// Remove every trailing `\n` and `\r`
pub fn strip_line_ending(line: &str) -> &str {
    line.trim_end_matches(|c| c == '\n' || c == '\r')
}

/// Length of a line without the `\r` of a CRLF ending
fn content_len(bytes: &[u8]) -> usize {
    match bytes.last() {
        Some(b'\r') => bytes.len() - 1,
        _ => bytes.len(),
    }
}

fn decode_line(bytes: &[u8]) -> String {
    strip_line_ending(&String::from_utf8_lossy(bytes)).to_string()
}
