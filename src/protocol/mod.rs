//! Line-oriented text protocol
//!
//! - `framing` - Cutting connection bytes into command lines
//! - `parser` - Line to [`Command`](crate::types::Command)
//! - `formatter` - [`Response`](crate::types::Response) to wire line

pub mod formatter;
pub mod framing;
pub mod parser;

pub use formatter::format_response;
pub use framing::{strip_line_ending, Frame, FrameReader, FramingMode, LINE_TOO_LONG_MESSAGE};
pub use parser::parse_command;
