//! Server configuration
//!
//! Plain settings structs handed from the CLI to the listener. Every field
//! has a default; zero-valued tuning knobs fall back to their default with a
//! warning instead of failing.

use crate::protocol::FramingMode;
use tracing::warn;

/// Default bind host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default TCP port
pub const DEFAULT_PORT: u16 = 8080;

/// Default listen backlog
pub const DEFAULT_BACKLOG: u32 = 128;

/// Default per-connection read buffer size in bytes
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Settings for a single connection worker
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Maximum bytes per read, and maximum line length in line framing
    pub buffer_size: usize,
    /// How bytes are cut into commands
    pub framing: FramingMode,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            framing: FramingMode::default(),
        }
    }
}

impl ConnectionConfig {
    /// Create a new ConnectionConfig with custom values
    pub fn new(buffer_size: usize, framing: FramingMode) -> Self {
        let buffer_size = if buffer_size == 0 {
            warn!(
                "Invalid buffer_size ({}), using default ({})",
                buffer_size, DEFAULT_BUFFER_SIZE
            );
            DEFAULT_BUFFER_SIZE
        } else {
            buffer_size
        };

        Self {
            buffer_size,
            framing,
        }
    }
}

/// Listener settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host name or IP address to bind
    pub host: String,
    /// TCP port to bind; 0 picks an ephemeral port
    pub port: u16,
    /// Pending connection queue length passed to `listen`
    pub backlog: u32,
    /// Settings applied to every accepted connection
    pub connection: ConnectionConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            backlog: DEFAULT_BACKLOG,
            connection: ConnectionConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Create a new ServerConfig with custom values
    pub fn new(
        host: impl Into<String>,
        port: u16,
        backlog: u32,
        connection: ConnectionConfig,
    ) -> Self {
        let backlog = if backlog == 0 {
            warn!(
                "Invalid backlog ({}), using default ({})",
                backlog, DEFAULT_BACKLOG
            );
            DEFAULT_BACKLOG
        } else {
            backlog
        };

        Self {
            host: host.into(),
            port,
            backlog,
            connection,
        }
    }

    /// Loopback configuration on an ephemeral port, for tests and embedding
    pub fn loopback() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            ..Self::default()
        }
    }

    /// `host:port` string suitable for address resolution
    ///
    /// Bare IPv6 hosts are wrapped in brackets.
    pub fn bind_address(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.backlog, 128);
        assert_eq!(config.connection.buffer_size, 1024);
        assert_eq!(config.connection.framing, FramingMode::Read);
    }

    #[rstest]
    #[case::zero_backlog(0, DEFAULT_BACKLOG)]
    #[case::custom_backlog(16, 16)]
    fn test_backlog_fallback(#[case] backlog: u32, #[case] expected: u32) {
        let config = ServerConfig::new("localhost", 9000, backlog, ConnectionConfig::default());

        assert_eq!(config.backlog, expected);
    }

    #[rstest]
    #[case::zero_buffer(0, DEFAULT_BUFFER_SIZE)]
    #[case::custom_buffer(64, 64)]
    fn test_buffer_size_fallback(#[case] buffer_size: usize, #[case] expected: usize) {
        let config = ConnectionConfig::new(buffer_size, FramingMode::Line);

        assert_eq!(config.buffer_size, expected);
        assert_eq!(config.framing, FramingMode::Line);
    }

    #[rstest]
    #[case::ipv4("127.0.0.1", 8080, "127.0.0.1:8080")]
    #[case::hostname("localhost", 1, "localhost:1")]
    #[case::ipv6("::1", 8080, "[::1]:8080")]
    #[case::ipv6_bracketed("[::1]", 8080, "[::1]:8080")]
    fn test_bind_address(#[case] host: &str, #[case] port: u16, #[case] expected: &str) {
        let config = ServerConfig::new(host, port, 8, ConnectionConfig::default());

        assert_eq!(config.bind_address(), expected);
    }
}
