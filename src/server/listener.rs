//! TCP listener and server lifecycle
//!
//! `Server` owns the listening socket and the accept loop. Each accepted
//! connection is registered, wrapped in a `connection` tracing span and
//! handed to its own worker task. Workers are spawned on a [`TaskTracker`]
//! and observe one [`CancellationToken`], so [`Server::stop`] can signal every
//! task and wait until all of them are gone.
//!
//! # Lifecycle
//!
//! ```text
//! new ──start()──▶ running ──stop()──▶ stopped ──start()──▶ running ...
//! ```
//!
//! `start` and `stop` are idempotent. Dropping a running server signals
//! shutdown but cannot wait for the tasks.

use super::config::{ConnectionConfig, ServerConfig};
use super::connection::serve_connection;
use super::registry::{ConnectionInfo, ConnectionRegistry};
use crate::core::{
    AccountLookup, AccountService, Dispatcher, Gatekeeper, MoneyTransfer, TransactionService,
};
use crate::types::GatewayError;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpSocket};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, info_span, warn, Instrument};

/// Pause after a failed accept before trying again
const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

/// State that only exists while the server is running
#[derive(Debug)]
struct Running {
    local_addr: SocketAddr,
    shutdown: CancellationToken,
    workers: TaskTracker,
    accept_loop: JoinHandle<()>,
}

/// Multi-connection TCP server in front of a command dispatcher
#[derive(Debug)]
pub struct Server<A, T> {
    config: ServerConfig,
    dispatcher: Arc<Dispatcher<A, T>>,
    registry: Arc<ConnectionRegistry>,
    running: Option<Running>,
}

impl Server<AccountService, TransactionService> {
    /// Create a server over the ledger-backed services
    ///
    /// # Arguments
    ///
    /// * `config` - Listener settings
    /// * `gatekeeper` - The process-wide ledger gatekeeper
    pub fn with_gatekeeper(config: ServerConfig, gatekeeper: Arc<Gatekeeper>) -> Self {
        let dispatcher = Dispatcher::new(
            AccountService::new(Arc::clone(&gatekeeper)),
            TransactionService::new(gatekeeper),
        );
        Server::new(config, dispatcher)
    }
}

impl<A, T> Server<A, T>
where
    A: AccountLookup + 'static,
    T: MoneyTransfer + 'static,
{
    /// Create a stopped server
    pub fn new(config: ServerConfig, dispatcher: Dispatcher<A, T>) -> Self {
        Server {
            config,
            dispatcher: Arc::new(dispatcher),
            registry: Arc::new(ConnectionRegistry::new()),
            running: None,
        }
    }

    /// Bind, listen and start accepting connections
    ///
    /// Calling this on a running server does nothing and returns the address
    /// it is bound to.
    ///
    /// # Returns
    ///
    /// The bound address (useful when the configured port is 0)
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::BindFailed`] if the host cannot be resolved or
    /// no resolved address can be bound and listened on.
    pub async fn start(&mut self) -> Result<SocketAddr, GatewayError> {
        if let Some(running) = &self.running {
            debug!(addr = %running.local_addr, "start called on a running server");
            return Ok(running.local_addr);
        }

        let listener = bind(&self.config).await?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| GatewayError::bind_failed(self.config.bind_address(), &e))?;

        let shutdown = CancellationToken::new();
        let workers = TaskTracker::new();
        let accept_loop = tokio::spawn(accept_loop(
            listener,
            Arc::clone(&self.dispatcher),
            Arc::clone(&self.registry),
            self.config.connection,
            shutdown.clone(),
            workers.clone(),
        ));

        info!(addr = %local_addr, framing = ?self.config.connection.framing, "server listening");
        self.running = Some(Running {
            local_addr,
            shutdown,
            workers,
            accept_loop,
        });
        Ok(local_addr)
    }

    /// Stop accepting, close every connection and wait for all workers
    ///
    /// Requests already read are answered before their worker exits.
    /// Calling this on a stopped server does nothing.
    pub async fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };

        info!(
            addr = %running.local_addr,
            connections = self.registry.len(),
            "server stopping"
        );
        running.shutdown.cancel();

        if let Err(e) = running.accept_loop.await {
            warn!(error = %e, "accept loop ended abnormally");
        }
        running.workers.close();
        running.workers.wait().await;

        info!(addr = %running.local_addr, "server stopped");
    }
}

impl<A, T> Server<A, T> {
    /// Address the server is bound to, while running
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|running| running.local_addr)
    }

    /// Whether the server accepts connections
    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|running| !running.shutdown.is_cancelled())
    }

    /// Number of connections currently being served
    pub fn active_connections(&self) -> usize {
        self.registry.len()
    }

    /// Snapshot of the connections currently being served
    pub fn connections(&self) -> Vec<ConnectionInfo> {
        self.registry.snapshot()
    }

    /// Listener settings
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

impl<A, T> Drop for Server<A, T> {
    fn drop(&mut self) {
        if let Some(running) = &self.running {
            running.shutdown.cancel();
        }
    }
}

/// Resolve the configured host and listen on the first address that works
async fn bind(config: &ServerConfig) -> Result<TcpListener, GatewayError> {
    let address = config.bind_address();
    let candidates = tokio::net::lookup_host(&address)
        .await
        .map_err(|e| GatewayError::bind_failed(&address, &e))?;

    let mut last_error = None;
    for addr in candidates {
        match listen_on(addr, config.backlog) {
            Ok(listener) => return Ok(listener),
            Err(e) => {
                debug!(%addr, error = %e, "bind attempt failed");
                last_error = Some(e);
            }
        }
    }

    Err(match last_error {
        Some(e) => GatewayError::bind_failed(&address, &e),
        None => GatewayError::BindFailed {
            addr: address,
            message: "host did not resolve to any address".to_string(),
        },
    })
}

fn listen_on(addr: SocketAddr, backlog: u32) -> std::io::Result<TcpListener> {
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    socket.listen(backlog)
}

async fn accept_loop<A, T>(
    listener: TcpListener,
    dispatcher: Arc<Dispatcher<A, T>>,
    registry: Arc<ConnectionRegistry>,
    config: ConnectionConfig,
    shutdown: CancellationToken,
    workers: TaskTracker,
) where
    A: AccountLookup + 'static,
    T: MoneyTransfer + 'static,
{
    loop {
        let accepted = tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => accepted,
        };

        let (stream, peer) = match accepted {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(error = %e, "accept failed");
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = tokio::time::sleep(ACCEPT_BACKOFF) => continue,
                }
            }
        };

        let registration = registry.register(peer);
        let span = info_span!("connection", id = registration.id(), %peer);
        let dispatcher = Arc::clone(&dispatcher);
        let shutdown = shutdown.clone();

        workers.spawn(
            async move {
                debug!("connection accepted");
                if let Err(e) = stream.set_nodelay(true) {
                    debug!(error = %e, "could not disable Nagle");
                }

                match serve_connection(stream, dispatcher.as_ref(), config, shutdown).await {
                    Ok((reason, responses)) => {
                        debug!(?reason, responses, "connection closed")
                    }
                    Err(e) => debug!(error = %e, "connection closed on transport error"),
                }
                drop(registration);
            }
            .instrument(span),
        );
    }

    debug!("accept loop exited, listening socket closed");
}
