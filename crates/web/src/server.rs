//! The acceptor: owns the listening socket and spawns one task per connection.
//!
//! ```no_run
//! use probe_web::{Router, Server};
//!
//! # async fn run(router: Router) -> Result<(), Box<dyn std::error::Error>> {
//! let server = Server::builder().address("127.0.0.1:8080").router(router).max_body_bytes(64 * 1024).build()?;
//! let handle = server.start().await?;
//! tokio::signal::ctrl_c().await?;
//! handle.shutdown().await;
//! # Ok(())
//! # }
//! ```

use std::fmt::Debug;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use probe_http::codec::DEFAULT_MAX_HEADER_BYTES;
use probe_http::connection::{ConnectionConfig, DEFAULT_MAX_BODY_BYTES, HttpConnection};
use serde::Deserialize;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::dispatcher::Dispatcher;
use crate::error::{ServerBuildError, ServerError};
use crate::router::Router;

pub const DEFAULT_ADDRESS: &str = "127.0.0.1:8080";

/// Tunables of a server, usually loaded from the host's own configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Upper bound of a request head, terminator included.
    pub max_header_bytes: usize,
    /// Requests declaring a longer body are answered with `413`.
    pub max_body_bytes: usize,
    /// Whether `500` bodies carry the error message.
    pub expose_error_details: bool,
    pub nodelay: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_header_bytes: DEFAULT_MAX_HEADER_BYTES,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            expose_error_details: false,
            nodelay: true,
        }
    }
}

impl ServerConfig {
    fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig { max_header_bytes: self.max_header_bytes, max_body_bytes: self.max_body_bytes }
    }
}

#[derive(Debug)]
pub struct ServerBuilder {
    router: Option<Router>,
    address: Result<Vec<SocketAddr>, ServerBuildError>,
    config: ServerConfig,
}

impl ServerBuilder {
    fn new() -> Self {
        Self { router: None, address: resolve(DEFAULT_ADDRESS), config: ServerConfig::default() }
    }

    /// Sets the listening address, `127.0.0.1:8080` by default. Port `0` picks a free port,
    /// see [`ServerHandle::local_addr`].
    pub fn address<A: ToSocketAddrs + Debug>(mut self, address: A) -> Self {
        self.address = resolve(address);
        self
    }

    pub fn router(mut self, router: Router) -> Self {
        self.router = Some(router);
        self
    }

    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_header_bytes(mut self, max_header_bytes: usize) -> Self {
        self.config.max_header_bytes = max_header_bytes;
        self
    }

    pub fn max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.config.max_body_bytes = max_body_bytes;
        self
    }

    pub fn expose_error_details(mut self, expose: bool) -> Self {
        self.config.expose_error_details = expose;
        self
    }

    pub fn nodelay(mut self, nodelay: bool) -> Self {
        self.config.nodelay = nodelay;
        self
    }

    pub fn build(self) -> Result<Server, ServerBuildError> {
        let router = self.router.ok_or(ServerBuildError::MissingRouter)?;
        let address = self.address?;
        Ok(Server { router, address, config: self.config })
    }
}

fn resolve<A: ToSocketAddrs + Debug>(address: A) -> Result<Vec<SocketAddr>, ServerBuildError> {
    let addresses = address
        .to_socket_addrs()
        .map_err(|source| ServerBuildError::InvalidAddress { address: format!("{address:?}"), source })?
        .collect::<Vec<_>>();

    if addresses.is_empty() {
        return Err(ServerBuildError::NoAddress { address: format!("{address:?}") });
    }
    Ok(addresses)
}

#[derive(Debug)]
pub struct Server {
    router: Router,
    address: Vec<SocketAddr>,
    config: ServerConfig,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Binds the listener and starts accepting connections in a background task.
    pub async fn start(self) -> Result<ServerHandle, ServerError> {
        let listener = TcpListener::bind(self.address.as_slice())
            .await
            .map_err(|source| ServerError::Bind { addresses: self.address.clone(), source })?;
        let local_addr = listener.local_addr()?;
        info!(%local_addr, "start listening");

        let dispatcher = Arc::new(Dispatcher::new(self.router).expose_error_details(self.config.expose_error_details));
        let token = CancellationToken::new();
        let running = Arc::new(AtomicBool::new(true));

        let acceptor = Acceptor { listener, dispatcher, config: self.config, token: token.clone(), running: Arc::clone(&running) };
        let task = tokio::spawn(acceptor.run());

        Ok(ServerHandle { local_addr, token, running, task })
    }
}

struct Acceptor {
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    config: ServerConfig,
    token: CancellationToken,
    running: Arc<AtomicBool>,
}

impl Acceptor {
    async fn run(self) {
        loop {
            let (tcp_stream, remote_addr) = tokio::select! {
                () = self.token.cancelled() => break,
                accepted = self.listener.accept() => match accepted {
                    Ok(stream_and_addr) => stream_and_addr,
                    Err(e) => {
                        warn!(cause = %e, "failed to accept");
                        continue;
                    }
                },
            };

            self.serve(tcp_stream, remote_addr);
        }

        self.running.store(false, Ordering::Release);
        info!("stop listening");
    }

    fn serve(&self, tcp_stream: TcpStream, remote_addr: SocketAddr) {
        if self.config.nodelay
            && let Err(e) = tcp_stream.set_nodelay(true)
        {
            debug!(%remote_addr, cause = %e, "can't set nodelay");
        }

        let dispatcher = Arc::clone(&self.dispatcher);
        let connection_config = self.config.connection_config();

        tokio::spawn(async move {
            let (reader, writer) = tcp_stream.into_split();
            let connection = HttpConnection::with_config(reader, writer, connection_config);
            match connection.process(dispatcher).await {
                Ok(()) => debug!(%remote_addr, "finished process, connection shutdown"),
                Err(e) => warn!(%remote_addr, cause = %e, "connection aborted"),
            }
        });
    }
}

/// Controls a started server.
#[derive(Debug)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    token: CancellationToken,
    running: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// The bound address, with the actual port when port `0` was requested.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Stops accepting connections. In-flight connections run to completion.
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// Waits until the accept loop has exited and the listener is dropped.
    pub async fn stopped(self) {
        if let Err(e) = self.task.await {
            warn!(cause = %e, "accept loop failed");
        }
    }

    pub async fn shutdown(self) {
        self.stop();
        self.stopped().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> Router {
        Router::builder().build().unwrap()
    }

    #[test]
    fn config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.max_header_bytes, 64 * 1024);
        assert_eq!(config.max_body_bytes, 4 * 1024 * 1024);
        assert!(!config.expose_error_details);
        assert!(config.nodelay);
    }

    #[test]
    fn config_from_partial_json() {
        let config: ServerConfig = serde_json::from_str(r#"{"max_body_bytes": 1024, "expose_error_details": true}"#).unwrap();
        assert_eq!(config.max_body_bytes, 1024);
        assert!(config.expose_error_details);
        assert_eq!(config.max_header_bytes, DEFAULT_MAX_HEADER_BYTES);
    }

    #[test]
    fn builder_requires_router() {
        assert!(matches!(Server::builder().build(), Err(ServerBuildError::MissingRouter)));
    }

    #[test]
    fn builder_rejects_bad_address() {
        let result = Server::builder().address("not an address").router(router()).build();
        assert!(matches!(result, Err(ServerBuildError::InvalidAddress { .. })));
    }

    #[test]
    fn builder_defaults_to_loopback() {
        let server = Server::builder().router(router()).build().unwrap();
        assert_eq!(server.address, vec!["127.0.0.1:8080".parse::<SocketAddr>().unwrap()]);
    }

    #[tokio::test]
    async fn start_and_stop() {
        let server = Server::builder().address("127.0.0.1:0").router(router()).build().unwrap();
        let handle = server.start().await.unwrap();
        assert_ne!(handle.local_addr().port(), 0);
        assert!(handle.is_running());

        let running = Arc::clone(&handle.running);
        handle.shutdown().await;
        assert!(!running.load(Ordering::Acquire));
    }

    #[tokio::test]
    async fn bind_conflict() {
        let first = Server::builder().address("127.0.0.1:0").router(router()).build().unwrap().start().await.unwrap();
        let second = Server::builder().address(first.local_addr()).router(router()).build().unwrap();

        assert!(matches!(second.start().await, Err(ServerError::Bind { .. })));
        first.shutdown().await;
    }
}
