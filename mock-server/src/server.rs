//! The embeddable server: control surface plus the accept loop.
//!
//! # Design
//! A single dedicated thread blocks in `accept` and serves connections one at
//! a time, so the request and response logs record exchanges in exactly the
//! order they happened. There is no worker pool.
//!
//! `std::net::TcpListener` cannot be closed from another thread while it is
//! blocked in `accept`, so `stop` raises the worker's own stop flag and makes
//! a throwaway connection to the listener to wake the thread. The thread sees
//! the flag, drops the listener and signals completion; `stop` waits for
//! that signal up to the configured timeout and abandons the thread after.
//! Accept errors seen while stopping are expected and not reported.
//!
//! Each `start` creates a fresh stop flag and a fresh connection log. An
//! abandoned thread (one still stuck in a slow handler) keeps only its own
//! flag and log, so it closes its listener once the handler returns and can
//! never write into the logs of a later run.
//!
//! Dropping a running server stops it.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use mockhttp_core::{Request, Response};
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::connection::{handle_connection, ConnectionLog, Exchange};
use crate::error::ServerError;
use crate::files::FileServer;
use crate::handler::{AlwaysOk, Handler};

const WAKE_TIMEOUT: Duration = Duration::from_millis(500);

/// Lifecycle of the accept loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Stopped,
    Starting,
    Running,
    Stopping,
}

/// State shared between the controlling thread and the accept thread.
struct Shared {
    state: Mutex<ServerState>,
    handler: RwLock<Option<Arc<dyn Handler>>>,
}

impl Shared {
    fn state(&self) -> ServerState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: ServerState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    fn handler(&self) -> Option<Arc<dyn Handler>> {
        self.handler
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_handler(&self, handler: Option<Arc<dyn Handler>>) {
        *self.handler.write().unwrap_or_else(PoisonError::into_inner) = handler;
    }
}

/// The running accept thread.
struct Worker {
    thread: JoinHandle<()>,
    stop: Arc<AtomicBool>,
    done: mpsc::Receiver<()>,
    local_addr: SocketAddr,
}

/// An HTTP/1.0 server for tests that records every exchange.
///
/// ```no_run
/// use mockhttp_server::{MockServer, Request, Response, HttpError};
///
/// let mut server = MockServer::new();
/// server.set_handler(|_: &Request, response: &mut Response| -> Result<(), HttpError> {
///     response.set_status(200);
///     response.set_body("hello");
///     Ok(())
/// });
/// server.start()?;
/// // ... point the code under test at server.port() ...
/// assert!(server.requests().is_empty());
/// server.stop();
/// # Ok::<(), mockhttp_server::ServerError>(())
/// ```
pub struct MockServer {
    config: ServerConfig,
    shared: Arc<Shared>,
    /// Log of the current (or most recent) run.
    log: Arc<ConnectionLog>,
    worker: Option<Worker>,
}

impl Default for MockServer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockServer {
    pub fn new() -> Self {
        Self::with_config(ServerConfig::default())
    }

    pub fn with_config(config: ServerConfig) -> Self {
        Self {
            config,
            shared: Arc::new(Shared {
                state: Mutex::new(ServerState::Stopped),
                handler: RwLock::new(None),
            }),
            log: Arc::new(ConnectionLog::default()),
            worker: None,
        }
    }

    /// A started server that answers every request with `200 OK`.
    pub fn always_ok() -> Result<Self, ServerError> {
        let mut server = Self::new();
        server.set_handler(AlwaysOk);
        server.start()?;
        Ok(server)
    }

    /// A started server that serves files below `root`.
    pub fn serve_dir(root: impl Into<std::path::PathBuf>) -> Result<Self, ServerError> {
        let mut server = Self::new();
        server.set_handler(FileServer::new(root)?);
        server.start()?;
        Ok(server)
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The configured port before `start`, the bound port after it.
    pub fn port(&self) -> u16 {
        self.config.port
    }

    /// Port to bind on the next `start`. 0 picks a free port.
    pub fn set_port(&mut self, port: u16) {
        self.config.port = port;
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.worker.as_ref().map(|worker| worker.local_addr)
    }

    /// `http://<addr><path>` for the running server.
    pub fn url(&self, path: &str) -> Option<String> {
        self.local_addr().map(|addr| format!("http://{addr}{path}"))
    }

    pub fn state(&self) -> ServerState {
        self.shared.state()
    }

    pub fn is_running(&self) -> bool {
        self.state() == ServerState::Running
    }

    pub fn handler(&self) -> Option<Arc<dyn Handler>> {
        self.shared.handler()
    }

    /// Install the handler. Takes effect from the next accepted connection.
    pub fn set_handler(&mut self, handler: impl Handler) {
        self.shared.set_handler(Some(Arc::new(handler)));
    }

    pub fn set_shared_handler(&mut self, handler: Arc<dyn Handler>) {
        self.shared.set_handler(Some(handler));
    }

    pub fn clear_handler(&mut self) {
        self.shared.set_handler(None);
    }

    /// Requests received since start or the last `reset`, in arrival order.
    pub fn requests(&self) -> Vec<Request> {
        self.log.requests()
    }

    /// Responses sent since start or the last `reset`; index `i` answers
    /// request `i`.
    pub fn responses(&self) -> Vec<Response> {
        self.log.responses()
    }

    /// Requests paired with their responses.
    pub fn exchanges(&self) -> Vec<Exchange> {
        self.requests()
            .into_iter()
            .zip(self.responses())
            .map(|(request, response)| Exchange { request, response })
            .collect()
    }

    /// Forget all recorded requests and responses.
    pub fn reset(&self) {
        self.log.clear();
    }

    /// Bind the listener and spawn the accept thread. Does nothing if the
    /// server is already running.
    pub fn start(&mut self) -> Result<(), ServerError> {
        if self.worker.is_some() {
            debug!(port = self.config.port, "start called on a running server");
            return Ok(());
        }

        self.shared.set_state(ServerState::Starting);
        self.log = Arc::new(ConnectionLog::default());

        let worker = self.spawn_worker().inspect_err(|_| {
            self.shared.set_state(ServerState::Stopped);
        })?;
        self.config.port = worker.local_addr.port();
        info!(address = %worker.local_addr, "bound");
        self.worker = Some(worker);
        Ok(())
    }

    fn spawn_worker(&self) -> Result<Worker, ServerError> {
        let addr = SocketAddr::new(self.config.host, self.config.port);
        let listener = TcpListener::bind(addr).map_err(|source| ServerError::Bind { addr, source })?;
        let local_addr = listener.local_addr()?;

        let (done_tx, done) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let accept = AcceptLoop {
            listener,
            shared: Arc::clone(&self.shared),
            log: Arc::clone(&self.log),
            stop: Arc::clone(&stop),
            read_timeout: self.config.read_timeout(),
        };

        self.shared.set_state(ServerState::Running);
        let thread = thread::Builder::new()
            .name("mockhttp-accept".to_string())
            .spawn(move || {
                accept.run();
                let _ = done_tx.send(());
            })?;

        Ok(Worker {
            thread,
            stop,
            done,
            local_addr,
        })
    }

    /// Stop accepting connections and wait, up to the configured stop
    /// timeout, for the accept thread to finish.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };

        self.shared.set_state(ServerState::Stopping);
        worker.stop.store(true, Ordering::SeqCst);
        wake(worker.local_addr);

        match worker.done.recv_timeout(self.config.stop_timeout()) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if worker.thread.join().is_err() {
                    error!("accept thread panicked");
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    timeout_ms = self.config.stop_timeout_ms,
                    "accept thread did not finish in time; abandoning it"
                );
            }
        }

        self.shared.set_state(ServerState::Stopped);
        info!(port = self.config.port, "stopped");
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for MockServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockServer")
            .field("config", &self.config)
            .field("state", &self.state())
            .field("local_addr", &self.local_addr())
            .finish()
    }
}

/// Connect to the listener so a blocked `accept` returns.
fn wake(local_addr: SocketAddr) {
    let target = match local_addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => SocketAddr::new(Ipv4Addr::LOCALHOST.into(), local_addr.port()),
        IpAddr::V6(ip) if ip.is_unspecified() => SocketAddr::new(Ipv6Addr::LOCALHOST.into(), local_addr.port()),
        _ => local_addr,
    };
    if let Err(err) = TcpStream::connect_timeout(&target, WAKE_TIMEOUT) {
        debug!(error = %err, "wake-up connection failed");
    }
}

/// Everything one run of the accept thread owns.
struct AcceptLoop {
    listener: TcpListener,
    shared: Arc<Shared>,
    log: Arc<ConnectionLog>,
    stop: Arc<AtomicBool>,
    read_timeout: Option<Duration>,
}

impl AcceptLoop {
    fn run(self) {
        for incoming in self.listener.incoming() {
            if self.stop.load(Ordering::SeqCst) {
                break;
            }

            let stream = match incoming {
                Ok(stream) => stream,
                Err(err) => {
                    error!(error = %err, "accept failed");
                    continue;
                }
            };

            let peer = stream.peer_addr().ok();
            debug!(peer = ?peer, "connection accepted");
            if let Err(err) = stream.set_read_timeout(self.read_timeout) {
                warn!(error = %err, "could not set read timeout");
            }

            let handler = self.shared.handler();
            if let Err(err) = handle_connection(stream, handler.as_deref(), &self.log) {
                error!(peer = ?peer, error = %err, "unable to process request");
            }
        }
        debug!("accept loop finished");
    }
}
