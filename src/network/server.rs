//! TCP Server
//!
//! Accepts connections and dispatches to worker threads.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam::channel::{self, Receiver};
use parking_lot::Mutex;

use super::Connection;
use crate::config::ServerConfig;
use crate::error::{Result, TabloadError};
use crate::store::TableStore;

/// TCP server exposing a [`TableStore`]
pub struct Server {
    config: ServerConfig,
    store: Arc<TableStore>,
    listener: TcpListener,
    shutdown: Arc<AtomicBool>,

    /// Accepted connections not yet finished, keyed by accept order
    open: Mutex<HashMap<u64, TcpStream>>,
}

/// Stops a running [`Server`] from another thread
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
    addr: SocketAddr,
}

impl ShutdownHandle {
    /// Signal the server to stop accepting and return from `run`
    ///
    /// Open connections are closed once the acceptor stops. A request already
    /// being executed still gets its response written if the peer reads it.
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
        // Wake the acceptor blocked in accept()
        let _ = TcpStream::connect(self.addr);
    }
}

impl Server {
    /// Bind the listen address
    pub fn bind(config: ServerConfig, store: Arc<TableStore>) -> Result<Self> {
        let listener = TcpListener::bind(&config.listen_addr).map_err(|e| {
            TabloadError::Network(format!("cannot listen on {}: {}", config.listen_addr, e))
        })?;

        Ok(Self {
            config,
            store,
            listener,
            shutdown: Arc::new(AtomicBool::new(false)),
            open: Mutex::new(HashMap::new()),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn shutdown_handle(&self) -> Result<ShutdownHandle> {
        let mut addr = self.local_addr()?;
        if addr.ip().is_unspecified() {
            addr.set_ip(IpAddr::V4(Ipv4Addr::LOCALHOST));
        }

        Ok(ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
            addr,
        })
    }

    /// Start the server (blocking until shutdown)
    pub fn run(&self) -> Result<()> {
        let workers = self.config.workers.max(1);
        let (tx, rx) = channel::bounded::<(u64, TcpStream)>(self.config.max_pending.max(1));

        tracing::info!(
            "Listening on {} with {} workers",
            self.local_addr()?,
            workers
        );

        crossbeam::scope(|scope| {
            for id in 0..workers {
                let rx = rx.clone();
                scope.spawn(move |_| self.worker_loop(id, rx));
            }
            drop(rx);

            let mut next_id = 0u64;
            for stream in self.listener.incoming() {
                if self.shutdown.load(Ordering::SeqCst) {
                    break;
                }

                match stream {
                    Ok(stream) => {
                        let id = next_id;
                        next_id += 1;

                        match stream.try_clone() {
                            Ok(handle) => {
                                self.open.lock().insert(id, handle);
                            }
                            Err(e) => tracing::warn!("Cannot track connection: {}", e),
                        }

                        if tx.send((id, stream)).is_err() {
                            tracing::error!("All workers exited; stopping acceptor");
                            break;
                        }
                    }
                    Err(e) => tracing::warn!("Accept failed: {}", e),
                }
            }

            // Only the acceptor registers connections, so none appear after this
            self.close_open_connections();

            // Closing the channel lets idle workers exit
            drop(tx);
        })
        .map_err(|_| TabloadError::Network("worker thread panicked".to_string()))?;

        tracing::info!("Server stopped");
        Ok(())
    }

    /// Shut down every tracked connection so blocked workers see end of stream
    fn close_open_connections(&self) {
        let open: Vec<TcpStream> = self.open.lock().drain().map(|(_, stream)| stream).collect();
        if !open.is_empty() {
            tracing::info!("Closing {} open connections", open.len());
        }

        for stream in open {
            if let Err(e) = stream.shutdown(Shutdown::Both) {
                tracing::debug!("Closing connection: {}", e);
            }
        }
    }

    fn worker_loop(&self, id: usize, rx: Receiver<(u64, TcpStream)>) {
        tracing::trace!("Worker {} started", id);

        for (conn_id, stream) in rx.iter() {
            self.serve(id, stream);
            self.open.lock().remove(&conn_id);
        }

        tracing::trace!("Worker {} exiting", id);
    }

    fn serve(&self, id: usize, stream: TcpStream) {
        let mut conn = match Connection::new(stream, Arc::clone(&self.store)) {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!("Worker {}: failed to set up connection: {}", id, e);
                return;
            }
        };

        if let Err(e) = conn.set_timeouts(self.config.read_timeout_ms, self.config.write_timeout_ms) {
            tracing::warn!("Worker {}: failed to set timeouts: {}", id, e);
        }

        if let Err(e) = conn.handle() {
            tracing::warn!("Worker {}: connection {} ended with error: {}", id, conn.peer_addr(), e);
        }
    }
}
