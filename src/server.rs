//! Connection Dispatcher
//!
//! Accepts client connections and runs each one in its own task.
//!
//! # Responsibilities
//! - Bind the listening socket
//! - Spawn one task per accepted connection
//! - Optionally cap concurrent connections with a semaphore
//! - Treat accept errors as transient

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info, warn};

use crate::proxy::{serve_client, ProxyState};

/// Pause after a failed accept so a persistent failure does not spin.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(10);

// == Server ==
/// The proxy's listening side.
pub struct Server {
    listener: TcpListener,
    state: ProxyState,
    /// Present only when a connection limit is configured
    connection_limit: Option<Arc<Semaphore>>,
}

impl Server {
    /// Binds `addr`. `max_connections` of None leaves concurrency unbounded.
    pub async fn bind<A: ToSocketAddrs>(
        addr: A,
        state: ProxyState,
        max_connections: Option<usize>,
    ) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;

        info!(
            address = %listener.local_addr()?,
            max_connections = ?max_connections,
            "Listener bound"
        );

        Ok(Self {
            listener,
            state,
            connection_limit: max_connections.map(|n| Arc::new(Semaphore::new(n))),
        })
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    // == Accept Loop ==
    /// Accepts connections until `shutdown` completes.
    ///
    /// Connection tasks already running are left to finish on their own.
    pub async fn run<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            let permit = tokio::select! {
                permit = self.acquire_slot() => permit,
                _ = &mut shutdown => break,
            };

            let (stream, peer) = tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok(pair) => pair,
                    Err(err) => {
                        warn!(error = %err, "Accept failed");
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                        continue;
                    }
                },
                _ = &mut shutdown => break,
            };

            let state = self.state.clone();
            tokio::spawn(async move {
                // Held until the connection is finished
                let _permit = permit;
                handle_connection(stream, peer, &state).await;
            });
        }

        info!("Accept loop stopped");
    }

    /// Waits for a free slot when a limit is set.
    async fn acquire_slot(&self) -> Option<OwnedSemaphorePermit> {
        match &self.connection_limit {
            // The semaphore is never closed, so acquisition only fails if it was
            Some(limit) => Arc::clone(limit).acquire_owned().await.ok(),
            None => None,
        }
    }
}

/// Serves one connection and closes it.
async fn handle_connection(mut stream: TcpStream, peer: SocketAddr, state: &ProxyState) {
    debug!(%peer, "Connection accepted");

    match serve_client(&mut stream, state).await {
        Ok(outcome) => debug!(%peer, ?outcome, "Connection finished"),
        Err(err) => debug!(%peer, error = %err, "Connection aborted"),
    }

    let _ = stream.shutdown().await;
}
