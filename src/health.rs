//! Liveness endpoint.
//!
//! A bare HTTP listener that answers any request with a static body so the
//! hosting platform's health check keeps the process alive. It shares no
//! state with the pipeline and runs for the process lifetime.

use std::net::SocketAddr;

use axum::Router;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::error::HealthError;

/// Minimal always-listening HTTP responder.
pub struct LivenessServer {
    addr: SocketAddr,
    local_addr: Option<SocketAddr>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl LivenessServer {
    /// Create a server that will bind `0.0.0.0:port`.
    pub fn new(port: u16) -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], port)),
            local_addr: None,
            shutdown_tx: None,
            handle: None,
        }
    }

    /// Bind the listener and spawn the server task.
    pub async fn start(&mut self) -> Result<(), HealthError> {
        let app = Router::new().fallback(|| async { "OK" });

        let listener =
            tokio::net::TcpListener::bind(self.addr)
                .await
                .map_err(|e| HealthError::BindFailed {
                    addr: self.addr.to_string(),
                    reason: e.to_string(),
                })?;
        let local_addr = listener.local_addr().map_err(|e| HealthError::BindFailed {
            addr: self.addr.to_string(),
            reason: e.to_string(),
        })?;
        self.local_addr = Some(local_addr);

        tracing::info!("liveness listener on {}", local_addr);

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        self.shutdown_tx = Some(shutdown_tx);

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                    tracing::info!("liveness listener shutting down");
                })
                .await
            {
                tracing::error!("liveness listener error: {}", e);
            }
        });

        self.handle = Some(handle);
        Ok(())
    }

    /// The address actually bound, available after `start`.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Signal graceful shutdown and wait for the server task to finish.
    pub async fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loopback_server() -> LivenessServer {
        let mut server = LivenessServer::new(0);
        server.addr = "127.0.0.1:0".parse().unwrap();
        server
    }

    #[tokio::test]
    async fn test_start_and_shutdown_lifecycle() {
        let mut server = loopback_server();
        server.start().await.expect("server should start on port 0");
        assert!(server.local_addr().is_some());
        assert!(server.handle.is_some());
        server.shutdown().await;
        assert!(server.handle.is_none());
    }

    #[tokio::test]
    async fn test_answers_any_path_with_static_body() {
        let mut server = loopback_server();
        server.start().await.unwrap();
        let addr = server.local_addr().unwrap();

        let body = reqwest::get(format!("http://{}/anything/at/all", addr))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "OK");

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_start_on_occupied_port_returns_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let occupied = listener.local_addr().unwrap();

        let mut server = LivenessServer::new(occupied.port());
        server.addr = occupied;
        let result = server.start().await;
        assert!(matches!(result, Err(HealthError::BindFailed { .. })));
    }

    #[tokio::test]
    async fn test_shutdown_when_not_started_is_noop() {
        let mut server = loopback_server();
        server.shutdown().await;
    }
}
