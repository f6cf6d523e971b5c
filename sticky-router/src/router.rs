//! Connection acceptance and bidirectional forwarding.
//!
//! Mirrors the teacher's `message_relay.rs` shape: spawn a pair of tasks per
//! connection and race them with `tokio::select!`, aborting whichever task
//! is still running once the other completes. The difference from the
//! teacher is that there's no protocol here to validate — raw bytes flow
//! both ways, untouched.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

use crate::config::Config;
use crate::error::RouterError;
use crate::hash::sticky_index;

/// Process-wide sticky map: client IP text -> chosen backend index. Entries
/// live only as long as the router process; nothing here is persisted.
pub struct StickyMap {
    entries: Mutex<HashMap<String, usize>>,
}

impl StickyMap {
    pub fn new() -> Self {
        StickyMap {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the backend index for `client_ip`, computing and recording
    /// one on first sight. An existing entry that has gone out of range
    /// (the backend list shrank since it was recorded) is recomputed.
    pub async fn resolve(&self, client_ip: &str, backend_count: usize) -> usize {
        let mut entries = self.entries.lock().await;
        if let Some(&index) = entries.get(client_ip) {
            if index < backend_count {
                return index;
            }
        }
        let index = sticky_index(client_ip, backend_count);
        entries.insert(client_ip.to_string(), index);
        index
    }
}

pub async fn serve(config: Config) -> Result<(), RouterError> {
    let listener = TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|source| RouterError::DialFailed {
            addr: config.listen_addr.clone(),
            source,
        })?;
    serve_on(listener, config).await
}

/// Runs the accept loop against an already-bound listener. Split out of
/// [`serve`] so tests can bind an ephemeral port themselves and learn its
/// address before the loop starts.
pub async fn serve_on(listener: TcpListener, config: Config) -> Result<(), RouterError> {
    if config.backends.is_empty() {
        return Err(RouterError::NoBackends);
    }

    let backends = Arc::new(config.backends.clone());
    let sticky = Arc::new(StickyMap::new());

    tracing::info!(listen_addr = %config.listen_addr, backend_count = backends.len(), "Sticky router listening.");

    loop {
        let (client_sock, peer_addr) = match listener.accept().await {
            Ok(pair) => pair,
            Err(err) => {
                tracing::warn!(error = %err, "Failed to accept connection.");
                continue;
            }
        };

        let backends = backends.clone();
        let sticky = sticky.clone();

        tokio::spawn(async move {
            let client_ip = peer_addr.ip().to_string();
            let index = sticky.resolve(&client_ip, backends.len()).await;
            let backend_addr = &backends[index];

            tracing::info!(%client_ip, backend_addr, index, "Routing connection.");

            match TcpStream::connect(backend_addr).await {
                Ok(backend_sock) => {
                    let reason = forward(client_sock, backend_sock).await;
                    tracing::info!(%client_ip, backend_addr, reason, "Connection closed.");
                }
                Err(err) => {
                    tracing::warn!(%client_ip, backend_addr, error = %err, "Failed to dial backend, dropping client.");
                }
            }
        });
    }
}

/// Forwards bytes in both directions between `client` and `backend` until
/// either side hits EOF or an error, then tears down both halves.
async fn forward(client: TcpStream, backend: TcpStream) -> &'static str {
    let (client_read, client_write) = client.into_split();
    let (backend_read, backend_write) = backend.into_split();

    let mut client_to_backend = tokio::spawn(pump(client_read, backend_write));
    let mut backend_to_client = tokio::spawn(pump(backend_read, client_write));

    tokio::select! {
        res = &mut client_to_backend => {
            backend_to_client.abort();
            res.unwrap_or("client->backend task panicked")
        }
        res = &mut backend_to_client => {
            client_to_backend.abort();
            res.unwrap_or("backend->client task panicked")
        }
    }
}

async fn pump(mut src: OwnedReadHalf, mut dst: OwnedWriteHalf) -> &'static str {
    let mut buf = [0u8; 4096];
    loop {
        let n = match src.read(&mut buf).await {
            Ok(0) => return "eof",
            Ok(n) => n,
            Err(_) => return "read error",
        };
        if dst.write_all(&buf[..n]).await.is_err() {
            return "write error";
        }
    }
}
