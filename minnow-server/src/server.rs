//! Connection acceptance and per-connection request handling

use crate::error::ServerError;
use crate::handlers::{self, Reply, StaticRoot};
use crate::response;
use crate::router::{self, Route};
use crate::AppState;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::net::TcpListener;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info, warn};

/// Read buffer size; one byte is kept back so a request never fills it
const BUFFER_SIZE: usize = 1024;

/// How accepted connections are turned into tasks
#[derive(Debug, Clone)]
enum SpawnStrategy {
    /// One task per connection, no cap
    Unbounded,
    /// At most `n` live connection tasks; accepting waits for a free slot
    Bounded(Arc<Semaphore>),
}

impl SpawnStrategy {
    fn from_limit(limit: Option<usize>) -> Self {
        match limit {
            Some(n) => SpawnStrategy::Bounded(Arc::new(Semaphore::new(n))),
            None => SpawnStrategy::Unbounded,
        }
    }

    async fn admit(&self) -> Option<OwnedSemaphorePermit> {
        match self {
            SpawnStrategy::Unbounded => None,
            // the semaphore is never closed
            SpawnStrategy::Bounded(slots) => slots.clone().acquire_owned().await.ok(),
        }
    }
}

/// Bind the listening socket from the current configuration
pub async fn bind_listener(state: &AppState) -> Result<TcpListener, ServerError> {
    let addr_str = state.config.read().await.listen_address();
    let addr: SocketAddr = addr_str
        .parse()
        .map_err(|_| ServerError::Address(addr_str.clone()))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr_str,
            source,
        })?;

    info!("HTTP server listening on http://{}", addr);
    Ok(listener)
}

/// Accept connections forever, handling each one in its own task
pub async fn serve(listener: TcpListener, state: Arc<AppState>) {
    let strategy = SpawnStrategy::from_limit(state.config.read().await.server.max_connections);
    if let SpawnStrategy::Bounded(slots) = &strategy {
        info!(
            "Connection limit: {} concurrent connections",
            slots.available_permits()
        );
    }

    loop {
        let permit = strategy.admit().await;

        let Some((stream, remote_addr)) = accepted(listener.accept().await) else {
            continue;
        };

        let state = state.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, remote_addr, &state).await {
                debug!("Connection from {} abandoned: {}", remote_addr, e);
            }
            drop(permit);
        });
    }
}

/// Failed accepts are logged and skipped; they never stop the loop
fn accepted<T>(result: io::Result<(T, SocketAddr)>) -> Option<(T, SocketAddr)> {
    match result {
        Ok(conn) => Some(conn),
        Err(e) => {
            warn!("Failed to accept connection: {}", e);
            None
        }
    }
}

/// Read one request, dispatch it and write the reply.
///
/// The connection is closed when the stream is dropped on return.
async fn handle_connection<S>(
    mut stream: S,
    remote_addr: SocketAddr,
    state: &AppState,
) -> Result<(), ServerError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buffer = [0u8; BUFFER_SIZE];
    let received = stream
        .read(&mut buffer[..BUFFER_SIZE - 1])
        .await
        .map_err(ServerError::Read)?;
    let request = &buffer[..received];

    state.stats.record(received as u64, 0).await;

    let (access_log, static_root) = {
        let config = state.config.read().await;
        (
            config.server.access_log,
            StaticRoot::from_config(&config.static_files),
        )
    };

    if access_log {
        info!("{} - {}", remote_addr.ip(), request_line(request));
    }

    let reply = match router::route(request) {
        Route::StaticAsset(path) => handlers::serve_static(&static_root, &path).await,
        Route::Stats => handlers::serve_stats(&state.stats).await,
        Route::Calc(query) => handlers::serve_calc(&query),
        Route::Unknown => Reply::NotFound,
    };

    match reply {
        Reply::Content { content_type, body } => {
            response::send(&mut stream, &state.stats, content_type, &body).await
        }
        Reply::NotFound => response::send_not_found(&mut stream).await,
    }
}

fn request_line(request: &[u8]) -> String {
    String::from_utf8_lossy(request)
        .lines()
        .next()
        .unwrap_or_default()
        .to_string()
}
