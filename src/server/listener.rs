use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{Instrument, info, info_span, warn};

use crate::config::Config;
use crate::http::connection::{Connection, Timeouts};
use crate::http::service::Service;
use crate::routes::{FileStore, Router};

/// Pause after a failed accept, so a persistent failure such as running out
/// of file descriptors does not spin.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

pub async fn run(cfg: &Config) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.server.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.server.listen_addr))?;
    info!("Listening on {}", cfg.server.listen_addr);

    let directory = &cfg.static_files.directory;
    if !directory.is_dir() {
        warn!(directory = %directory.display(), "Serving directory does not exist");
    }

    let router = Arc::new(Router::new(FileStore::new(directory.clone())));
    serve(listener, router, cfg.timeouts()).await
}

/// Accepts connections forever, running each one in its own task.
///
/// Connections share nothing but `service`; an error on one connection is
/// logged and never reaches the others or the accept loop.
pub async fn serve<T: Service>(
    listener: TcpListener,
    service: Arc<T>,
    timeouts: Timeouts,
) -> anyhow::Result<()> {
    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(error = %e, "Failed to accept connection");
                tokio::time::sleep(ACCEPT_BACKOFF).await;
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let service = Arc::clone(&service);
        tokio::spawn(
            async move {
                let conn = Connection::new(socket, service, timeouts);
                if let Err(e) = conn.run().await {
                    warn!(error = %format!("{e:#}"), "Connection closed with error");
                }
            }
            .instrument(info_span!("conn", %peer)),
        );
    }
}
