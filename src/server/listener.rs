use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::{Instrument, info};

use crate::config::Config;
use crate::http::connection::{Connection, Site};

/// Binds the configured address and serves until the task is dropped.
pub async fn run(cfg: &Config) -> anyhow::Result<()> {
    let site = Site::from_config(cfg).with_context(|| {
        format!(
            "opening document root {}",
            cfg.static_files.document_root.display()
        )
    })?;

    let listener = TcpListener::bind(&cfg.server.listen_addr)
        .await
        .with_context(|| format!("binding {}", cfg.server.listen_addr))?;

    info!(
        addr = %listener.local_addr()?,
        root = %site.resolver.root().display(),
        max_connections = cfg.server.max_connections,
        "Listening"
    );

    serve(listener, Arc::new(site), cfg.server.max_connections).await
}

/// Accept loop. Each connection runs in its own task; at most
/// `max_connections` run at once and accepting pauses while the limit is
/// reached.
pub async fn serve(listener: TcpListener, site: Arc<Site>, max_connections: usize) -> anyhow::Result<()> {
    let permits = Arc::new(Semaphore::new(max_connections));
    let mut accept_failures = 0u32;

    loop {
        if permits.available_permits() == 0 {
            tracing::debug!(max_connections, "connection limit reached, waiting");
        }
        let permit = permits.clone().acquire_owned().await?;

        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => {
                accept_failures = 0;
                accepted
            }
            Err(e) => {
                // Errors such as EMFILE persist until some connection
                // closes; retrying at once would spin.
                accept_failures = accept_failures.saturating_add(1);
                let pause = accept_backoff(accept_failures);
                tracing::warn!(error = %e, retry_in_ms = pause.as_millis() as u64, "accept failed");
                drop(permit);
                tokio::time::sleep(pause).await;
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let site = site.clone();
        tokio::spawn(
            async move {
                let outcome = Connection::new(socket, site).run().await;
                tracing::debug!(?outcome, "connection closed");
                drop(permit);
            }
            .instrument(tracing::info_span!("conn", %peer)),
        );
    }
}

/// Pause before retrying after `failures` consecutive accept errors:
/// 10ms doubling up to one second.
fn accept_backoff(failures: u32) -> Duration {
    const BASE_MS: u64 = 10;
    const MAX_MS: u64 = 1_000;

    let shift = failures.saturating_sub(1).min(16);
    Duration::from_millis((BASE_MS << shift).min(MAX_MS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_then_caps() {
        assert_eq!(accept_backoff(1), Duration::from_millis(10));
        assert_eq!(accept_backoff(2), Duration::from_millis(20));
        assert_eq!(accept_backoff(4), Duration::from_millis(80));
        assert_eq!(accept_backoff(7), Duration::from_millis(640));
        assert_eq!(accept_backoff(8), Duration::from_secs(1));
        assert_eq!(accept_backoff(u32::MAX), Duration::from_secs(1));
    }

    #[test]
    fn backoff_never_zero() {
        assert!((0..40).all(|n| accept_backoff(n) > Duration::ZERO));
    }
}
