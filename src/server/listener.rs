use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::http::connection::Connection;
use crate::site::SiteRegistry;

/// Accepts connections and spawns one task per connection, so the loop
/// resumes accepting immediately. A failed connection task is logged
/// and never takes the loop down.
pub async fn run(registry: Arc<SiteRegistry>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(registry.listen_addr()).await?;
    info!("Listening on {}", registry.listen_addr());

    loop {
        let (socket, peer) = listener.accept().await?;
        tracing::debug!(peer = %peer, "Accepted connection");

        let registry = Arc::clone(&registry);
        tokio::spawn(async move {
            let mut conn = Connection::new(socket, peer, registry);
            if let Err(e) = conn.run().await {
                tracing::error!(peer = %peer, error = %e, "Connection error");
            }
        });
    }
}
