use crate::{create_router, AppState};
use petadmin_core::{Result, Settings};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

pub struct Server {
    state: AppState,
    addr: SocketAddr,
}

impl Server {
    pub async fn new(addr: SocketAddr, settings: Arc<Settings>) -> Result<Self> {
        let state = AppState::new(settings).await?;
        Ok(Self { state, addr })
    }

    pub async fn run(self) -> Result<()> {
        let router = create_router(self.state);

        info!("Starting PetAdmin API server on {}", self.addr);

        // Bind with tuned socket options for better keep-alive behavior
        let listener = {
            let socket = if self.addr.is_ipv6() {
                tokio::net::TcpSocket::new_v6()
            } else {
                tokio::net::TcpSocket::new_v4()
            }?;

            // Reuse addr/port to improve rebind under restarts
            let _ = socket.set_reuseaddr(true);
            #[cfg(unix)]
            let _ = socket.set_reuseport(true);
            let _ = socket.set_keepalive(true);

            socket.bind(self.addr)?;
            socket.listen(1024)?
        };

        info!("Server listening on http://{}", self.addr);
        info!("API endpoints:");
        info!("  GET  /health - Health check");
        info!("  GET  /users?role=&q=&page=&per_page= - List users");
        info!("  GET  /pets?status=&species=&q= - List pets");
        info!("  GET  /pets/:id - Pet with vaccination history");
        info!("  GET  /applications?status=&pet_id= - List applications");
        info!("  POST /applications/:id/decision - Approve or reject");
        info!("  GET  /vaccinations?due_before= - List vaccination records");
        info!("  GET  /dashboard - Dashboard statistics");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| petadmin_core::PetAdminError::Io(e.into()))?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully");
        },
    }
}
