//! School admin server.
//!
//! Run from repo root: `cargo run -p school-admin-server`
//! Settings come from the environment or a `.env` file (SCHOOL_DB_URL, SPIN_DB_URL, BIND_ADDR, ...).

use school_admin::{app_router, bootstrap, logging::init_tracing, Settings};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;
    init_tracing();

    let bind_addr = settings.bind_addr.clone();
    let state = bootstrap(settings).await?;
    let app = app_router(state);

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("school admin listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
