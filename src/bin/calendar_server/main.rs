//! Mock calendar API server.

use kalenteri::error::Error;
use kalenteri::server::{router, AppState};
use kalenteri::{shutdown, startup};
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    startup::init_logging(startup::SERVER_LOG_FILTER)?;

    info!("Starting calendar mock server");

    let config = startup::load_config()?;
    let state = AppState::from_config(&config)?;
    let app = router(state);

    // Bind to address and run server
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(Error::from)?;
    info!("Mock API server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::shutdown_signal())
        .await
        .map_err(Error::from)?;

    info!("Server stopped");
    Ok(())
}
