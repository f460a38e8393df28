//! Shared state, route table, and server lifecycle.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::tasks;
use crate::config::Config;
use crate::store::{SharedStore, SqliteTaskStore};

/// Shared application state.
pub struct AppState {
    /// The persistence backend; handlers never touch storage directly.
    pub store: SharedStore,
}

/// Build the route table.
///
/// Static segments win over the `:id` capture, so `/task/new/` is not
/// shadowed by `/task/:id/`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(tasks::list))
        .route("/task/new/", get(tasks::new_form).post(tasks::create))
        .route("/task/:id/", get(tasks::detail))
        .route("/task/:id/edit/", get(tasks::edit_form).post(tasks::update))
        .route(
            "/task/:id/delete/",
            get(tasks::confirm_delete).post(tasks::delete),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let store: SharedStore = Arc::new(SqliteTaskStore::open(&config.database_path)?);
    let state = Arc::new(AppState { store });
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for ctrl-c or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
