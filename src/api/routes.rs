//! HTTP router, shared state and server lifecycle.

use std::sync::Arc;

use axum::{extract::State, response::Json, routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::seed;
use crate::task::TaskManager;
use crate::task_store::{create_task_store, TaskStore, TaskStoreType};

use super::tasks as tasks_api;
use super::types::HealthResponse;

/// Shared application state.
pub struct AppState {
    /// Which backend the manager's store is
    pub store_type: TaskStoreType,
    /// Task rules over the configured store
    pub tasks: TaskManager,
}

impl AppState {
    pub fn new(store_type: TaskStoreType, tasks: TaskManager) -> Self {
        Self { store_type, tasks }
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .nest("/tasks", tasks_api::routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let store: Arc<dyn TaskStore> =
        create_task_store(config.store_type, config.store_dir.clone())
            .await
            .map_err(|e| {
                anyhow::anyhow!(
                    "Failed to open {} task store: {}",
                    config.store_type.as_str(),
                    e
                )
            })?
            .into();
    tracing::info!(
        "Task store initialized: {} (persistent: {})",
        config.store_type.as_str(),
        store.is_persistent()
    );

    if config.seed_on_startup {
        seed::seed_if_empty(store.as_ref())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to seed task store: {}", e))?;
    }

    let state = Arc::new(AppState::new(config.store_type, TaskManager::new(store)));
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping server");
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: state.store_type.as_str().to_string(),
        persistent: state.tasks.store().is_persistent(),
    })
}
