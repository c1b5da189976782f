//! Application startup and lifecycle management.

use axum::{
    middleware::from_fn,
    routing::get,
    Router,
};
use secrecy::ExposeSecret;
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware, REQUEST_ID_HEADER};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::{PeopleConfig, ShowRouteMode, StoreBackend, StoreConfig};
use crate::handlers;
use crate::services::{InMemoryPersonStore, MongoPersonStore, PersonStore};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PersonStore>,
    pub show_route: ShowRouteMode,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::hello_world))
        .route(
            "/people",
            get(handlers::list_people).post(handlers::create_person),
        )
        .route(
            "/people/:id",
            get(handlers::show_person)
                .put(handlers::update_person)
                .delete(handlers::delete_person),
        )
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Opens the configured store and reports whether it answers. An unreachable
/// database is logged, not fatal: requests fail individually until it is back.
pub async fn connect_store(config: &StoreConfig) -> Result<Arc<dyn PersonStore>, AppError> {
    let store: Arc<dyn PersonStore> = match config.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Arc::new(InMemoryPersonStore::new())
        }
        StoreBackend::Mongo => {
            let url = config.database_url.as_ref().ok_or_else(|| {
                AppError::ConfigError(anyhow::anyhow!("DATABASE_URL is required but not set"))
            })?;
            let store = MongoPersonStore::connect(url.expose_secret(), &config.database_name)
                .await
                .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
            Arc::new(store)
        }
    };

    match store.health_check().await {
        Ok(()) => tracing::info!("Connected to the people store"),
        Err(e) => tracing::error!("People store is not reachable yet: {}", e),
    }

    Ok(store)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: PeopleConfig) -> Result<Self, AppError> {
        let store = connect_store(&config.store).await?;
        Self::build_with_store(config, store).await
    }

    /// Build the application around an already constructed store.
    pub async fn build_with_store(
        config: PeopleConfig,
        store: Arc<dyn PersonStore>,
    ) -> Result<Self, AppError> {
        if config.show_route == ShowRouteMode::Legacy {
            tracing::warn!("GET /people/:id runs in legacy mode and performs an update");
        }

        let state = AppState {
            store,
            show_route: config.show_route,
        };
        let router = build_router(state);

        // Port 0 picks a random port (tests)
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until Ctrl+C or SIGTERM.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
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

    tracing::info!("Shutdown signal received");
}
