use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    middleware,
    routing::get,
    Router,
};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use crate::model::{Interest, Link, Person};
use crate::storage::{DbContext, SqliteStore};

pub mod auth;
pub mod routes;

/// Server state
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<SqliteStore>>,
}

impl AppState {
    pub fn new(store: SqliteStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }
}

/// Handle to the store injected into a handler. The store is locked only
/// when `context()` is awaited, after the other extractors (request body
/// included) have finished.
pub struct Db {
    store: Arc<Mutex<SqliteStore>>,
}

impl Db {
    /// Lock the store for the rest of the request
    pub async fn context(&self) -> DbContext<OwnedMutexGuard<SqliteStore>> {
        DbContext::new(self.store.clone().lock_owned().await)
    }
}

impl FromRequestParts<AppState> for Db {
    type Rejection = Infallible;

    async fn from_request_parts(_parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(Db { store: state.store.clone() })
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/people", get(routes::list_people).post(routes::create::<Person>))
        .route(
            "/people/{id}",
            get(routes::find::<Person>)
                .put(routes::update::<Person>)
                .delete(routes::remove::<Person>),
        )
        .route("/interests", get(routes::list_interests).post(routes::create::<Interest>))
        .route(
            "/interests/{id}",
            get(routes::find::<Interest>)
                .put(routes::update::<Interest>)
                .delete(routes::remove::<Interest>),
        )
        .route("/links", get(routes::list_links).post(routes::create::<Link>))
        .route(
            "/links/{id}",
            get(routes::find::<Link>)
                .put(routes::update::<Link>)
                .delete(routes::remove::<Link>),
        )
        .route("/peopleWithInterestsAndLinks", get(routes::people_with_interests_and_links))
        .route("/personWithInterests/{id}", get(routes::person_with_interests))
        .route("/personWithLinks/{id}", get(routes::person_with_links))
        .layer(middleware::from_fn(auth::authorize))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(addr: SocketAddr, store: SqliteStore) -> anyhow::Result<()> {
    let app = router(AppState::new(store));

    tracing::info!("Starting server on {}", addr);
    println!("🌍 Server running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
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
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::warn!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::warn!("Received SIGTERM, shutting down"),
    }
}
