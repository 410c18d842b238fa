//! JSON HTTP transport over a shared product store.
//!
//! Routes:
//! - `GET /products`, `POST /products`, `DELETE /products`
//! - `GET /products/{hash}`
//! - `GET|PATCH|DELETE /products/id/{id}`
//! - `GET /health`

mod routes;

pub use routes::{ApiResponse, CreateProductRequest, HealthStatus};

use std::sync::Arc;
use std::time::Instant;

use axum::routing::get;
use axum::Router;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::Result;
use crate::reconcile::Reconciler;
use crate::storage::ProductStore;

/// Shared state handed to every request handler.
///
/// The store sits behind a mutex so that writes are serialised; readers take
/// a snapshot and release the lock before any baseline fetch.
pub struct AppState {
    pub store: Arc<Mutex<ProductStore>>,
    pub reconciler: Reconciler,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: ProductStore, reconciler: Reconciler) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            reconciler,
            start_time: Instant::now(),
        }
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route(
            "/products",
            get(routes::list_products)
                .post(routes::create_product)
                .delete(routes::clear_products),
        )
        .route("/products/{hash}", get(routes::get_product_by_hash))
        .route(
            "/products/id/{id}",
            get(routes::get_product_by_id)
                .patch(routes::update_product)
                .delete(routes::delete_product),
        )
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(state: AppState, addr: &str) -> Result<()> {
    let backend = state.store.lock().await.backend_name();
    let baseline = state
        .reconciler
        .baseline()
        .map(|b| b.to_string())
        .unwrap_or_else(|| "none".to_string());
    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        backend,
        baseline = %baseline,
        "taarifa listening on http://{}",
        listener.local_addr()?
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
