//! Axum route handlers for the product API.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::AppState;
use crate::entity::{Product, ProductUpdate};
use crate::error::TaarifaError;
use crate::validation::{validate_new_product, validate_update};

/// Response envelope shared by every endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            message: None,
        }
    }
}

/// Body of `POST /products`. Fields are optional so that a missing one is
/// reported as a validation failure rather than a decoding error.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub running: bool,
    pub uptime_secs: u64,
    pub product_count: usize,
    pub backend: String,
}

type Reply<T> = (StatusCode, Json<ApiResponse<T>>);

fn ok<T>(data: T) -> Reply<T> {
    (StatusCode::OK, Json(ApiResponse::ok(data)))
}

fn fail<T>(err: TaarifaError) -> Reply<T> {
    let status = match err {
        TaarifaError::Validation(_) => StatusCode::BAD_REQUEST,
        TaarifaError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let message = match err {
        TaarifaError::NotFound(_) => "Product not found".to_string(),
        other => other.to_string(),
    };
    (status, Json(ApiResponse::err(message)))
}

fn rejected<T>(rejection: JsonRejection) -> Reply<T> {
    debug!(error = %rejection, "rejected request body");
    fail(TaarifaError::Validation(format!(
        "Invalid request body: {}",
        rejection.body_text()
    )))
}

// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Reply<HealthStatus> {
    let (backup, backend) = {
        let store = state.store.lock().await;
        (store.list(), store.backend_name().to_string())
    };
    let products = state.reconciler.load(backup).await;
    ok(HealthStatus {
        running: true,
        uptime_secs: state.start_time.elapsed().as_secs(),
        product_count: products.len(),
        backend,
    })
}

// GET /products
pub async fn list_products(State(state): State<Arc<AppState>>) -> Reply<Vec<Product>> {
    let backup = state.store.lock().await.list();
    ok(state.reconciler.load(backup).await)
}

// POST /products
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Reply<Product> {
    let Json(req) = match payload {
        Ok(body) => body,
        Err(rejection) => return rejected(rejection),
    };

    if let Err(e) = validate_new_product(req.name.as_deref(), req.description.as_deref()) {
        return fail(e);
    }
    let (Some(name), Some(description)) = (req.name, req.description) else {
        return fail(TaarifaError::Validation(
            "Name and description are required".to_string(),
        ));
    };

    let product = state.store.lock().await.add(name, description);
    ok(product)
}

// DELETE /products
pub async fn clear_products(State(state): State<Arc<AppState>>) -> Reply<()> {
    state.store.lock().await.clear();
    warn!("all products cleared through the API");
    (
        StatusCode::OK,
        Json(ApiResponse {
            success: true,
            data: None,
            error: None,
            message: Some("All products cleared".to_string()),
        }),
    )
}

// GET /products/{hash}
pub async fn get_product_by_hash(
    State(state): State<Arc<AppState>>,
    Path(hash): Path<String>,
) -> Reply<Product> {
    let backup = state.store.lock().await.list();
    match state.reconciler.find_by_hash(backup, &hash).await {
        Some(product) => ok(product),
        None => fail(TaarifaError::NotFound(hash)),
    }
}

// GET /products/id/{id}
pub async fn get_product_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Reply<Product> {
    let backup = state.store.lock().await.list();
    match state.reconciler.find_by_id(backup, &id).await {
        Some(product) => ok(product),
        None => fail(TaarifaError::NotFound(id)),
    }
}

// PATCH /products/id/{id}
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<ProductUpdate>, JsonRejection>,
) -> Reply<Product> {
    let Json(update) = match payload {
        Ok(body) => body,
        Err(rejection) => return rejected(rejection),
    };

    if let Err(e) = validate_update(&update) {
        return fail(e);
    }

    match state.store.lock().await.update(&id, update) {
        Some(product) => ok(product),
        None => fail(TaarifaError::NotFound(id)),
    }
}

// DELETE /products/id/{id}
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Reply<bool> {
    if state.store.lock().await.delete(&id) {
        ok(true)
    } else {
        fail(TaarifaError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::super::{router, AppState};
    use super::*;
    use crate::reconcile::{BaselineSource, Reconciler};
    use crate::storage::ProductStore;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use axum::Router;
    use serde::de::DeserializeOwned;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn app() -> Router {
        router(Arc::new(AppState::new(
            ProductStore::in_memory(),
            Reconciler::new(None),
        )))
    }

    async fn send<T: DeserializeOwned>(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<&str>,
    ) -> (StatusCode, ApiResponse<T>) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(b) => builder
                .header("content-type", "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn create(app: &Router, name: &str, description: &str) -> Product {
        let body = serde_json::json!({ "name": name, "description": description }).to_string();
        let (status, resp) = send::<Product>(app, Method::POST, "/products", Some(&body)).await;
        assert_eq!(status, StatusCode::OK);
        resp.data.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_fetch_by_hash() {
        let app = app();
        let product = create(&app, "Widget Pro", "A very good widget").await;
        assert_eq!(product.name, "Widget Pro");
        assert!(!product.hash.is_empty());

        let (status, resp) =
            send::<Product>(&app, Method::GET, &format!("/products/{}", product.hash), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(resp.success);
        assert_eq!(resp.data, Some(product));
    }

    #[tokio::test]
    async fn test_list_products() {
        let app = app();
        let (status, resp) = send::<Vec<Product>>(&app, Method::GET, "/products", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resp.data, Some(Vec::new()));

        create(&app, "First product", "Description one").await;
        create(&app, "Second product", "Description two").await;

        let (_, resp) = send::<Vec<Product>>(&app, Method::GET, "/products", None).await;
        let names: Vec<String> = resp.data.unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["First product", "Second product"]);
    }

    #[tokio::test]
    async fn test_create_rejects_short_fields() {
        let app = app();
        let (status, resp) = send::<Product>(
            &app,
            Method::POST,
            "/products",
            Some(r#"{"name":"ab","description":"cd"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!resp.success);
        assert!(resp.error.unwrap().contains("at least 5 characters"));

        let (_, list) = send::<Vec<Product>>(&app, Method::GET, "/products", None).await;
        assert!(list.data.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_missing_fields() {
        let app = app();
        let (status, resp) =
            send::<Product>(&app, Method::POST, "/products", Some(r#"{"name":"Widget Pro"}"#))
                .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(resp.error.as_deref(), Some("Name and description are required"));
    }

    #[tokio::test]
    async fn test_create_rejects_malformed_body() {
        let app = app();
        let (status, resp) =
            send::<Product>(&app, Method::POST, "/products", Some("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!resp.success);
    }

    #[tokio::test]
    async fn test_unknown_hash_is_404() {
        let app = app();
        let (status, resp) =
            send::<Product>(&app, Method::GET, "/products/nonexistent", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(resp.error.as_deref(), Some("Product not found"));
    }

    #[tokio::test]
    async fn test_clear_products() {
        let app = app();
        create(&app, "Widget Pro", "A very good widget").await;

        let (status, resp) = send::<()>(&app, Method::DELETE, "/products", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(resp.success);
        assert_eq!(resp.message.as_deref(), Some("All products cleared"));

        let (_, health) = send::<HealthStatus>(&app, Method::GET, "/health", None).await;
        assert_eq!(health.data.unwrap().product_count, 0);
    }

    #[tokio::test]
    async fn test_update_and_delete_by_id() {
        let app = app();
        let product = create(&app, "Widget Pro", "A very good widget").await;
        let uri = format!("/products/id/{}", product.id);

        let (status, resp) = send::<Product>(
            &app,
            Method::PATCH,
            &uri,
            Some(r#"{"name":"Widget Max"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let updated = resp.data.unwrap();
        assert_eq!(updated.name, "Widget Max");
        assert_eq!(updated.hash, product.hash);

        let (status, _) =
            send::<Product>(&app, Method::PATCH, &uri, Some(r#"{"name":"abc"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, resp) = send::<Product>(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resp.data.unwrap().name, "Widget Max");

        let (status, resp) = send::<bool>(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resp.data, Some(true));

        let (status, _) = send::<bool>(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send::<Product>(
            &app,
            Method::PATCH,
            &uri,
            Some(r#"{"name":"Widget Max"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_reads_include_baseline() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("products.json");
        let baseline = vec![Product::new(
            "base00001".to_string(),
            "Baseline product".to_string(),
            "Shipped with the site".to_string(),
            crate::identity::HashStrategy::Sha256,
        )];
        std::fs::write(&path, serde_json::to_string(&baseline).unwrap()).unwrap();

        let app = router(Arc::new(AppState::new(
            ProductStore::in_memory(),
            Reconciler::new(Some(BaselineSource::File(path))),
        )));
        let added = create(&app, "Widget Pro", "A very good widget").await;

        let (_, resp) = send::<Vec<Product>>(&app, Method::GET, "/products", None).await;
        let ids: Vec<String> = resp.data.unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["base00001".to_string(), added.id]);

        let (status, resp) = send::<Product>(
            &app,
            Method::GET,
            &format!("/products/{}", baseline[0].hash),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resp.data, Some(baseline[0].clone()));

        let (_, resp) = send::<HealthStatus>(&app, Method::GET, "/health", None).await;
        assert_eq!(resp.data.unwrap().product_count, 2);
    }

    #[tokio::test]
    async fn test_health() {
        let app = app();
        create(&app, "Widget Pro", "A very good widget").await;

        let (status, resp) = send::<HealthStatus>(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        let health = resp.data.unwrap();
        assert!(health.running);
        assert_eq!(health.product_count, 1);
        assert_eq!(health.backend, "memory");
    }
}
