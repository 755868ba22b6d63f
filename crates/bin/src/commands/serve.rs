//! Serve command - runs the Listenink HTTP API.

use std::time::Duration;

use axum::{
    Json, Router,
    extract::{FromRequest, Path, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::signal::unix::{SignalKind, signal};

use listenink::{
    ID, Library, TransactionOptions,
    backend::DbKind,
    library::{BookmarkPatch, CategoryPatch, DocumentPatch, NewBookmark, NewCategory, NewDocument},
    order::{Bound, parse_position},
};

use crate::backend::{backend_label, create_backend};
use crate::cli::ServeArgs;

/// Header carrying the calling user's id.
const USER_HEADER: &str = "x-user-id";

/// Shared application state
#[derive(Clone)]
struct AppState {
    library: Library,
}

/// Run the Listenink server
pub async fn run(args: &ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let backend = create_backend(&args.backend_config).await?;
    let options = TransactionOptions::default()
        .with_timeout(Duration::from_millis(args.tx_timeout_ms))
        .with_max_attempts(args.tx_max_attempts);
    let library = Library::with_options(backend, options);

    let app = router(AppState {
        library: library.clone(),
    });

    // Bind server
    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    println!("Listenink server listening on http://localhost:{}", local_addr.port());
    println!("Storage: {}", backend_label(&args.backend_config));
    println!();
    println!("Available endpoints:");
    println!("  GET    /health                              - Health check");
    println!("  GET    /api/v1/categories                   - List categories");
    println!("  POST   /api/v1/categories                   - Create a category");
    println!("  GET    /api/v1/categories/{{id}}              - Get a category");
    println!("  PATCH  /api/v1/categories/{{id}}              - Rename, recolour or move a category");
    println!("  DELETE /api/v1/categories/{{id}}              - Delete a category and its documents");
    println!("  GET    /api/v1/docs                         - List documents with bookmarks");
    println!("  POST   /api/v1/docs                         - File an uploaded document");
    println!("  GET    /api/v1/docs/{{id}}                    - Get a document");
    println!("  PATCH  /api/v1/docs/{{id}}                    - Rename or move a document");
    println!("  DELETE /api/v1/docs/{{id}}                    - Delete a document");
    println!("  POST   /api/v1/docs/{{id}}/bookmarks          - Add a bookmark");
    println!("  PATCH  /api/v1/docs/{{id}}/bookmarks/{{bid}}    - Change or move a bookmark");
    println!("  DELETE /api/v1/docs/{{id}}/bookmarks/{{bid}}    - Delete a bookmark");
    println!();
    println!("Press Ctrl+C to shutdown");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    library.backend().close().await;
    println!("Server shut down");
    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health_endpoint))
        .route(
            "/api/v1/categories",
            get(list_categories).post(create_category),
        )
        .route(
            "/api/v1/categories/{id}",
            get(get_category)
                .patch(update_category)
                .delete(delete_category),
        )
        .route("/api/v1/docs", get(list_documents).post(create_document))
        .route(
            "/api/v1/docs/{id}",
            get(get_document).patch(update_document).delete(delete_document),
        )
        .route("/api/v1/docs/{id}/bookmarks", post(create_bookmark))
        .route(
            "/api/v1/docs/{id}/bookmarks/{bid}",
            patch(update_bookmark).delete(delete_bookmark),
        )
        .with_state(state)
}

async fn shutdown_signal() {
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            tracing::warn!("Failed to set up SIGTERM handler: {e}");
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Received SIGINT, initiating graceful shutdown...");
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => tracing::info!("Received SIGTERM, initiating graceful shutdown..."),
        _ = tokio::signal::ctrl_c() => tracing::info!("Received SIGINT, initiating graceful shutdown..."),
    }
}

// ============================================================================
// Responses
// ============================================================================

/// An error response in the `{ "success": false, "err": ... }` envelope.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<listenink::Error> for ApiError {
    fn from(err: listenink::Error) -> Self {
        if err.is_user_error() {
            ApiError::new(StatusCode::BAD_REQUEST, err.to_string())
        } else if err.is_not_found() {
            ApiError::new(StatusCode::NOT_FOUND, err.to_string())
        } else {
            tracing::error!(module = err.module(), error = %err, "Request failed");
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "success": false, "err": self.message });
        (self.status, Json(body)).into_response()
    }
}

type ApiResult = Result<Response, ApiError>;

/// A success response in the `{ "success": true, "data": ... }` envelope.
fn ok<T: Serialize>(data: T) -> ApiResult {
    Ok(Json(json!({ "success": true, "data": data })).into_response())
}

/// JSON body extractor whose rejections use the error envelope.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
struct Body<T>(T);

/// The calling user, taken from the [`USER_HEADER`] header.
fn caller(headers: &HeaderMap) -> Result<ID, ApiError> {
    headers
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ID::from)
        .ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, "Unauthorized"))
}

/// Read an optional `order` field of a request body.
fn position(value: Option<&Value>, bound: Bound) -> Result<Option<i64>, ApiError> {
    value
        .map(|value| parse_position(value, bound))
        .transpose()
        .map_err(|e| ApiError::from(listenink::Error::from(e)))
}

// ============================================================================
// Request bodies
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCategoryBody {
    name: String,
    color: String,
    #[serde(default)]
    order: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateCategoryBody {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    order: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateDocumentBody {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    order: Option<Value>,
    #[serde(default)]
    category_id: Option<ID>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateBookmarkBody {
    page: i64,
    audiotime: i64,
    #[serde(default)]
    order: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateBookmarkBody {
    #[serde(default)]
    page: Option<i64>,
    #[serde(default)]
    audiotime: Option<i64>,
    #[serde(default)]
    order: Option<Value>,
}

// ============================================================================
// Health
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    backend: &'static str,
}

/// Handler for GET /health
async fn handle_health_endpoint(State(state): State<AppState>) -> Json<HealthResponse> {
    let backend = match state.library.backend().kind() {
        DbKind::Sqlite => "sqlite",
        DbKind::Postgres => "postgres",
    };
    Json(HealthResponse {
        status: "healthy",
        backend,
    })
}

// ============================================================================
// Categories
// ============================================================================

async fn list_categories(State(state): State<AppState>, headers: HeaderMap) -> ApiResult {
    let user = caller(&headers)?;
    ok(state.library.list_categories(&user).await?)
}

async fn get_category(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult {
    let user = caller(&headers)?;
    ok(state.library.get_category(&user, &id.into()).await?)
}

async fn create_category(
    State(state): State<AppState>,
    headers: HeaderMap,
    Body(body): Body<CreateCategoryBody>,
) -> ApiResult {
    let user = caller(&headers)?;
    let new = NewCategory {
        name: body.name,
        color: body.color,
        order: position(body.order.as_ref(), Bound::Position)?,
    };
    ok(state.library.create_category(&user, new).await?)
}

async fn update_category(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Body(body): Body<UpdateCategoryBody>,
) -> ApiResult {
    let user = caller(&headers)?;
    let patch = CategoryPatch {
        name: body.name,
        color: body.color,
        order: position(body.order.as_ref(), Bound::Destination)?,
    };
    ok(state.library.update_category(&user, &id.into(), patch).await?)
}

async fn delete_category(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult {
    let user = caller(&headers)?;
    ok(state.library.delete_category(&user, &id.into()).await?)
}

// ============================================================================
// Documents
// ============================================================================

async fn list_documents(State(state): State<AppState>, headers: HeaderMap) -> ApiResult {
    let user = caller(&headers)?;
    ok(state.library.list_documents(&user).await?)
}

async fn get_document(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult {
    let user = caller(&headers)?;
    ok(state.library.get_document(&user, &id.into()).await?)
}

/// Handler for POST /api/v1/docs
///
/// Files a document whose content was already stored under `contentKey`.
async fn create_document(
    State(state): State<AppState>,
    headers: HeaderMap,
    Body(new): Body<NewDocument>,
) -> ApiResult {
    let user = caller(&headers)?;
    ok(state.library.create_document(&user, new).await?)
}

async fn update_document(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Body(body): Body<UpdateDocumentBody>,
) -> ApiResult {
    let user = caller(&headers)?;
    // Within another category the order is an insert position.
    let bound = if body.category_id.is_some() {
        Bound::Position
    } else {
        Bound::Destination
    };
    let patch = DocumentPatch {
        name: body.name,
        order: position(body.order.as_ref(), bound)?,
        category_id: body.category_id,
    };
    ok(state.library.update_document(&user, &id.into(), patch).await?)
}

async fn delete_document(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult {
    let user = caller(&headers)?;
    ok(state.library.delete_document(&user, &id.into()).await?)
}

// ============================================================================
// Bookmarks
// ============================================================================

async fn create_bookmark(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(document_id): Path<String>,
    Body(body): Body<CreateBookmarkBody>,
) -> ApiResult {
    let user = caller(&headers)?;
    let new = NewBookmark {
        page: body.page,
        audiotime: body.audiotime,
        order: position(body.order.as_ref(), Bound::Position)?,
    };
    ok(state
        .library
        .create_bookmark(&user, &document_id.into(), new)
        .await?)
}

async fn update_bookmark(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((document_id, id)): Path<(String, String)>,
    Body(body): Body<UpdateBookmarkBody>,
) -> ApiResult {
    let user = caller(&headers)?;
    let patch = BookmarkPatch {
        page: body.page,
        audiotime: body.audiotime,
        order: position(body.order.as_ref(), Bound::Destination)?,
    };
    ok(state
        .library
        .update_bookmark(&user, &document_id.into(), &id.into(), patch)
        .await?)
}

async fn delete_bookmark(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((document_id, id)): Path<(String, String)>,
) -> ApiResult {
    let user = caller(&headers)?;
    ok(state
        .library
        .delete_bookmark(&user, &document_id.into(), &id.into())
        .await?)
}
