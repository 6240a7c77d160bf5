use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, StatusCode, Uri, header},
    middleware::map_response,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
};

use crate::{
    error::{AppError, status_message},
    response::ErrorBody,
    state::AppState,
};

pub mod doc;
pub mod health;
pub mod pages;
pub mod params;
pub mod products;
pub mod receipts;
pub mod users;

/// Largest receipt photo accepted by the upload form.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Sent on every response, not only on preflight.
const CORS_ALLOW_HEADERS: &str = "Authorization, Content-Type";
const CORS_ALLOW_METHODS: &str = "GET, POST, DELETE, PATCH";

/// Every page and JSON endpoint, with the JSON error fallbacks and CORS.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/health", get(health::health_check))
        .route(
            "/receipts",
            post(receipts::upload_receipt).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .nest("/products", products::router())
        .nest("/users", users::router())
        .merge(doc::scalar_docs())
        .fallback(not_found)
        .layer(map_response(json_method_not_allowed))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(CORS_ALLOW_HEADERS),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(CORS_ALLOW_METHODS),
        ))
        .layer(cors_layer())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::PATCH])
}

async fn not_found(uri: Uri) -> (StatusCode, Json<ErrorBody>) {
    tracing::debug!(path = %uri.path(), "no route");
    let status = StatusCode::NOT_FOUND;
    (
        status,
        Json(ErrorBody::new(status.as_u16(), status_message(status))),
    )
}

/// Replaces axum's empty 405 with the JSON error body, keeping `Allow`.
async fn json_method_not_allowed(response: Response) -> Response {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED
        || response.headers().contains_key(header::CONTENT_TYPE)
    {
        return response;
    }

    let allow: Option<HeaderValue> = response.headers().get(header::ALLOW).cloned();
    let mut replaced = AppError::MethodNotAllowed.into_response();
    if let Some(allow) = allow {
        replaced.headers_mut().insert(header::ALLOW, allow);
    }
    replaced
}
