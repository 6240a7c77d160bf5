use axum::{extract::State, response::Response};
use tera::Context;

use crate::{
    error::AppResult,
    state::AppState,
    views::{IncomingFlash, render_page},
};

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Home page", body = String, content_type = "text/html")
    ),
    tag = "Pages"
)]
pub async fn home(State(state): State<AppState>, flash: IncomingFlash) -> AppResult<Response> {
    render_page(&state.templates, "pages/home.html", Context::new(), &flash)
}
