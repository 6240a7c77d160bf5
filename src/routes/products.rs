use axum::{
    Form, Json, Router,
    extract::State,
    response::Response,
    routing::{get, post},
};
use tera::Context;

use crate::{
    db::in_transaction,
    dto::products::ProductForm,
    error::{AppError, AppResult, StoreError},
    middleware::auth::{Authorized, DeleteProduct},
    models::Product,
    response::{ErrorBody, MessageResponse},
    routes::params::IdPath,
    services::product_service::{self, format_product},
    state::AppState,
    views::{IncomingFlash, redirect_with_flash, render_page},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/create", get(create_product_form))
        .route("/{id}", get(edit_product_form).delete(delete_product))
        .route("/{id}/edit", post(edit_product_submission))
}

#[utoipa::path(
    get,
    path = "/products",
    responses(
        (status = 200, description = "Products page", body = String, content_type = "text/html")
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    flash: IncomingFlash,
) -> AppResult<Response> {
    let products: Vec<Product> = product_service::list_products(&state.orm)
        .await?
        .into_iter()
        .map(format_product)
        .collect();

    let mut context = Context::new();
    context.insert("products", &products);
    render_page(&state.templates, "pages/products.html", context, &flash)
}

pub async fn create_product_form(
    State(state): State<AppState>,
    flash: IncomingFlash,
) -> AppResult<Response> {
    render_page(
        &state.templates,
        "forms/new_product.html",
        Context::new(),
        &flash,
    )
}

pub async fn create_product(
    State(state): State<AppState>,
    Form(form): Form<ProductForm>,
) -> AppResult<Response> {
    let name = form.name.trim().to_string();
    let message = match form.validate() {
        Err(errors) => {
            format!("An error occurred. Product {name} could not be listed: {errors}.")
        }
        Ok(input) => {
            match in_transaction(&state.orm, |txn| {
                Box::pin(product_service::insert_product(txn, input))
            })
            .await
            {
                Ok(product) => {
                    tracing::info!(product_id = product.id, "product created");
                    format!("Product {name} was successfully listed!")
                }
                Err(err) => {
                    tracing::warn!(error = %err, "product create failed");
                    format!("An error occurred. Product {name} could not be listed.")
                }
            }
        }
    };

    let mut context = Context::new();
    context.insert("flash", &message);
    render_page(
        &state.templates,
        "pages/home.html",
        context,
        &IncomingFlash::default(),
    )
}

#[utoipa::path(
    get,
    path = "/products/{id}",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Prefilled edit form", body = String, content_type = "text/html"),
        (status = 404, description = "Product not found", body = ErrorBody),
    ),
    tag = "Products"
)]
pub async fn edit_product_form(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    flash: IncomingFlash,
) -> AppResult<Response> {
    let product = format_product(product_service::find_product(&state.orm, id).await?);

    let mut context = Context::new();
    context.insert("product", &product);
    render_page(&state.templates, "forms/edit_product.html", context, &flash)
}

pub async fn edit_product_submission(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    Form(form): Form<ProductForm>,
) -> Response {
    let name = form.name.trim().to_string();
    let message = match form.validate() {
        Err(errors) => format!("An error occurred. Product {name} failed to update: {errors}."),
        Ok(input) => {
            match in_transaction(&state.orm, |txn| {
                Box::pin(product_service::update_product(txn, id, input))
            })
            .await
            {
                Ok(_) => format!("Product {name} was updated successfully."),
                Err(err) => {
                    tracing::warn!(product_id = id, error = %err, "product update failed");
                    format!("An error occurred. Product {name} failed to update.")
                }
            }
        }
    };

    redirect_with_flash(&format!("/products/{id}"), &message)
}

#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Deleted product", body = MessageResponse),
        (status = 401, description = "Missing or rejected token", body = ErrorBody),
        (status = 404, description = "Product not found", body = ErrorBody),
        (status = 422, description = "Delete failed", body = ErrorBody),
    ),
    security(("bearer_auth" = ["delete:product"])),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    auth: Authorized<DeleteProduct>,
    IdPath(id): IdPath,
) -> AppResult<Json<MessageResponse>> {
    in_transaction(&state.orm, |txn| {
        Box::pin(product_service::delete_product(txn, id))
    })
    .await
    .map_err(|err| match err {
        StoreError::NotFound => AppError::NotFound,
        other => {
            tracing::warn!(product_id = id, error = %other, "product delete failed");
            AppError::Unprocessable(other.to_string())
        }
    })?;

    tracing::info!(product_id = id, subject = auth.subject(), "product deleted");
    Ok(Json(MessageResponse::success(format!(
        "Deleted Product ID: {id}"
    ))))
}
