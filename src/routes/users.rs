use axum::{
    Form, Json, Router,
    extract::State,
    response::Response,
    routing::{get, post},
};
use tera::Context;

use crate::{
    db::in_transaction,
    dto::users::{LinkProductForm, UserForm},
    error::{AppError, AppResult, StoreError},
    middleware::auth::{Authorized, DeleteUser},
    models::{Product, User},
    response::{ErrorBody, MessageResponse},
    routes::params::IdPath,
    services::{
        product_service::{self, format_product},
        user_service::{self, format_user},
    },
    state::AppState,
    views::{IncomingFlash, redirect_with_flash, render_page},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/create", get(create_user_form))
        .route("/{id}", axum::routing::delete(delete_user))
        .route("/{id}/edit", get(edit_user_form).post(edit_user_submission))
        .route("/{id}/products", post(link_product))
}

#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "Users page", body = String, content_type = "text/html")
    ),
    tag = "Users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    flash: IncomingFlash,
) -> AppResult<Response> {
    let users: Vec<User> = user_service::list_users(&state.orm)
        .await?
        .into_iter()
        .map(format_user)
        .collect();

    let mut context = Context::new();
    context.insert("users", &users);
    render_page(&state.templates, "pages/users.html", context, &flash)
}

pub async fn create_user_form(
    State(state): State<AppState>,
    flash: IncomingFlash,
) -> AppResult<Response> {
    render_page(&state.templates, "forms/new_user.html", Context::new(), &flash)
}

pub async fn create_user(
    State(state): State<AppState>,
    Form(form): Form<UserForm>,
) -> AppResult<Response> {
    let full_name = form.full_name();
    let message = match form.validate() {
        Err(errors) => {
            format!("An error occurred. User {full_name} could not be listed: {errors}.")
        }
        Ok(input) => {
            match in_transaction(&state.orm, |txn| {
                Box::pin(user_service::insert_user(txn, input))
            })
            .await
            {
                Ok(user) => {
                    tracing::info!(user_id = user.id, "user created");
                    format!("User {full_name} was successfully listed!")
                }
                Err(err) => {
                    tracing::warn!(error = %err, "user create failed");
                    format!("An error occurred. User {full_name} could not be listed.")
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
    path = "/users/{id}/edit",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Prefilled edit form", body = String, content_type = "text/html"),
        (status = 404, description = "User not found", body = ErrorBody),
    ),
    tag = "Users"
)]
pub async fn edit_user_form(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    flash: IncomingFlash,
) -> AppResult<Response> {
    let user = user_service::find_user(&state.orm, id).await?;
    let linked: Vec<Product> = user_service::products_of_user(&state.orm, &user)
        .await?
        .into_iter()
        .map(format_product)
        .collect();
    let available: Vec<Product> = product_service::list_products(&state.orm)
        .await?
        .into_iter()
        .filter(|p| !linked.iter().any(|l| l.id == p.id))
        .map(format_product)
        .collect();

    let mut context = Context::new();
    context.insert("user", &format_user(user));
    context.insert("products", &linked);
    context.insert("available_products", &available);
    render_page(&state.templates, "forms/edit_user.html", context, &flash)
}

pub async fn edit_user_submission(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    Form(form): Form<UserForm>,
) -> Response {
    let full_name = form.full_name();
    let message = match form.validate() {
        Err(errors) => format!("An error occurred. User {full_name} failed to update: {errors}."),
        Ok(input) => {
            match in_transaction(&state.orm, |txn| {
                Box::pin(user_service::update_user(txn, id, input))
            })
            .await
            {
                Ok(_) => format!("User {full_name} was updated successfully."),
                Err(err) => {
                    tracing::warn!(user_id = id, error = %err, "user update failed");
                    format!("An error occurred. User {full_name} failed to update.")
                }
            }
        }
    };

    redirect_with_flash(&format!("/users/{id}/edit"), &message)
}

pub async fn link_product(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    Form(form): Form<LinkProductForm>,
) -> AppResult<Response> {
    let message = match form.product_id.trim().parse::<i32>() {
        Err(_) => "An error occurred. Select a product to add.".to_string(),
        Ok(product_id) => {
            match in_transaction(&state.orm, |txn| {
                Box::pin(user_service::link_product(txn, id, product_id))
            })
            .await
            {
                Ok(()) => format!("Product {product_id} added."),
                Err(StoreError::NotFound) => return Err(AppError::NotFound),
                Err(err) => {
                    tracing::warn!(user_id = id, product_id, error = %err, "product link failed");
                    format!("An error occurred. Product {product_id} could not be added.")
                }
            }
        }
    };

    Ok(redirect_with_flash(&format!("/users/{id}/edit"), &message))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Deleted user", body = MessageResponse),
        (status = 401, description = "Missing or rejected token", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
        (status = 422, description = "Delete failed", body = ErrorBody),
    ),
    security(("bearer_auth" = ["delete:user"])),
    tag = "Users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    auth: Authorized<DeleteUser>,
    IdPath(id): IdPath,
) -> AppResult<Json<MessageResponse>> {
    in_transaction(&state.orm, |txn| Box::pin(user_service::delete_user(txn, id)))
        .await
        .map_err(|err| match err {
            StoreError::NotFound => AppError::NotFound,
            other => {
                tracing::warn!(user_id = id, error = %other, "user delete failed");
                AppError::Unprocessable(other.to_string())
            }
        })?;

    tracing::info!(user_id = id, subject = auth.subject(), "user deleted");
    Ok(Json(MessageResponse::success(format!("Deleted User ID: {id}"))))
}
