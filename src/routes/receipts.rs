use axum::{
    extract::{Multipart, State},
    response::Response,
};
use tera::Context;

use crate::{
    error::{AppError, AppResult},
    services::receipt_service::scan_receipt,
    state::AppState,
    views::{IncomingFlash, render_page},
};

/// Multipart field holding the receipt photo.
const IMAGE_FIELD: &str = "image";

pub async fn upload_receipt(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Response> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let image = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        let scan = scan_receipt(state.ocr.as_ref(), &state.upload_dir, &file_name, &image).await?;

        let mut context = Context::new();
        context.insert("prediction", &scan.fields);
        context.insert("image_name", &scan.image_name);
        return render_page(
            &state.templates,
            "pages/home.html",
            context,
            &IncomingFlash::default(),
        );
    }

    Err(AppError::BadRequest("no image uploaded".into()))
}
