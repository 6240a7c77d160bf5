use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::{
    dto::receipts::{ReceiptFields, TextFragment, Vertex},
    error::{AppError, AppResult},
    ocr::TextDetector,
};

/// Tokens that announce the prescription number in the fragment right after them.
pub const RX_LABELS: [&str; 7] = ["Rx", "Rx#", "#", "Rx:", "Rx:#", "Rx: #", ":"];

const QTY_PREFIX: &str = "Qty";

/// Outcome of scanning one uploaded receipt image.
#[derive(Debug, Clone, Serialize)]
pub struct ReceiptScan {
    pub image_name: String,
    pub fields: ReceiptFields,
}

/// Walks the OCR fragments in reading order and fills the receipt record.
///
/// A fragment equal to one of the `Rx` labels is never stored itself; it only
/// marks the next non-`Qty` fragment as the prescription number. A label at the
/// very end leaves the number unset. Bounding polygons are ignored.
pub fn extract_fields(fragments: &[TextFragment]) -> ReceiptFields {
    let mut fields = ReceiptFields::default();
    let mut rx_follows = false;

    for fragment in fragments {
        let text = fragment.text.as_str();
        tracing::trace!(text, bounds = %format_bounds(&fragment.bounding_poly), "ocr fragment");

        if RX_LABELS.contains(&text) {
            rx_follows = true;
            continue;
        }

        if text.starts_with(QTY_PREFIX) {
            fields.quantity = quantity_from(text);
        } else if rx_follows {
            fields.rx_number = Some(text.to_string());
            rx_follows = false;
        }
    }

    fields
}

/// `"Qty 30)"` -> `"30"`: drops the prefix and the trailing character, then
/// trims. Too-short input yields an empty string.
fn quantity_from(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let start = QTY_PREFIX.len();
    let end = chars.len().saturating_sub(1);
    if end <= start {
        return String::new();
    }
    chars[start..end]
        .iter()
        .collect::<String>()
        .trim()
        .to_string()
}

fn format_bounds(vertices: &[Vertex]) -> String {
    vertices
        .iter()
        .map(|v| format!("({},{})", v.x, v.y))
        .collect::<Vec<_>>()
        .join(",")
}

/// Stores the upload, runs text detection on it and extracts the receipt fields.
pub async fn scan_receipt(
    detector: &dyn TextDetector,
    upload_dir: &Path,
    file_name: &str,
    image: &[u8],
) -> AppResult<ReceiptScan> {
    if image.is_empty() {
        return Err(AppError::BadRequest("empty image upload".into()));
    }
    let image_name = sanitize_file_name(file_name)
        .ok_or_else(|| AppError::BadRequest("invalid image file name".into()))?;

    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| AppError::Internal(e.into()))?;
    let location: PathBuf = upload_dir.join(&image_name);
    tokio::fs::write(&location, image)
        .await
        .map_err(|e| AppError::Internal(e.into()))?;
    tracing::info!(path = %location.display(), bytes = image.len(), "receipt stored");

    let fragments = detector.detect_text(image).await?;
    let fields = extract_fields(&fragments);
    tracing::debug!(fragments = fragments.len(), ?fields, "receipt scanned");

    Ok(ReceiptScan { image_name, fields })
}

/// Keeps only the final path component so uploads cannot escape the upload dir.
fn sanitize_file_name(file_name: &str) -> Option<String> {
    let name = Path::new(file_name.trim()).file_name()?.to_str()?;
    if name.is_empty() || name.starts_with('.') {
        return None;
    }
    Some(name.to_string())
}
