use std::{path::PathBuf, sync::Arc};

use sea_orm::DatabaseConnection;
use tera::Tera;

use crate::{ocr::TextDetector, services::auth_service::TokenVerifier};

#[derive(Clone)]
pub struct AppState {
    pub orm: DatabaseConnection,
    pub templates: Arc<Tera>,
    pub verifier: Arc<TokenVerifier>,
    pub ocr: Arc<dyn TextDetector>,
    pub upload_dir: PathBuf,
}
