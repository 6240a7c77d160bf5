#![allow(dead_code)]

use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode, jwk::JwkSet};
use myfridge::{
    config::AuthConfig,
    db::{create_orm_conn, run_migrations},
    dto::receipts::TextFragment,
    error::AuthError,
    ocr::{OcrError, TextDetector},
    services::auth_service::{KeySetSource, TokenVerifier},
    state::AppState,
    views::load_templates,
};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};

pub const KID: &str = "test-key-1";
pub const ISSUER: &str = "https://tenant.example.com/";
pub const AUDIENCE: &str = "myfridge-api";

const SIGNING_KEY: &[u8] = include_bytes!("../fixtures/signing_key.pem");
const JWKS: &str = include_str!("../fixtures/jwks.json");

pub fn test_jwks() -> JwkSet {
    serde_json::from_str(JWKS).expect("fixture jwks")
}

pub fn jwks_json() -> Value {
    serde_json::from_str(JWKS).expect("fixture jwks")
}

/// Key source that hands back a fixed result instead of calling the issuer.
pub struct StaticKeySet(pub Result<JwkSet, AuthError>);

#[async_trait]
impl KeySetSource for StaticKeySet {
    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        self.0.clone()
    }
}

pub fn auth_config() -> AuthConfig {
    AuthConfig::new("http://127.0.0.1:9/jwks.json", ISSUER, AUDIENCE, "RS256")
}

pub fn verifier() -> TokenVerifier {
    TokenVerifier::new(&auth_config(), Arc::new(StaticKeySet(Ok(test_jwks()))))
}

pub fn claims(permissions: &[&str]) -> Value {
    let now = Utc::now().timestamp();
    json!({
        "sub": "auth0|tester",
        "iss": ISSUER,
        "aud": AUDIENCE,
        "iat": now,
        "exp": now + 3600,
        "permissions": permissions,
    })
}

pub fn sign(claims: &Value, kid: Option<&str>) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(str::to_string);
    let key = EncodingKey::from_rsa_pem(SIGNING_KEY).expect("fixture signing key");
    encode(&header, claims, &key).expect("sign token")
}

pub fn token_with(permissions: &[&str]) -> String {
    sign(&claims(permissions), Some(KID))
}

/// OCR stand-in returning the same fragments for every image.
pub struct FakeDetector(pub Vec<TextFragment>);

impl FakeDetector {
    pub fn from_texts(texts: &[&str]) -> Self {
        Self(texts.iter().map(|t| TextFragment::new(*t)).collect())
    }
}

#[async_trait]
impl TextDetector for FakeDetector {
    async fn detect_text(&self, _image: &[u8]) -> Result<Vec<TextFragment>, OcrError> {
        Ok(self.0.clone())
    }
}

/// OCR stand-in whose upstream always answers with an error status.
pub struct FailingDetector;

#[async_trait]
impl TextDetector for FailingDetector {
    async fn detect_text(&self, _image: &[u8]) -> Result<Vec<TextFragment>, OcrError> {
        Err(OcrError::Status {
            status: 503,
            body: "backend unavailable".into(),
        })
    }
}

pub async fn test_db() -> DatabaseConnection {
    let db = create_orm_conn("sqlite::memory:")
        .await
        .expect("sqlite connection");
    run_migrations(&db).await.expect("migrations");
    db
}

pub fn scratch_dir() -> PathBuf {
    static NEXT: AtomicUsize = AtomicUsize::new(0);
    std::env::temp_dir().join(format!(
        "myfridge-test-{}-{}",
        std::process::id(),
        NEXT.fetch_add(1, Ordering::Relaxed)
    ))
}

pub async fn test_state(detector: impl TextDetector + 'static) -> AppState {
    let templates = load_templates(&PathBuf::from(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/templates"
    )))
    .expect("templates");

    AppState {
        orm: test_db().await,
        templates: Arc::new(templates),
        verifier: Arc::new(verifier()),
        ocr: Arc::new(detector),
        upload_dir: scratch_dir(),
    }
}
