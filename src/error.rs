use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use crate::{ocr::OcrError, response::ErrorBody};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("resource not found")]
    NotFound,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("unprocessable: {0}")]
    Unprocessable(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("OCR service error: {0}")]
    Ocr(#[from] OcrError),

    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Auth(err) => err.status(),
            AppError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Ocr(_) => StatusCode::BAD_GATEWAY,
            AppError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::Auth(err) => {
                tracing::debug!(code = err.code(), "authorization rejected");
                ErrorBody::new(status.as_u16(), err.to_string()).with_code(err.code())
            }
            _ => {
                if status.is_server_error() {
                    tracing::error!(error = %self, "request failed");
                }
                ErrorBody::new(status.as_u16(), status_message(status))
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Fixed public message for a status code, so internals never leak to clients.
pub fn status_message(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "bad request",
        StatusCode::UNAUTHORIZED => "unauthorized",
        StatusCode::FORBIDDEN => "forbidden",
        StatusCode::NOT_FOUND => "resource not found",
        StatusCode::METHOD_NOT_ALLOWED => "method not allowed",
        StatusCode::UNPROCESSABLE_ENTITY => "unprocessable",
        StatusCode::BAD_GATEWAY => "bad gateway",
        _ => "internal server error",
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Failures of the bearer-token gate. Each variant maps to its own status code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("No Authorization header found.")]
    MissingHeader,

    #[error("Authorization header must ONLY be bearer token.")]
    MalformedHeader,

    #[error("Authorization header must start with \"Bearer\".")]
    WrongScheme,

    #[error("Authorization malformed.")]
    InvalidHeader,

    #[error("Token expired.")]
    ExpiredToken,

    #[error("Incorrect claims. Please check the audience and issuer.")]
    ClaimMismatch,

    #[error("Invalid authentication token signature.")]
    InvalidSignature,

    #[error("Unable to parse authentication token.")]
    UnparsableToken,

    #[error("Unable to find the appropriate key.")]
    KeyNotFound,

    #[error("Unable to fetch signing keys.")]
    KeyLookupFailure,

    #[error("Permissions not included in JWT.")]
    MissingPermissionsClaim,

    #[error("Permission not found in JWT.")]
    PermissionDenied,
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::UnparsableToken
            | AuthError::KeyNotFound
            | AuthError::KeyLookupFailure
            | AuthError::MissingPermissionsClaim => StatusCode::BAD_REQUEST,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingHeader => "authorization_header_missing",
            AuthError::MalformedHeader | AuthError::WrongScheme | AuthError::InvalidHeader => {
                "invalid_header"
            }
            AuthError::ExpiredToken => "token_expired",
            AuthError::ClaimMismatch | AuthError::MissingPermissionsClaim => "invalid_claims",
            AuthError::InvalidSignature | AuthError::UnparsableToken => "invalid_signature",
            AuthError::KeyNotFound => "key_not_found",
            AuthError::KeyLookupFailure => "key_lookup_failed",
            AuthError::PermissionDenied => "unauthorized",
        }
    }
}

/// Persistence failures, classified so callers can tell a missing row from a
/// constraint violation or a lost connection.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("database unavailable: {0}")]
    Connectivity(String),

    #[error("database error: {0}")]
    Database(DbErr),
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg))
            | Some(SqlErr::ForeignKeyConstraintViolation(msg)) => {
                return StoreError::Constraint(msg);
            }
            _ => {}
        }
        match err {
            DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => StoreError::NotFound,
            DbErr::Conn(e) => StoreError::Connectivity(e.to_string()),
            DbErr::ConnectionAcquire(e) => StoreError::Connectivity(e.to_string()),
            other => StoreError::Database(other),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
