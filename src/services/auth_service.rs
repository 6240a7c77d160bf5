use std::{str::FromStr, sync::Arc};

use async_trait::async_trait;
use axum::http::HeaderMap;
use jsonwebtoken::{
    Algorithm, DecodingKey, Validation, decode, decode_header,
    errors::{Error as JwtError, ErrorKind},
    jwk::JwkSet,
};
use serde::{Deserialize, Serialize};

use crate::{config::AuthConfig, error::AuthError, middleware::auth::extract_credential};

/// Decoded payload of a verified access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Audience>,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

/// Source of the issuer's published signing keys.
#[async_trait]
pub trait KeySetSource: Send + Sync {
    async fn fetch(&self) -> Result<JwkSet, AuthError>;
}

/// Fetches the JWKS document over HTTP on every call.
pub struct HttpKeySet {
    http: reqwest::Client,
    url: String,
}

impl HttpKeySet {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }
}

#[async_trait]
impl KeySetSource for HttpKeySet {
    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        let response = self.http.get(&self.url).send().await.map_err(|e| {
            tracing::warn!(url = %self.url, error = %e, "key set request failed");
            AuthError::KeyLookupFailure
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %self.url, %status, "key set request rejected");
            return Err(AuthError::KeyLookupFailure);
        }

        response.json::<JwkSet>().await.map_err(|e| {
            tracing::warn!(url = %self.url, error = %e, "key set is not a valid JWKS");
            AuthError::KeyLookupFailure
        })
    }
}

pub struct TokenVerifier {
    keys: Arc<dyn KeySetSource>,
    algorithms: Vec<Algorithm>,
    audience: Option<String>,
    issuer: Option<String>,
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig, keys: Arc<dyn KeySetSource>) -> Self {
        let algorithms = config
            .algorithms
            .iter()
            .filter_map(|name| match Algorithm::from_str(name) {
                Ok(alg) => Some(alg),
                Err(_) => {
                    tracing::warn!(algorithm = %name, "ignoring unknown token algorithm");
                    None
                }
            })
            .collect();

        Self {
            keys,
            algorithms,
            audience: Some(config.audience.clone()).filter(|a| !a.is_empty()),
            issuer: Some(config.issuer.clone()).filter(|i| !i.is_empty()),
        }
    }

    /// Checks the token against the current key set and returns its claims.
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let jwks = self.keys.fetch().await?;

        let header = decode_header(token).map_err(|_| AuthError::InvalidHeader)?;
        let kid = header.kid.ok_or(AuthError::InvalidHeader)?;
        let jwk = jwks.find(&kid).ok_or(AuthError::KeyNotFound)?;
        let key = DecodingKey::from_jwk(jwk).map_err(|_| AuthError::UnparsableToken)?;

        decode::<Claims>(token, &key, &self.validation())
            .map(|data| data.claims)
            .map_err(classify)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::default();
        validation.algorithms = self.algorithms.clone();
        match &self.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }
        validation
    }
}

fn classify(err: JwtError) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        ErrorKind::InvalidAudience
        | ErrorKind::InvalidIssuer
        | ErrorKind::ImmatureSignature
        | ErrorKind::MissingRequiredClaim(_) => AuthError::ClaimMismatch,
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm | ErrorKind::MissingAlgorithm => {
            AuthError::InvalidSignature
        }
        _ => AuthError::UnparsableToken,
    }
}

/// The claims must carry a `permissions` list containing `permission` verbatim.
pub fn authorize(permission: &str, claims: &Claims) -> Result<(), AuthError> {
    let permissions = claims
        .permissions
        .as_ref()
        .ok_or(AuthError::MissingPermissionsClaim)?;

    if permissions.iter().any(|p| p == permission) {
        Ok(())
    } else {
        Err(AuthError::PermissionDenied)
    }
}

/// Full gate: extract the bearer token, verify it, then check `permission`.
pub async fn require_permission(
    headers: &HeaderMap,
    verifier: &TokenVerifier,
    permission: &str,
) -> Result<Claims, AuthError> {
    let token = extract_credential(headers)?;
    let claims = verifier.verify(token).await?;
    authorize(permission, &claims)?;
    Ok(claims)
}
