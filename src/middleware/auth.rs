use std::marker::PhantomData;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};

use crate::{
    error::{AppError, AuthError},
    services::auth_service::{Claims, require_permission},
    state::AppState,
};

/// A named capability that a token must list in its `permissions` claim.
pub trait Permission: Send + Sync + 'static {
    const NAME: &'static str;
}

pub struct DeleteProduct;

impl Permission for DeleteProduct {
    const NAME: &'static str = "delete:product";
}

pub struct DeleteUser;

impl Permission for DeleteUser {
    const NAME: &'static str = "delete:user";
}

/// Pulls the token out of `Authorization: Bearer <token>`.
pub fn extract_credential(headers: &HeaderMap) -> Result<&str, AuthError> {
    let mut values = headers.get_all(header::AUTHORIZATION).iter();
    let value = values.next().ok_or(AuthError::MissingHeader)?;
    if values.next().is_some() {
        return Err(AuthError::MalformedHeader);
    }

    let value = value.to_str().map_err(|_| AuthError::MalformedHeader)?;
    let parts: Vec<&str> = value.split_whitespace().collect();
    let [scheme, token] = parts.as_slice() else {
        return Err(AuthError::MalformedHeader);
    };
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::WrongScheme);
    }

    Ok(*token)
}

/// Extractor that only succeeds for a verified token holding permission `P`.
pub struct Authorized<P> {
    pub claims: Claims,
    permission: PhantomData<P>,
}

impl<P: Permission> Authorized<P> {
    pub fn subject(&self) -> &str {
        &self.claims.sub
    }
}

impl<P: Permission> FromRequestParts<AppState> for Authorized<P> {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = require_permission(&parts.headers, &state.verifier, P::NAME).await?;
        Ok(Self {
            claims,
            permission: PhantomData,
        })
    }
}
