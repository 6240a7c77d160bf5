mod common;

use std::sync::Arc;

use axum::{
    body::to_bytes,
    http::{HeaderMap, HeaderValue, StatusCode, header::AUTHORIZATION},
    response::IntoResponse,
};
use chrono::Utc;
use common::{
    AUDIENCE, ISSUER, KID, StaticKeySet, auth_config, claims, jwks_json, sign, token_with,
    verifier,
};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use myfridge::{
    error::{AppError, AuthError},
    middleware::auth::extract_credential,
    services::auth_service::{
        Claims, HttpKeySet, TokenVerifier, authorize, require_permission,
    },
};
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

fn headers_with(value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    headers
}

fn claims_with(permissions: Option<Vec<&str>>) -> Claims {
    Claims {
        sub: "auth0|tester".into(),
        iss: None,
        aud: None,
        exp: Utc::now().timestamp() + 60,
        iat: None,
        permissions: permissions.map(|p| p.into_iter().map(String::from).collect()),
    }
}

#[test]
fn missing_header_is_rejected() {
    let err = extract_credential(&HeaderMap::new()).unwrap_err();

    assert_eq!(err, AuthError::MissingHeader);
    assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(err.code(), "authorization_header_missing");
}

#[test]
fn header_must_have_exactly_two_parts() {
    assert_eq!(
        extract_credential(&headers_with("Bearer")).unwrap_err(),
        AuthError::MalformedHeader
    );
    assert_eq!(
        extract_credential(&headers_with("Bearer abc def")).unwrap_err(),
        AuthError::MalformedHeader
    );
}

#[test]
fn scheme_other_than_bearer_is_rejected() {
    let err = extract_credential(&headers_with("Basic dXNlcjpwYXNz")).unwrap_err();

    assert_eq!(err, AuthError::WrongScheme);
    assert_eq!(err.code(), "invalid_header");
}

#[test]
fn bearer_scheme_is_case_insensitive() {
    assert_eq!(extract_credential(&headers_with("bearer abc")).unwrap(), "abc");
    assert_eq!(extract_credential(&headers_with("BEARER xyz")).unwrap(), "xyz");
}

#[test]
fn repeated_authorization_header_is_malformed() {
    let mut headers = headers_with("Bearer one");
    headers.append(AUTHORIZATION, HeaderValue::from_static("Bearer two"));

    assert_eq!(
        extract_credential(&headers).unwrap_err(),
        AuthError::MalformedHeader
    );
}

#[test]
fn granted_permission_passes() {
    let claims = claims_with(Some(vec!["read:product", "delete:product"]));
    assert!(authorize("delete:product", &claims).is_ok());
}

#[test]
fn missing_permissions_claim_is_a_bad_request() {
    let err = authorize("delete:product", &claims_with(None)).unwrap_err();

    assert_eq!(err, AuthError::MissingPermissionsClaim);
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert_eq!(err.code(), "invalid_claims");
}

#[test]
fn permission_match_is_exact() {
    let claims = claims_with(Some(vec!["delete:products", "Delete:product"]));
    let err = authorize("delete:product", &claims).unwrap_err();

    assert_eq!(err, AuthError::PermissionDenied);
    assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(err.code(), "unauthorized");
}

#[tokio::test]
async fn valid_token_yields_claims() {
    let token = token_with(&["delete:product"]);

    let claims = verifier().verify(&token).await.unwrap();

    assert_eq!(claims.sub, "auth0|tester");
    assert_eq!(claims.iss.as_deref(), Some(ISSUER));
    assert_eq!(claims.permissions, Some(vec!["delete:product".to_string()]));
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let mut expired = claims(&["delete:product"]);
    expired["exp"] = json!(Utc::now().timestamp() - 3600);
    let token = sign(&expired, Some(KID));

    let err = verifier().verify(&token).await.unwrap_err();

    assert_eq!(err, AuthError::ExpiredToken);
    assert_eq!(err.code(), "token_expired");
    assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_audience_is_a_claim_mismatch() {
    let mut other = claims(&[]);
    other["aud"] = json!("some-other-api");

    let err = verifier()
        .verify(&sign(&other, Some(KID)))
        .await
        .unwrap_err();

    assert_eq!(err, AuthError::ClaimMismatch);
    assert_eq!(err.code(), "invalid_claims");
}

#[tokio::test]
async fn wrong_issuer_is_a_claim_mismatch() {
    let mut other = claims(&[]);
    other["iss"] = json!("https://attacker.example.com/");

    let err = verifier()
        .verify(&sign(&other, Some(KID)))
        .await
        .unwrap_err();

    assert_eq!(err, AuthError::ClaimMismatch);
}

#[tokio::test]
async fn audience_list_containing_ours_is_accepted() {
    let mut multi = claims(&[]);
    multi["aud"] = json!(["another-api", AUDIENCE]);

    assert!(verifier().verify(&sign(&multi, Some(KID))).await.is_ok());
}

#[tokio::test]
async fn unknown_kid_is_key_not_found() {
    let token = sign(&claims(&[]), Some("rotated-away"));

    let err = verifier().verify(&token).await.unwrap_err();

    assert_eq!(err, AuthError::KeyNotFound);
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert_eq!(err.code(), "key_not_found");
}

#[tokio::test]
async fn token_without_kid_has_invalid_header() {
    let token = sign(&claims(&[]), None);

    let err = verifier().verify(&token).await.unwrap_err();

    assert_eq!(err, AuthError::InvalidHeader);
    assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_token_has_invalid_header() {
    let err = verifier().verify("not-a-jwt").await.unwrap_err();
    assert_eq!(err, AuthError::InvalidHeader);
}

#[tokio::test]
async fn tampered_signature_is_rejected() {
    let genuine = token_with(&["read:product"]);
    let elevated = token_with(&["delete:product", "delete:user"]);
    let mut parts: Vec<&str> = elevated.split('.').collect();
    parts[2] = genuine.rsplit('.').next().unwrap();
    let forged = parts.join(".");

    let err = verifier().verify(&forged).await.unwrap_err();

    assert_eq!(err, AuthError::InvalidSignature);
    assert_eq!(err.code(), "invalid_signature");
}

#[tokio::test]
async fn disallowed_algorithm_is_rejected() {
    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some(KID.to_string());
    let token = encode(
        &header,
        &claims(&["delete:product"]),
        &EncodingKey::from_secret(b"shared-secret"),
    )
    .unwrap();

    let err = verifier().verify(&token).await.unwrap_err();

    assert_eq!(err, AuthError::InvalidSignature);
}

#[tokio::test]
async fn key_source_failure_is_reported() {
    let failing = StaticKeySet(Err(AuthError::KeyLookupFailure));
    let verifier = TokenVerifier::new(&auth_config(), Arc::new(failing));

    let err = verifier
        .verify(&token_with(&["delete:product"]))
        .await
        .unwrap_err();

    assert_eq!(err, AuthError::KeyLookupFailure);
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn require_permission_runs_the_whole_chain() {
    let verifier = verifier();

    let headers = headers_with(&format!("Bearer {}", token_with(&["delete:user"])));
    let claims = require_permission(&headers, &verifier, "delete:user")
        .await
        .unwrap();
    assert_eq!(claims.sub, "auth0|tester");

    let err = require_permission(&headers, &verifier, "delete:product")
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::PermissionDenied);

    let err = require_permission(&HeaderMap::new(), &verifier, "delete:user")
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::MissingHeader);
}

#[tokio::test]
async fn key_set_is_fetched_from_the_issuer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/.well-known/jwks.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(jwks_json()))
        .expect(2)
        .mount(&server)
        .await;

    let keys = HttpKeySet::new(
        reqwest::Client::new(),
        format!("{}/.well-known/jwks.json", server.uri()),
    );
    let verifier = TokenVerifier::new(&auth_config(), Arc::new(keys));
    let token = token_with(&["delete:product"]);

    assert!(verifier.verify(&token).await.is_ok());
    assert!(verifier.verify(&token).await.is_ok());
}

#[tokio::test]
async fn issuer_error_status_is_a_key_lookup_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/.well-known/jwks.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let keys = HttpKeySet::new(
        reqwest::Client::new(),
        format!("{}/.well-known/jwks.json", server.uri()),
    );
    let verifier = TokenVerifier::new(&auth_config(), Arc::new(keys));

    let err = verifier
        .verify(&token_with(&["delete:product"]))
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::KeyLookupFailure);

    let response = AppError::from(err).into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["message"], "Unable to fetch signing keys.");
    assert_eq!(body["code"], "key_lookup_failed");
    assert!(!body.to_string().contains(&server.uri()));
}
