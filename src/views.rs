//! HTML rendering with tera, plus the one-shot flash message cookie that
//! survives a redirect.

use std::{collections::HashMap, convert::Infallible, path::Path};

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::DateTime;
use cookie::time::Duration;
use tera::{Context, Tera, Value};

use crate::error::AppResult;

const FLASH_COOKIE: &str = "flash";
const FLASH_MAX_AGE_SECS: i64 = 60;

pub fn load_templates(dir: &Path) -> anyhow::Result<Tera> {
    let pattern = format!("{}/**/*.html", dir.display());
    let mut tera = Tera::new(&pattern)?;
    tera.register_filter("datetime", format_datetime);
    tracing::debug!(
        templates = tera.get_template_names().count(),
        dir = %dir.display(),
        "templates loaded"
    );
    Ok(tera)
}

/// `{{ user.date_registered | datetime(format="full") }}`; defaults to `medium`.
fn format_datetime(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let raw = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("datetime filter expects a string"))?;
    let parsed = DateTime::parse_from_rfc3339(raw)
        .map_err(|e| tera::Error::msg(format!("datetime filter: {e}")))?;
    let pattern = match args.get("format").and_then(Value::as_str) {
        Some("full") => "%A %B, %-d, %Y at %-I:%M%p",
        _ => "%a %m, %d, %Y %-I:%M%p",
    };
    Ok(Value::String(parsed.format(pattern).to_string()))
}

/// Message left by the previous request, read from the `flash` cookie.
#[derive(Debug, Default, Clone)]
pub struct IncomingFlash {
    pub message: Option<String>,
    jar: CookieJar,
}

impl<S: Send + Sync> FromRequestParts<S> for IncomingFlash {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let message = jar
            .get(FLASH_COOKIE)
            .and_then(|cookie| URL_SAFE_NO_PAD.decode(cookie.value()).ok())
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .filter(|message| !message.is_empty());
        Ok(Self { message, jar })
    }
}

/// Renders `template`, showing and then clearing any incoming flash message.
pub fn render_page(
    templates: &Tera,
    template: &str,
    mut context: Context,
    flash: &IncomingFlash,
) -> AppResult<Response> {
    let mut jar = flash.jar.clone();
    if let Some(message) = &flash.message {
        context.insert("flash", message);
        jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/"));
    }
    let html = templates.render(template, &context)?;
    Ok((jar, Html(html)).into_response())
}

/// 302 to `location`, carrying `message` to the next page in a cookie.
pub fn redirect_with_flash(location: &str, message: &str) -> Response {
    let cookie = Cookie::build((FLASH_COOKIE, URL_SAFE_NO_PAD.encode(message)))
        .path("/")
        .max_age(Duration::seconds(FLASH_MAX_AGE_SECS))
        .http_only(true)
        .same_site(SameSite::Lax);
    let jar = CookieJar::new().add(cookie);
    (
        StatusCode::FOUND,
        jar,
        [(header::LOCATION, location.to_string())],
    )
        .into_response()
}
