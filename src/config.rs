use std::{env, path::PathBuf, time::Duration};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub template_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub auth: AuthConfig,
    pub vision: VisionConfig,
    pub http_timeout: Duration,
}

/// Settings for verifying bearer tokens issued by the identity tenant.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwks_url: String,
    pub issuer: String,
    pub audience: String,
    pub algorithms: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct VisionConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);
        let template_dir = env::var("TEMPLATE_DIR").unwrap_or_else(|_| "templates".to_string());
        let upload_dir =
            env::var("UPLOAD_DIR").unwrap_or_else(|_| "static/img/receipts".to_string());
        let http_timeout = env::var("HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(10);

        Ok(Self {
            database_url,
            host,
            port,
            template_dir: template_dir.into(),
            upload_dir: upload_dir.into(),
            auth: AuthConfig::from_env(),
            vision: VisionConfig::from_env(),
            http_timeout: Duration::from_secs(http_timeout),
        })
    }
}

impl AuthConfig {
    pub fn from_env() -> Self {
        let domain = env::var("AUTH0_DOMAIN").unwrap_or_default();
        let audience = env::var("API_AUDIENCE").unwrap_or_default();
        let algorithms = env::var("ALGORITHMS").unwrap_or_else(|_| "RS256".to_string());
        let jwks_url = env::var("JWKS_URL")
            .unwrap_or_else(|_| format!("https://{domain}/.well-known/jwks.json"));
        let issuer = env::var("AUTH_ISSUER").unwrap_or_else(|_| format!("https://{domain}/"));
        Self::new(jwks_url, issuer, audience, &algorithms)
    }

    /// `algorithms` is a comma separated list such as `RS256,ES256`.
    pub fn new(
        jwks_url: impl Into<String>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        algorithms: &str,
    ) -> Self {
        Self {
            jwks_url: jwks_url.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            algorithms: algorithms
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

impl VisionConfig {
    pub fn from_env() -> Self {
        Self {
            endpoint: env::var("VISION_ENDPOINT").unwrap_or_else(|_| {
                "https://vision.googleapis.com/v1/images:annotate".to_string()
            }),
            api_key: env::var("VISION_API_KEY").ok().filter(|k| !k.is_empty()),
        }
    }
}
