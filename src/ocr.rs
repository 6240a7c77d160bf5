//! Text detection backed by the Google Cloud Vision `images:annotate` endpoint.

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    config::VisionConfig,
    dto::receipts::{TextFragment, Vertex},
};

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR service is not configured")]
    NotConfigured,

    #[error("OCR request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("OCR service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("OCR service error: {0}")]
    Service(String),
}

/// Anything that can turn image bytes into recognized text regions.
#[async_trait]
pub trait TextDetector: Send + Sync {
    async fn detect_text(&self, image: &[u8]) -> Result<Vec<TextFragment>, OcrError>;
}

pub struct VisionClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl VisionClient {
    pub fn new(http: reqwest::Client, config: &VisionConfig) -> Self {
        Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        }
    }
}

#[derive(Serialize)]
struct AnnotateRequest<'a> {
    requests: [ImageRequest<'a>; 1],
}

#[derive(Serialize)]
struct ImageRequest<'a> {
    image: ImageContent,
    features: [Feature<'a>; 1],
}

#[derive(Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Serialize)]
struct Feature<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
}

#[derive(Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageResponse {
    #[serde(default)]
    text_annotations: Vec<EntityAnnotation>,
    error: Option<ApiStatus>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntityAnnotation {
    #[serde(default)]
    description: String,
    bounding_poly: Option<BoundingPoly>,
}

#[derive(Deserialize)]
struct BoundingPoly {
    #[serde(default)]
    vertices: Vec<Vertex>,
}

#[derive(Deserialize)]
struct ApiStatus {
    #[serde(default)]
    message: String,
}

#[async_trait]
impl TextDetector for VisionClient {
    async fn detect_text(&self, image: &[u8]) -> Result<Vec<TextFragment>, OcrError> {
        let api_key = self.api_key.as_deref().ok_or(OcrError::NotConfigured)?;
        let body = AnnotateRequest {
            requests: [ImageRequest {
                image: ImageContent {
                    content: STANDARD.encode(image),
                },
                features: [Feature {
                    kind: "TEXT_DETECTION",
                }],
            }],
        };

        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: AnnotateResponse = response.json().await?;
        let Some(result) = parsed.responses.into_iter().next() else {
            return Ok(Vec::new());
        };
        if let Some(error) = result.error.filter(|e| !e.message.is_empty()) {
            return Err(OcrError::Service(error.message));
        }

        Ok(result
            .text_annotations
            .into_iter()
            .map(|annotation| TextFragment {
                text: annotation.description,
                bounding_poly: annotation
                    .bounding_poly
                    .map(|poly| poly.vertices)
                    .unwrap_or_default(),
            })
            .collect())
    }
}
