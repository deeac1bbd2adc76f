//! HTTP client for a layout-parsing serving endpoint.
//!
//! Request: `POST {base}/layout-parsing` with `{"file": <base64 PNG>, "fileType": 1}`.
//! Response envelope:
//!
//! ```json
//! {"errorCode": 0, "errorMsg": "Success",
//!  "result": {"layoutParsingResults": [{"prunedResult": { …page… }}]}}
//! ```
//!
//! The client is built without a request timeout: inference on a dense page
//! can take minutes, and the caller waits until the engine answers.

use super::{PageStructure, StructureEngine};
use crate::error::EngineError;
use crate::pipeline::encode;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// `fileType` value the serving API uses for raster images.
const FILE_TYPE_IMAGE: u8 = 1;

/// Structure engine reached over HTTP.
pub struct HttpStructureEngine {
    base_url: String,
    client: reqwest::blocking::Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LayoutParsingRequest {
    file: String,
    file_type: u8,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutParsingResponse {
    #[serde(default)]
    error_code: i64,
    #[serde(default)]
    error_msg: String,
    result: Option<LayoutParsingResult>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutParsingResult {
    #[serde(default)]
    layout_parsing_results: Vec<LayoutParsingPage>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutParsingPage {
    pruned_result: PageStructure,
}

impl HttpStructureEngine {
    /// Create a client for the engine served at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, EngineError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::blocking::Client::builder()
            .timeout(None)
            .build()
            .map_err(|e| EngineError::Unavailable {
                engine: base_url.clone(),
                detail: e.to_string(),
            })?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn unavailable(&self, detail: impl Into<String>) -> EngineError {
        EngineError::Unavailable {
            engine: self.base_url.clone(),
            detail: detail.into(),
        }
    }
}

impl StructureEngine for HttpStructureEngine {
    fn name(&self) -> &str {
        &self.base_url
    }

    fn check_source(&self) -> Result<(), EngineError> {
        let url = format!("{}/health", self.base_url);
        debug!("Checking engine source at {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| self.unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(self.unavailable(format!(
                "health check returned HTTP {}",
                response.status()
            )));
        }
        info!("Engine at {} is ready", self.base_url);
        Ok(())
    }

    fn predict(&self, image: &RgbImage) -> Result<Vec<PageStructure>, EngineError> {
        let file = encode::png_base64(image)
            .map_err(|e| EngineError::Failed(format!("Image encoding failed: {e}")))?;
        let url = format!("{}/layout-parsing", self.base_url);
        info!(
            "Calling engine {} with {}x{} px image",
            url,
            image.width(),
            image.height()
        );

        let response = self
            .client
            .post(&url)
            .json(&LayoutParsingRequest {
                file,
                file_type: FILE_TYPE_IMAGE,
            })
            .send()
            .map_err(|e| EngineError::Failed(format!("Failed to call engine: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| EngineError::Failed(format!("Failed to read engine response: {e}")))?;
        if !status.is_success() && body.trim().is_empty() {
            return Err(EngineError::Failed(format!("Engine returned HTTP {status}")));
        }

        parse_response(&body)
    }
}

/// Unwrap the response envelope into page structures.
fn parse_response(body: &str) -> Result<Vec<PageStructure>, EngineError> {
    let envelope: LayoutParsingResponse = serde_json::from_str(body)
        .map_err(|e| EngineError::Failed(format!("Failed to parse engine response: {e}")))?;

    if envelope.error_code != 0 {
        return Err(EngineError::Rejected {
            code: envelope.error_code,
            message: envelope.error_msg,
        });
    }

    let pages: Vec<PageStructure> = envelope
        .result
        .map(|r| r.layout_parsing_results)
        .unwrap_or_default()
        .into_iter()
        .map(|p| p.pruned_result)
        .collect();
    debug!("Engine returned {} page result(s)", pages.len());
    Ok(pages)
}
