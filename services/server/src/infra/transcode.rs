use anyhow::anyhow;
use bytes::Bytes;

use crate::domain::repository::ImageTranscoder;
use crate::error::ApiError;

/// Target dimensions and quality for recipe images.
const TARGET_WIDTH: u32 = 1280;
const TARGET_HEIGHT: u32 = 960;
const JPEG_QUALITY: u32 = 80;

/// Image resize/re-encode service client. The `http` client is constructed
/// with a fixed request timeout; hitting it is fatal to the upload.
#[derive(Clone)]
pub struct HttpTranscoder {
    pub http: reqwest::Client,
    pub api_url: String,
}

impl ImageTranscoder for HttpTranscoder {
    async fn transcode(&self, bytes: Bytes) -> Result<Bytes, ApiError> {
        let response = self
            .http
            .post(&self.api_url)
            .query(&[
                ("width", TARGET_WIDTH),
                ("height", TARGET_HEIGHT),
                ("quality", JPEG_QUALITY),
            ])
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await
            .map_err(|e| ApiError::Service(anyhow!("transcode request: {e}")))?;

        if !response.status().is_success() {
            return Err(ApiError::Service(anyhow!(
                "transcode returned {}",
                response.status()
            )));
        }
        response
            .bytes()
            .await
            .map_err(|e| ApiError::Service(anyhow!("transcode response body: {e}")))
    }
}
