use anyhow::anyhow;
use serde_json::json;

use crate::domain::repository::Mailer;
use crate::error::ApiError;

/// Transactional mail API client. Posts one JSON message per send; any
/// transport or non-2xx response is a fatal `Service` error (no retry).
#[derive(Clone)]
pub struct HttpMailer {
    pub http: reqwest::Client,
    pub api_url: String,
    pub api_key: String,
    pub from: String,
}

impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), ApiError> {
        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": self.from,
                "to": to,
                "subject": subject,
                "text": body,
            }))
            .send()
            .await
            .map_err(|e| ApiError::Service(anyhow!("mail api request: {e}")))?;

        if !response.status().is_success() {
            return Err(ApiError::Service(anyhow!(
                "mail api returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}
