use anyhow::anyhow;
use bytes::Bytes;

use crate::domain::repository::ObjectStore;
use crate::error::ApiError;

/// Managed object-storage client. Objects are written under
/// `{base}/object/{bucket}/{key}` and publicly served from
/// `{base}/public/{bucket}/{key}`.
#[derive(Clone)]
pub struct HttpObjectStore {
    pub http: reqwest::Client,
    pub base_url: String,
    pub api_key: String,
    pub bucket: String,
}

impl HttpObjectStore {
    fn object_url(&self, key: &str) -> String {
        format!("{}/object/{}/{key}", self.base_url, self.bucket)
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/public/{}/{key}", self.base_url, self.bucket)
    }
}

impl ObjectStore for HttpObjectStore {
    async fn upload(
        &self,
        key: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<String, ApiError> {
        let response = self
            .http
            .put(self.object_url(key))
            .bearer_auth(&self.api_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| ApiError::Service(anyhow!("storage upload request: {e}")))?;

        if !response.status().is_success() {
            return Err(ApiError::Service(anyhow!(
                "storage upload returned {}",
                response.status()
            )));
        }
        Ok(self.public_url(key))
    }

    async fn delete(&self, key: &str) -> Result<(), ApiError> {
        let response = self
            .http
            .delete(self.object_url(key))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| ApiError::Service(anyhow!("storage delete request: {e}")))?;

        // A missing object is fine — delete is called as cleanup.
        if !response.status().is_success() && response.status() != reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::Service(anyhow!(
                "storage delete returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}
