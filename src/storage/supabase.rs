//! Supabase Storage backend (upload + signed URLs over the REST API).

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use super::{ObjectStorage, StorageError};

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    service_key: Secret<String>,
    pub bucket: String,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, service_key: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            service_key: Secret::new(service_key.into()),
            bucket: bucket.into(),
        }
    }

    /// Read `SUPABASE_URL`, `SUPABASE_SERVICE_KEY` and `SUPABASE_BUCKET`.
    /// All three must be set, otherwise the object store stays disabled.
    pub fn from_env() -> Option<Self> {
        let non_empty = |name: &str| env::var(name).ok().filter(|v| !v.trim().is_empty());
        match (
            non_empty("SUPABASE_URL"),
            non_empty("SUPABASE_SERVICE_KEY"),
            non_empty("SUPABASE_BUCKET"),
        ) {
            (Some(url), Some(key), Some(bucket)) => Some(Self::new(url, key, bucket)),
            _ => None,
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.url, self.bucket, key)
    }

    fn sign_url(&self, key: &str) -> String {
        format!("{}/storage/v1/object/sign/{}/{}", self.url, self.bucket, key)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignRequest {
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct SignResponse {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

pub struct SupabaseStorage {
    config: SupabaseConfig,
    client: Client,
}

impl SupabaseStorage {
    pub fn new(config: SupabaseConfig, client: Client) -> Self {
        Self { config, client }
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let key = self.config.service_key.expose_secret();
        request.bearer_auth(key).header("apikey", key.as_str())
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, StorageError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StorageError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

/// Signed paths come back relative to `/storage/v1`.
fn absolute_signed_url(base: &str, signed: &str) -> String {
    if signed.starts_with("http://") || signed.starts_with("https://") {
        return signed.to_string();
    }
    format!("{}/storage/v1/{}", base, signed.trim_start_matches('/'))
}

#[async_trait]
impl ObjectStorage for SupabaseStorage {
    async fn upload_file(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<(), StorageError> {
        log::debug!("Uploading {} ({} bytes) to bucket {}", key, data.len(), self.config.bucket);
        let request = self
            .client
            .post(self.config.object_url(key))
            .header("Content-Type", content_type)
            .header("x-upsert", "true")
            .body(data.to_vec());
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| StorageError::Request(e.to_string()))?;
        Self::check(response).await?;
        Ok(())
    }

    async fn signed_url(&self, key: &str, expires_in: Duration) -> Result<String, StorageError> {
        let request = self.client.post(self.config.sign_url(key)).json(&SignRequest {
            expires_in: expires_in.as_secs(),
        });
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| StorageError::Request(e.to_string()))?;
        let signed: SignResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| StorageError::Malformed(e.to_string()))?;
        Ok(absolute_signed_url(&self.config.url, &signed.signed_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let config = SupabaseConfig::new("https://test.supabase.co/", "key", "bucket");
        assert_eq!(
            config.object_url("proposals/a.pdf"),
            "https://test.supabase.co/storage/v1/object/bucket/proposals/a.pdf"
        );
        assert_eq!(
            config.sign_url("proposals/a.pdf"),
            "https://test.supabase.co/storage/v1/object/sign/bucket/proposals/a.pdf"
        );
    }

    #[test]
    fn test_absolute_signed_url() {
        assert_eq!(
            absolute_signed_url(
                "https://test.supabase.co",
                "/object/sign/bucket/a.pdf?token=abc"
            ),
            "https://test.supabase.co/storage/v1/object/sign/bucket/a.pdf?token=abc"
        );
        assert_eq!(
            absolute_signed_url("https://x", "https://cdn.example/a.pdf"),
            "https://cdn.example/a.pdf"
        );
    }

    #[test]
    fn test_sign_request_shape() {
        let value = serde_json::to_value(SignRequest { expires_in: 86400 }).unwrap();
        assert_eq!(value, serde_json::json!({ "expiresIn": 86400 }));
    }

    #[test]
    fn test_sign_response_parsing() {
        let parsed: SignResponse =
            serde_json::from_str(r#"{"signedURL":"/object/sign/b/k?token=t"}"#).unwrap();
        assert_eq!(parsed.signed_url, "/object/sign/b/k?token=t");
    }
}
