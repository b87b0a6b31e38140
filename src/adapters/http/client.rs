//! Thin JSON client for the proposal backend's REST API.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::models::BackendConfig;
use crate::domain::ports::RepositoryError;

/// HTTP client bound to one backend base URL.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl RestClient {
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, RepositoryError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                RepositoryError::Unavailable(format!("failed to build HTTP client: {e}"))
            })?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Build a client from the `backend` config section.
    pub fn from_config(config: &BackendConfig) -> Result<Self, RepositoryError> {
        let base_url = config
            .base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                RepositoryError::Unavailable("backend.base_url is not configured".to_string())
            })?;
        Self::new(base_url, config.token.clone(), Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.http.request(method, url).header("Accept", "application/json");
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, path: &str) -> Result<Response, RepositoryError> {
        builder.send().await.map_err(|e| {
            tracing::warn!(path, error = %e, "backend request failed");
            RepositoryError::Unavailable(format!("{path}: {e}"))
        })
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, RepositoryError> {
        let resp = self.send(self.request(Method::GET, path).query(query), path).await?;
        decode(ensure_success(resp).await?).await
    }

    /// GET that maps 404 to `None`.
    pub async fn get_optional_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>, RepositoryError> {
        let resp = self.send(self.request(Method::GET, path).query(query), path).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        decode(ensure_success(resp).await?).await.map(Some)
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, RepositoryError> {
        let resp = self.send(self.request(Method::POST, path).json(body), path).await?;
        decode(ensure_success(resp).await?).await
    }

    /// POST whose response body is ignored.
    pub async fn post_unit<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), RepositoryError> {
        let resp = self.send(self.request(Method::POST, path).json(body), path).await?;
        ensure_success(resp).await?;
        Ok(())
    }
}

async fn ensure_success(resp: Response) -> Result<Response, RepositoryError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(RepositoryError::Rejected {
        status: status.as_u16(),
        message: error_message(&body).unwrap_or_else(|| status.to_string()),
    })
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, RepositoryError> {
    let bytes = resp
        .bytes()
        .await
        .map_err(|e| RepositoryError::Unavailable(format!("failed to read response body: {e}")))?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Pull a human readable message out of a backend error payload.
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => value
            .get("message")
            .or_else(|| value.get("error"))
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .or_else(|| Some(trimmed.to_string())),
        Err(_) => Some(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"message":"Catatan wajib diisi"}"#).as_deref(),
            Some("Catatan wajib diisi")
        );
        assert_eq!(error_message(r#"{"error":"forbidden"}"#).as_deref(), Some("forbidden"));
        assert_eq!(error_message("Bad Gateway").as_deref(), Some("Bad Gateway"));
        assert_eq!(error_message("  "), None);
    }

    #[test]
    fn test_from_config_requires_base_url() {
        let config = BackendConfig::default();
        assert!(RestClient::from_config(&config).is_err());

        let config = BackendConfig {
            base_url: Some("http://localhost:3001/api/".to_string()),
            ..BackendConfig::default()
        };
        assert_eq!(
            RestClient::from_config(&config).unwrap().base_url(),
            "http://localhost:3001/api"
        );
    }
}
