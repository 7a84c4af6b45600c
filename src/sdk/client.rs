use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::SdkError;

const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Authenticated client bound to one service endpoint.
///
/// URL helpers only ever join path segments onto [`ServiceClient::resource_base_url`],
/// so a client never carries per-request path state.
#[derive(Clone)]
pub struct ServiceClient {
    client: reqwest::Client,
    endpoint: String,
    resource_base: Option<String>,
}

impl ServiceClient {
    pub fn new(token: &str, endpoint: impl Into<String>) -> Result<Self, SdkError> {
        let mut headers = HeaderMap::new();
        let header_value = HeaderValue::from_str(token).map_err(|_| SdkError::Auth {
            message: "Invalid token format".to_string(),
        })?;
        headers.insert(HeaderName::from_static(AUTH_TOKEN_HEADER), header_value);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(SdkError::Network)?;

        Ok(Self {
            client,
            endpoint: normalize_base(endpoint.into()),
            resource_base: None,
        })
    }

    /// NOTE: Some services expose resources below a versioned or project-scoped path.
    pub fn with_resource_base(mut self, resource_base: impl Into<String>) -> Self {
        self.resource_base = Some(normalize_base(resource_base.into()));
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn resource_base_url(&self) -> &str {
        self.resource_base.as_deref().unwrap_or(&self.endpoint)
    }

    pub fn service_url(&self, parts: &[&str]) -> String {
        format!("{}{}", self.resource_base_url(), parts.join("/"))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, SdkError> {
        tracing::debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        decode(url, response).await
    }

    pub async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T, SdkError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!(%url, "POST");
        let response = self.client.post(url).json(body).send().await?;
        decode(url, response).await
    }

    pub async fn put_json<B, T>(&self, url: &str, body: &B) -> Result<T, SdkError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!(%url, "PUT");
        let response = self.client.put(url).json(body).send().await?;
        decode(url, response).await
    }

    pub async fn delete(&self, url: &str) -> Result<(), SdkError> {
        tracing::debug!(%url, "DELETE");
        let response = self.client.delete(url).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(error_for_status(url, status.as_u16(), &body))
    }
}

impl std::fmt::Debug for ServiceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceClient")
            .field("endpoint", &self.endpoint)
            .field("resource_base", &self.resource_base)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

fn normalize_base(mut base: String) -> String {
    if !base.ends_with('/') {
        base.push('/');
    }
    base
}

async fn decode<T: DeserializeOwned>(url: &str, response: reqwest::Response) -> Result<T, SdkError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(error_for_status(url, status.as_u16(), &body));
    }

    serde_json::from_str(&body).map_err(|e| SdkError::Decode {
        message: format!("Failed to parse response: {}", e),
    })
}

fn error_for_status(url: &str, status: u16, body: &str) -> SdkError {
    if status == 404 {
        return SdkError::NotFound {
            url: url.to_string(),
        };
    }

    SdkError::Api {
        status,
        message: error_message(body),
    }
}

// NOTE: Services disagree on the error envelope; take the first message found.
fn error_message(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<serde_json::Value>(body) else {
        return if body.trim().is_empty() {
            "Unknown error".to_string()
        } else {
            body.trim().to_string()
        };
    };

    json.get("error_msg")
        .or_else(|| json.get("error").and_then(|e| e.get("message")))
        .or_else(|| {
            json.as_object()
                .and_then(|obj| obj.values().find_map(|v| v.get("message")))
        })
        .and_then(|m| m.as_str())
        .unwrap_or("Unknown error")
        .to_string()
}
