use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{BackendError, PlantBackend};
use crate::api::{ChatRequest, ChatResponse, HealthResponse, IdentifyResponse};
use crate::core::image::ImageUpload;
use crate::utils::url::construct_api_url;

const MAX_ERROR_BODY_CHARS: usize = 200;

/// Talks to the Lumon server over HTTP.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<HealthResponse, BackendError> {
        let url = construct_api_url(&self.base_url, "health");
        debug!(%url, "probing server health");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        parse_health(status, &body)
    }
}

#[async_trait]
impl PlantBackend for HttpBackend {
    async fn converse(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError> {
        let url = construct_api_url(&self.base_url, "chat");
        debug!(%url, chars = request.message.chars().count(), "sending chat message");
        let response = self.client.post(url).json(request).send().await?;
        decode_body(response).await
    }

    async fn identify(&self, image: &ImageUpload) -> Result<IdentifyResponse, BackendError> {
        let url = construct_api_url(&self.base_url, "predict");
        debug!(
            %url,
            file = image.file_name(),
            media_type = image.media_type(),
            size = image.size(),
            "uploading image for identification"
        );
        let part = Part::bytes(image.data().to_vec())
            .file_name(image.file_name().to_string())
            .mime_str(image.media_type())?;
        let form = Form::new().part("image", part);
        let response = self.client.post(url).multipart(form).send().await?;
        decode_body(response).await
    }
}

/// Parse the body as `T` whatever the status, since the server attaches its
/// `{"error": ...}` payloads to 4xx/5xx responses.
async fn decode_body<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let status = response.status();
    let body = response.text().await?;

    match serde_json::from_str::<T>(&body) {
        Ok(parsed) => Ok(parsed),
        Err(_) if !status.is_success() => Err(BackendError::Status {
            status: status.as_u16(),
            body: summarize_body(&body),
        }),
        Err(err) => Err(BackendError::Decode(err.to_string())),
    }
}

/// Some servers answer `/health` with a bare `OK` instead of JSON; any
/// non-JSON 2xx body counts as healthy.
fn parse_health(status: StatusCode, body: &str) -> Result<HealthResponse, BackendError> {
    match serde_json::from_str::<HealthResponse>(body) {
        Ok(parsed) => Ok(parsed),
        Err(_) if status.is_success() => {
            let text = body.trim();
            let status = if text.is_empty() {
                status.to_string()
            } else {
                summarize_body(text)
            };
            Ok(HealthResponse {
                status,
                timestamp: None,
            })
        }
        Err(_) => Err(BackendError::Status {
            status: status.as_u16(),
            body: summarize_body(body),
        }),
    }
}

fn summarize_body(body: &str) -> String {
    let collapsed = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return "<empty>".to_string();
    }
    if collapsed.chars().count() <= MAX_ERROR_BODY_CHARS {
        return collapsed;
    }
    let truncated: String = collapsed.chars().take(MAX_ERROR_BODY_CHARS).collect();
    format!("{truncated}…")
}
