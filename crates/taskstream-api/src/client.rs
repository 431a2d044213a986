use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::warn;

use taskstream_core::config::ApiConfig;
use taskstream_core::Credential;
use taskstream_protocol::extract_error_message;

use crate::error::ApiError;

/// Thin JSON client for the collaborator endpoints. Every request carries
/// the configured credential header.
pub struct ApiClient {
    client: reqwest::Client,
    api: ApiConfig,
    credential: Option<Credential>,
}

impl ApiClient {
    pub fn new(api: ApiConfig, credential: Option<Credential>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(api.connect_timeout_secs))
            .build()?;
        Ok(Self::with_client(client, api, credential))
    }

    pub fn with_client(
        client: reqwest::Client,
        api: ApiConfig,
        credential: Option<Credential>,
    ) -> Self {
        Self {
            client,
            api,
            credential,
        }
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, self.api.url(path))
            .header("accept", "application/json");
        match &self.credential {
            Some(credential) => {
                let (name, value) = credential.header();
                builder.header(name, value)
            }
            None => builder,
        }
    }

    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let resp = check(builder.send().await?).await?;
        resp.json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub(crate) async fn send_unit(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        check(builder.send().await?).await?;
        Ok(())
    }

    pub(crate) async fn send_bytes(&self, builder: RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let resp = check(builder.send().await?).await?;
        Ok(resp.bytes().await?.to_vec())
    }
}

/// Pass 2xx responses through; turn anything else into `ApiError::Api`
/// carrying the body's `detail`/`message`.
async fn check(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    warn!(status = status.as_u16(), body = %text, "API request failed");
    let message = extract_error_message(&text).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });
    Err(ApiError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Percent-encode one path segment (file names may hold spaces or slashes).
pub(crate) fn segment(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}
