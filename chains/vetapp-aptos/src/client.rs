use std::time::Duration;

use reqwest::{header, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

use crate::types::ApiErrorBody;

const BCS_SIGNED_TRANSACTION: &str = "application/x.aptos.signed_transaction+bcs";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid node url {0:?}")]
    InvalidUrl(String),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    /// The node answered with a non-success status.
    #[error("node returned {status}: {message}")]
    Api {
        status: u16,
        message: String,
        error_code: Option<String>,
    },
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Api { status: 404, .. })
    }
}

/// Aptos fullnode REST client
#[derive(Clone)]
pub struct AptosClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl AptosClient {
    /// Create a client for the REST API rooted at `base_url` (including `/v1`).
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        request_timeout: Duration,
    ) -> Result<Self, ClientError> {
        Url::parse(base_url).map_err(|_| ClientError::InvalidUrl(base_url.to_owned()))?;
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = if path.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/{path}", self.base_url)
        };
        let builder = self.http.request(method, url);
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.request(Method::GET, path).send().await?;
        decode(response).await
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self.request(Method::POST, path).json(body).send().await?;
        decode(response).await
    }

    /// POST a BCS-encoded signed transaction.
    pub async fn post_bcs<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Vec<u8>,
    ) -> Result<T, ClientError> {
        let response = self
            .request(Method::POST, path)
            .header(header::CONTENT_TYPE, BCS_SIGNED_TRANSACTION)
            .body(body)
            .send()
            .await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    let text = response.text().await.unwrap_or_default();
    let (message, error_code) = match serde_json::from_str::<ApiErrorBody>(&text) {
        Ok(body) => (body.message, body.error_code),
        Err(_) => (text, None),
    };
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
        error_code,
    })
}

impl std::fmt::Debug for AptosClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AptosClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
