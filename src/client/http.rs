//! HTTP access to the service REST API.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;
use tracing::debug;

use crate::config::Credentials;
use crate::crypto::authorization_header;
use crate::error::{AppError, AppResult};

/// JSON request capability the service client is built on.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str) -> AppResult<Value>;
    async fn post(&self, path: &str, body: &Value) -> AppResult<Value>;
}

/// reqwest-backed transport with the static `Authorization` header installed once.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(credentials: &Credentials) -> AppResult<Self> {
        let authorization = authorization_header(credentials.app_id(), credentials.secret());
        let mut value = HeaderValue::from_str(&authorization)
            .map_err(|e| AppError::Config(format!("authorization header: {}", e)))?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);

        let client = reqwest::Client::builder().default_headers(headers).build()?;
        Ok(Self {
            client,
            base_url: credentials.base_url().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read(response: reqwest::Response) -> AppResult<Value> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AppError::Service {
                status: status.as_u16(),
                body,
            });
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> AppResult<Value> {
        debug!(path = %path, "GET");
        let response = self.client.get(self.url(path)).send().await?;
        Self::read(response).await
    }

    async fn post(&self, path: &str, body: &Value) -> AppResult<Value> {
        debug!(path = %path, "POST");
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Self::read(response).await
    }
}
