//! HTTP client for the persistence RPC endpoint.
//!
//! The assistant reaches the persistence service through [`TodoService`], a
//! method-name request/response seam. [`TodoClient`] speaks it over HTTP;
//! [`Database`] implements it in-process for local mode and tests.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;

use crate::api::handle_rpc;
use crate::db::Database;
use crate::models::*;

/// Default URL for a locally running persistence service.
pub const DEFAULT_URL: &str = "http://localhost:8000";

/// Persistence transport errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    Server(String),
}

/// A remote procedure call target for todo operations.
#[async_trait]
pub trait TodoService: Send + Sync {
    /// Invoke `method` with `params` and return the raw response envelope.
    ///
    /// A business failure is `Ok` with `error` set; `Err` means the call
    /// itself did not complete.
    async fn call(&self, method: &str, params: Value) -> Result<McpResponse, ClientError>;
}

/// HTTP client for the persistence service.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
    client: Client,
}

impl TodoClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn handle_response(&self, response: reqwest::Response) -> Result<McpResponse, ClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            match status {
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                    Err(ClientError::BadRequest(body))
                }
                _ => Err(ClientError::Server(format!("{}: {}", status, body))),
            }
        }
    }
}

#[async_trait]
impl TodoService for TodoClient {
    async fn call(&self, method: &str, params: Value) -> Result<McpResponse, ClientError> {
        let url = format!("{}/mcp", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&McpRequest {
                method: method.to_string(),
                params,
            })
            .send()
            .await?;
        self.handle_response(response).await
    }
}

#[async_trait]
impl TodoService for Database {
    async fn call(&self, method: &str, params: Value) -> Result<McpResponse, ClientError> {
        let db = self.clone();
        let method = method.to_string();
        tokio::task::spawn_blocking(move || handle_rpc(&db, &method, params))
            .await
            .map_err(|e| ClientError::Server(e.to_string()))
    }
}
