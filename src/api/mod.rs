//! Thin authenticated REST client for the journaling backend.
//!
//! Every call takes the bearer token explicitly; callers fetch it from the
//! [`CredentialProvider`] first so that a missing credential can be handled
//! before any request is made. All failures collapse into one [`ApiError`]
//! carrying the most useful human-readable message available.

pub mod credentials;
pub mod types;

use std::sync::Arc;

use log::debug;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

pub use credentials::{CredentialProvider, EnvCredentials, SessionCredentials, StaticCredentials};
pub use types::{CreatedRecord, ListQuery, Profile, ProfileUser};

use crate::entities::todo;
use crate::kinds::{SyncKind, Todos};

const FALLBACK_MESSAGE: &str = "request failed";

/// A failed API call. `status` is absent for transport failures.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    pub status: Option<u16>,
    pub message: String,
}

impl ApiError {
    /// Error for a non-2xx response. The message comes from the body's `error`
    /// field, then its `message` field, then the status line.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let payload = serde_json::from_slice::<Value>(body).ok();
        let field = |name: &str| {
            payload
                .as_ref()
                .and_then(|p| p.get(name))
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };

        let message = field("error")
            .or_else(|| field("message"))
            .unwrap_or_else(|| format!("Request failed with status code {status}"));

        Self {
            status: Some(status),
            message,
        }
    }

    /// Error for a request that never produced a usable response.
    pub fn transport(err: reqwest::Error) -> Self {
        let message = err.to_string();
        Self {
            status: err.status().map(|s| s.as_u16()),
            message: if message.is_empty() {
                FALLBACK_MESSAGE.to_string()
            } else {
                message
            },
        }
    }

    fn decode(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            status: None,
            message: if message.is_empty() {
                FALLBACK_MESSAGE.to_string()
            } else {
                format!("invalid response: {message}")
            },
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status, Some(401 | 403))
    }
}

/// REST client bound to one backend.
pub struct ApiClient {
    client: Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Current ID token from the identity provider, if anyone is signed in.
    pub async fn credential(&self) -> Option<String> {
        self.credentials.id_token().await
    }

    fn request(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(token)
    }

    /// Send a request and decode its JSON body. An empty body decodes as `null`.
    async fn send(&self, request: RequestBuilder) -> Result<Value, ApiError> {
        let response = request.send().await.map_err(ApiError::transport)?;
        let status = response.status();
        let body = response.bytes().await.map_err(ApiError::transport)?;

        if !status.is_success() {
            let err = ApiError::from_response(status.as_u16(), &body);
            debug!("API call failed with {}: {}", status.as_u16(), err.message);
            return Err(err);
        }

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&body).map_err(|e| ApiError::decode(e.to_string()))
    }

    async fn send_as<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let value = self.send(request).await?;
        serde_json::from_value(value).map_err(|e| ApiError::decode(e.to_string()))
    }

    /// `GET {endpoint}?{filter}&page&limit`
    pub async fn list<K: SyncKind>(&self, token: &str, query: &ListQuery) -> Result<Vec<K::Remote>, ApiError> {
        let mut params: Vec<(&str, String)> = Vec::with_capacity(3);
        if let Some(filter) = &query.filter {
            params.push((K::LIST_FILTER, filter.clone()));
        }
        params.push(("page", query.page.to_string()));
        params.push(("limit", query.limit.to_string()));

        let body = self
            .send(self.request(Method::GET, K::ENDPOINT, token).query(&params))
            .await?;
        types::parse_page(body, K::COLLECTION_KEY).map_err(ApiError::decode)
    }

    /// `POST {endpoint}` with the row's push body.
    pub async fn create<K: SyncKind>(&self, token: &str, row: &K::Model) -> Result<CreatedRecord, ApiError> {
        let request = self
            .request(Method::POST, K::ENDPOINT, token)
            .json(&K::push_body(row));
        self.send_as(request).await
    }

    /// `DELETE {endpoint}/:id`
    pub async fn delete<K: SyncKind>(&self, token: &str, server_id: &str) -> Result<(), ApiError> {
        let path = format!("{}/{}", K::ENDPOINT, server_id);
        self.send(self.request(Method::DELETE, &path, token)).await?;
        Ok(())
    }

    /// `PUT` a new version of a record to its endpoint.
    pub async fn update<K: SyncKind>(&self, token: &str, server_id: &str, body: &Value) -> Result<(), ApiError> {
        let path = format!("{}/{}", K::ENDPOINT, server_id);
        self.send(self.request(Method::PUT, &path, token).json(body)).await?;
        Ok(())
    }

    /// `PUT /api/todos/:id` with the full todo including its completion state.
    pub async fn update_todo(&self, token: &str, server_id: &str, row: &todo::Model) -> Result<(), ApiError> {
        self.update::<Todos>(token, server_id, &Todos::update_body(row)).await
    }

    /// `GET /api/auth/profile`
    pub async fn profile(&self, token: &str) -> Result<Profile, ApiError> {
        self.send_as(self.request(Method::GET, "/api/auth/profile", token))
            .await
    }
}
