//! Sources of the bearer token attached to API calls.

use async_trait::async_trait;
use tokio::sync::RwLock;

/// External identity provider handing out short-lived ID tokens.
///
/// `None` means nobody is signed in; sync paths treat that as "cannot sync
/// right now" rather than as an error.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn id_token(&self) -> Option<String>;
}

/// A fixed token, or none.
#[derive(Clone, Debug, Default)]
pub struct StaticCredentials {
    token: Option<String>,
}

impl StaticCredentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// Provider with no signed-in user.
    pub fn anonymous() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn id_token(&self) -> Option<String> {
        self.token.clone()
    }
}

/// Reads the token from an environment variable on every call, so a token
/// refreshed by an outside process is picked up without a restart.
#[derive(Clone, Debug)]
pub struct EnvCredentials {
    var: String,
}

impl EnvCredentials {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    pub fn var(&self) -> &str {
        &self.var
    }
}

#[async_trait]
impl CredentialProvider for EnvCredentials {
    async fn id_token(&self) -> Option<String> {
        std::env::var(&self.var).ok().filter(|t| !t.trim().is_empty())
    }
}

/// Token set at sign-in and cleared at sign-out.
#[derive(Debug, Default)]
pub struct SessionCredentials {
    token: RwLock<Option<String>>,
}

impl SessionCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sign_in(&self, token: impl Into<String>) {
        *self.token.write().await = Some(token.into());
    }

    pub async fn sign_out(&self) {
        *self.token.write().await = None;
    }
}

#[async_trait]
impl CredentialProvider for SessionCredentials {
    async fn id_token(&self) -> Option<String> {
        self.token.read().await.clone()
    }
}
