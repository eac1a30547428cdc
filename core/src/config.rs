//! Connection configuration and the fluent builder that produces a client.

use std::fmt;
use std::sync::Arc;

use url::Url;

use crate::client::YourlsClient;
use crate::http::Transport;

/// Everything a client needs to reach one YOURLS installation.
///
/// Immutable once built. Missing pieces are not rejected here; they surface
/// as `YourlsError::MissingBaseUrl` or `YourlsError::MissingTransport` when a
/// request is sent.
#[derive(Clone, Default)]
pub struct ConnectionConfig {
    pub(crate) transport: Option<Arc<dyn Transport>>,
    pub(crate) base_url: Option<Url>,
    pub(crate) token: String,
    pub(crate) username: String,
    pub(crate) password: String,
}

impl ConnectionConfig {
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn has_transport(&self) -> bool {
        self.transport.is_some()
    }
}

// Credentials are masked so configs can be logged.
impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("transport", &self.transport.as_ref().map(|_| "<transport>"))
            .field("base_url", &self.base_url.as_ref().map(Url::as_str))
            .field("token", &mask(&self.token))
            .field("username", &self.username)
            .field("password", &mask(&self.password))
            .finish()
    }
}

fn mask(secret: &str) -> &'static str {
    if secret.is_empty() {
        ""
    } else {
        "***"
    }
}

/// Accumulates connection settings; `build` hands them to a new client.
///
/// Setters may be called in any order and any number of times; the last
/// value wins.
#[derive(Default, Clone)]
pub struct ClientBuilder {
    config: ConnectionConfig,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transport(self, transport: impl Transport + 'static) -> Self {
        self.shared_transport(Arc::new(transport))
    }

    /// Use a transport that is also shared with other clients.
    pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.config.transport = Some(transport);
        self
    }

    pub fn base_url(mut self, base_url: Url) -> Self {
        self.config.base_url = Some(base_url);
        self
    }

    /// Signature token, sent as the `signature` parameter.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = token.into();
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.config.username = username.into();
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.password = password.into();
        self
    }

    pub fn build(self) -> YourlsClient {
        YourlsClient::from_config(self.config)
    }
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("config", &self.config)
            .finish()
    }
}
