//! Action dispatch and the HTTP round-trip for the YOURLS API.
//!
//! # Design
//! `YourlsClient` holds only an immutable `ConnectionConfig` and carries no
//! state between calls. Every action goes through the same three steps:
//!
//! 1. `build_action` stamps the action name, `format=json` and the configured
//!    credentials onto the request and encodes everything into the query
//!    string of a bodiless `POST` to `yourls-api.php`.
//! 2. The configured `Transport` executes it.
//! 3. `parse_action` decodes the body twice: once into the success shape the
//!    request selects, once into `ErrorResponse`.
//!
//! `send_action` runs all three. Callers that do their own I/O can call the
//! two halves directly.

use tracing::debug;
use url::Url;

use crate::config::{ClientBuilder, ConnectionConfig};
use crate::error::YourlsError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::params::{encode_query, to_params};
use crate::response::{decode_or_default, ActionResponse, ErrorResponse};
use crate::types::{ActionRequest, OutputFormat, SignedRequest};

/// Path of the API script, relative to the installation's base URL.
pub const API_ENDPOINT: &str = "yourls-api.php";

/// Result of one `send_action` call.
///
/// `data` and `error` are always present. When the call failed before a
/// response was read they hold the zero value of their shape; `outcome`
/// tells the two cases apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionReply {
    pub data: ActionResponse,
    pub error: ErrorResponse,
    pub outcome: Result<HttpResponse, YourlsError>,
}

impl ActionReply {
    /// The raw response, if one was received.
    pub fn response(&self) -> Option<&HttpResponse> {
        self.outcome.as_ref().ok()
    }

    /// The request-build or transport failure, if any.
    pub fn failure(&self) -> Option<&YourlsError> {
        self.outcome.as_ref().err()
    }

    pub fn into_result(self) -> Result<(ActionResponse, ErrorResponse, HttpResponse), YourlsError> {
        let response = self.outcome?;
        Ok((self.data, self.error, response))
    }
}

/// Blocking client for one YOURLS installation.
///
/// Safe to share between threads; concurrent calls only share the read-only
/// configuration and whatever the transport itself shares.
#[derive(Debug, Clone)]
pub struct YourlsClient {
    config: ConnectionConfig,
}

impl YourlsClient {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub(crate) fn from_config(config: ConnectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Absolute URL of the API script.
    pub fn endpoint(&self) -> Result<Url, YourlsError> {
        let base = self.config.base_url.as_ref().ok_or(YourlsError::MissingBaseUrl)?;
        Ok(base.join(API_ENDPOINT)?)
    }

    /// Query parameters sent for `request`, in order.
    ///
    /// Modeled actions get the action name, `format=json` and the configured
    /// credentials appended. `Custom` requests are sent exactly as built.
    pub fn query_params(&self, request: &ActionRequest) -> Vec<(String, String)> {
        match request {
            ActionRequest::Custom(custom) => to_params(custom),
            modeled => to_params(&SignedRequest {
                action: modeled.action(),
                format: OutputFormat::Json,
                signature: &self.config.token,
                username: &self.config.username,
                password: &self.config.password,
                payload: modeled.payload(),
            }),
        }
    }

    /// Build the HTTP request for `request` without sending it.
    pub fn build_action(&self, request: &ActionRequest) -> Result<HttpRequest, YourlsError> {
        let mut url = self.endpoint()?;
        let query = encode_query(&self.query_params(request));
        if !query.is_empty() {
            url.set_query(Some(&query));
        }
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: url.into(),
            headers: Vec::new(),
            body: Vec::new(),
        })
    }

    /// Decode `response` into the success shape selected by `request` and
    /// into the generic error shape.
    ///
    /// Never fails. A body that does not match a shape leaves that shape at
    /// its zero value, and the HTTP status is not consulted: YOURLS answers
    /// errors with both 2xx and 4xx codes and the same loose JSON.
    pub fn parse_action(
        &self,
        request: &ActionRequest,
        response: &HttpResponse,
    ) -> (ActionResponse, ErrorResponse) {
        (
            ActionResponse::decode_for(request, &response.body),
            decode_or_default(&response.body),
        )
    }

    /// Send `request` and decode the reply.
    ///
    /// `outcome` is an error only when the request could not be built, the
    /// transport failed, or the body could not be read. Decode mismatches are
    /// silent by contract; check `data`, `error` and the HTTP status instead.
    pub fn send_action(&self, request: &ActionRequest) -> ActionReply {
        match self.execute(request) {
            Ok(response) => {
                let (data, error) = self.parse_action(request, &response);
                ActionReply {
                    data,
                    error,
                    outcome: Ok(response),
                }
            }
            Err(err) => {
                debug!(action = request.action(), %err, "YOURLS action failed");
                ActionReply {
                    data: ActionResponse::empty_for(request),
                    error: ErrorResponse::default(),
                    outcome: Err(err),
                }
            }
        }
    }

    fn execute(&self, request: &ActionRequest) -> Result<HttpResponse, YourlsError> {
        let transport = self
            .config
            .transport
            .as_ref()
            .ok_or(YourlsError::MissingTransport)?;
        let http_request = self.build_action(request)?;
        let endpoint = http_request
            .url
            .split_once('?')
            .map_or(http_request.url.as_str(), |(path, _)| path);
        debug!(action = request.action(), endpoint, "sending YOURLS action");

        let response = transport.execute(&http_request)?;
        debug!(
            action = request.action(),
            status = response.status,
            bytes = response.body.len(),
            "YOURLS action completed"
        );
        Ok(response)
    }
}
