//! Blocking client for the YOURLS URL shortener API.
//!
//! # Overview
//! Typed requests for the `shorturl`, `expand`, `url-stats`, `db-stats` and
//! `stats` actions are turned into signed `POST`s against
//! `<base>/yourls-api.php`, executed through a pluggable `Transport`, and
//! decoded into typed replies.
//!
//! # Design
//! - `YourlsClient` is stateless; it holds only an immutable
//!   `ConnectionConfig` built with `ClientBuilder`.
//! - `ActionRequest` is a closed enum; the action name, the reply shape and
//!   the shared parameters follow from the variant by a plain `match`.
//! - Request fields are projected onto query parameters through `FormFields`,
//!   dropping empty strings and zero integers.
//! - Every reply is decoded into the selected success shape *and* into
//!   `ErrorResponse`. Decode mismatches are never errors.
//! - `UreqTransport` (feature `ureq`, on by default) is the stock transport;
//!   anything implementing `Transport` can replace it.
//!
//! ```no_run
//! use yourls_core::{ShortUrlRequest, UreqTransport, YourlsClient};
//!
//! let client = YourlsClient::builder()
//!     .transport(UreqTransport::new())
//!     .base_url("https://sho.rt".parse().unwrap())
//!     .token("f6d89851aa")
//!     .build();
//! let reply = client.send_action(&ShortUrlRequest::new("https://example.com").into());
//! println!("{:?}", reply.data);
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod params;
pub mod response;
#[cfg(feature = "ureq")]
pub mod transport;
pub mod types;

pub use client::{ActionReply, YourlsClient, API_ENDPOINT};
pub use config::{ClientBuilder, ConnectionConfig};
pub use error::{TransportError, YourlsError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use params::{FormField, FormFields, FormValue};
pub use response::{
    ActionResponse, DbStatsResponse, ErrorResponse, ExpandResponse, LinkInfo, ShortUrlResponse,
    StatsFullResponse, StatsSimpleResponse, StatsTotals, UnknownResponse, UrlStatsResponse,
};
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{
    ActionRequest, CustomRequest, DbStatsRequest, ExpandRequest, Filter, OutputFormat,
    ParseFilterError, ShortUrlRequest, StatsRequest, UrlStatsRequest,
};

pub use url::Url;
