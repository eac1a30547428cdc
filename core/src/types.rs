//! Request types for the YOURLS API.
//!
//! # Design
//! Each action gets its own struct carrying only the fields a caller chooses.
//! The action name, output format and credentials are not part of these
//! types: `YourlsClient` adds them when it sends the request, wrapping the
//! borrowed request in `SignedRequest` rather than mutating it.
//! `ActionRequest` closes the set and keeps a `Custom` escape hatch for
//! actions (plugins, `version`, ...) that have no typed model.

use std::fmt;
use std::str::FromStr;

use crate::params::{FormField, FormFields};

pub const ACTION_SHORTURL: &str = "shorturl";
pub const ACTION_EXPAND: &str = "expand";
pub const ACTION_URL_STATS: &str = "url-stats";
pub const ACTION_DB_STATS: &str = "db-stats";
pub const ACTION_STATS: &str = "stats";

/// Response format requested from the server. JSON is the only one the
/// client can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
        }
    }
}

/// Link selection for the `stats` action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Top,
    Bottom,
    Rand,
    Last,
}

impl Filter {
    pub fn as_str(self) -> &'static str {
        match self {
            Filter::Top => "top",
            Filter::Bottom => "bottom",
            Filter::Rand => "rand",
            Filter::Last => "last",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known `Filter`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown stats filter `{0}` (expected top, bottom, rand or last)")]
pub struct ParseFilterError(String);

impl FromStr for Filter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "top" => Ok(Filter::Top),
            "bottom" => Ok(Filter::Bottom),
            "rand" | "random" => Ok(Filter::Rand),
            "last" => Ok(Filter::Last),
            _ => Err(ParseFilterError(s.to_string())),
        }
    }
}

/// Create a short URL for `url`, optionally with a chosen keyword and title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShortUrlRequest {
    pub url: String,
    pub keyword: Option<String>,
    pub title: Option<String>,
}

impl ShortUrlRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl FormFields for ShortUrlRequest {
    fn form_fields(&self) -> Vec<FormField<'_>> {
        vec![
            FormField::new("url", &self.url),
            FormField::new("keyword", self.keyword.as_deref()),
            FormField::new("title", self.title.as_deref()),
        ]
    }
}

/// Resolve a short URL (or bare keyword) to its long URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandRequest {
    pub short_url: String,
}

impl ExpandRequest {
    pub fn new(short_url: impl Into<String>) -> Self {
        Self {
            short_url: short_url.into(),
        }
    }
}

impl FormFields for ExpandRequest {
    fn form_fields(&self) -> Vec<FormField<'_>> {
        vec![FormField::new("shorturl", &self.short_url)]
    }
}

/// Fetch click statistics for a single short URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlStatsRequest {
    pub short_url: String,
}

impl UrlStatsRequest {
    pub fn new(short_url: impl Into<String>) -> Self {
        Self {
            short_url: short_url.into(),
        }
    }
}

impl FormFields for UrlStatsRequest {
    fn form_fields(&self) -> Vec<FormField<'_>> {
        vec![FormField::new("shorturl", &self.short_url)]
    }
}

/// Fetch link and click totals for the whole installation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DbStatsRequest;

impl FormFields for DbStatsRequest {
    fn form_fields(&self) -> Vec<FormField<'_>> {
        Vec::new()
    }
}

/// Fetch aggregate statistics, plus up to `limit` links picked by `filter`.
///
/// A `limit` of zero asks for the totals only; the reply is then decoded as
/// `StatsSimpleResponse` instead of `StatsFullResponse`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsRequest {
    pub filter: Option<Filter>,
    pub limit: u32,
}

impl StatsRequest {
    pub fn new(filter: Option<Filter>, limit: u32) -> Self {
        Self { filter, limit }
    }
}

impl FormFields for StatsRequest {
    fn form_fields(&self) -> Vec<FormField<'_>> {
        vec![
            FormField::new("filter", self.filter.map(Filter::as_str)),
            FormField::new("limit", self.limit),
        ]
    }
}

/// An action without a typed model, sent exactly as given.
///
/// Nothing is added on submission: no format, no credentials. Callers that
/// need them add the parameters themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomRequest {
    pub action: String,
    params: Vec<(String, String)>,
}

impl CustomRequest {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            params: Vec::new(),
        }
    }

    /// Add or replace a parameter. Setting `action` renames the action.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        if key == "action" {
            self.action = value;
        } else if let Some(slot) = self.params.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.params.push((key, value));
        }
        self
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

impl FormFields for CustomRequest {
    fn form_fields(&self) -> Vec<FormField<'_>> {
        std::iter::once(FormField::new("action", &self.action))
            .chain(self.params.iter().map(|(k, v)| FormField::new(k, v)))
            .collect()
    }
}

/// Every request the client can send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionRequest {
    ShortUrl(ShortUrlRequest),
    Expand(ExpandRequest),
    UrlStats(UrlStatsRequest),
    DbStats(DbStatsRequest),
    Stats(StatsRequest),
    Custom(CustomRequest),
}

impl ActionRequest {
    /// Name of the remote action this request invokes.
    pub fn action(&self) -> &str {
        match self {
            ActionRequest::ShortUrl(_) => ACTION_SHORTURL,
            ActionRequest::Expand(_) => ACTION_EXPAND,
            ActionRequest::UrlStats(_) => ACTION_URL_STATS,
            ActionRequest::DbStats(_) => ACTION_DB_STATS,
            ActionRequest::Stats(_) => ACTION_STATS,
            ActionRequest::Custom(r) => r.action.as_str(),
        }
    }

    /// The action-specific fields, without any shared ones.
    pub fn payload(&self) -> &dyn FormFields {
        match self {
            ActionRequest::ShortUrl(r) => r,
            ActionRequest::Expand(r) => r,
            ActionRequest::UrlStats(r) => r,
            ActionRequest::DbStats(r) => r,
            ActionRequest::Stats(r) => r,
            ActionRequest::Custom(r) => r,
        }
    }
}

macro_rules! action_request_from {
    ($($variant:ident($t:ty)),*) => {$(
        impl From<$t> for ActionRequest {
            fn from(value: $t) -> Self {
                ActionRequest::$variant(value)
            }
        }
    )*};
}

action_request_from!(
    ShortUrl(ShortUrlRequest),
    Expand(ExpandRequest),
    UrlStats(UrlStatsRequest),
    DbStats(DbStatsRequest),
    Stats(StatsRequest),
    Custom(CustomRequest)
);

/// A modeled request together with the shared fields stamped in by the
/// client.
#[derive(Clone, Copy)]
pub(crate) struct SignedRequest<'a> {
    pub action: &'a str,
    pub format: OutputFormat,
    pub signature: &'a str,
    pub username: &'a str,
    pub password: &'a str,
    pub payload: &'a dyn FormFields,
}

impl FormFields for SignedRequest<'_> {
    fn form_fields(&self) -> Vec<FormField<'_>> {
        let mut fields = self.payload.form_fields();
        fields.extend([
            FormField::new("action", self.action),
            FormField::new("format", self.format.as_str()),
            FormField::new("signature", self.signature),
            FormField::new("username", self.username),
            FormField::new("password", self.password),
        ]);
        fields
    }
}
