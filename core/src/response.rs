//! Response shapes returned by the YOURLS API.
//!
//! # Design
//! YOURLS success and error payloads overlap and are loosely typed: the same
//! key may arrive as a number in one reply and a string in another, and error
//! replies reuse keys such as `keyword` with a different meaning. Decoding is
//! therefore forgiving at two levels:
//!
//! - every field is optional and defaults to its zero value;
//! - a field whose JSON type does not fit is left at its zero value, without
//!   failing the rest of the record. `"400"` does not fill an integer field.
//!
//! A repeated key keeps its last value. A body that is not a JSON object at
//! all decodes into the zero value of the whole shape.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::types::ActionRequest;

/// Deserialize a field, falling back to the zero value on a type mismatch.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Like `lenient`, but per entry: a bad entry keeps its key with a zero
/// value and the other entries still decode.
fn lenient_map<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let Value::Object(entries) = Value::deserialize(deserializer)? else {
        return Ok(BTreeMap::new());
    };
    Ok(entries
        .into_iter()
        .map(|(key, value)| (key, serde_json::from_value(value).unwrap_or_default()))
        .collect())
}

/// Decode `body` into `T`, or return `T::default()` when it does not fit.
///
/// The body is parsed into a `Value` first, so a repeated key keeps its last
/// value instead of failing the whole shape.
pub fn decode_or_default<T: DeserializeOwned + Default>(body: &[u8]) -> T {
    match serde_json::from_slice::<Value>(body).and_then(serde_json::from_value) {
        Ok(value) => value,
        Err(err) => {
            trace!(shape = std::any::type_name::<T>(), %err, "response body left undecoded");
            T::default()
        }
    }
}

/// A stored link as reported by `shorturl`, `url-stats` and `stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkInfo {
    #[serde(deserialize_with = "lenient", skip_serializing_if = "String::is_empty")]
    pub keyword: String,
    #[serde(deserialize_with = "lenient", skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(rename = "shorturl", deserialize_with = "lenient", skip_serializing_if = "String::is_empty")]
    pub short_url: String,
    #[serde(deserialize_with = "lenient", skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(deserialize_with = "lenient", skip_serializing_if = "String::is_empty")]
    pub date: String,
    #[serde(deserialize_with = "lenient", skip_serializing_if = "String::is_empty")]
    pub timestamp: String,
    #[serde(deserialize_with = "lenient", skip_serializing_if = "String::is_empty")]
    pub ip: String,
    #[serde(deserialize_with = "lenient", skip_serializing_if = "String::is_empty")]
    pub clicks: String,
}

/// Link and click totals. YOURLS reports both as strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsTotals {
    #[serde(deserialize_with = "lenient")]
    pub total_links: String,
    #[serde(deserialize_with = "lenient")]
    pub total_clicks: String,
}

/// Reply to `shorturl`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShortUrlResponse {
    #[serde(deserialize_with = "lenient")]
    pub url: LinkInfo,
    #[serde(deserialize_with = "lenient")]
    pub status: String,
    #[serde(deserialize_with = "lenient")]
    pub code: String,
    #[serde(deserialize_with = "lenient")]
    pub error_code: String,
    #[serde(deserialize_with = "lenient")]
    pub message: String,
    #[serde(deserialize_with = "lenient")]
    pub title: String,
    #[serde(rename = "shorturl", deserialize_with = "lenient")]
    pub short_url: String,
    #[serde(deserialize_with = "lenient")]
    pub status_code: i64,
}

/// Reply to `expand`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExpandResponse {
    #[serde(deserialize_with = "lenient")]
    pub keyword: String,
    #[serde(rename = "shorturl", deserialize_with = "lenient")]
    pub short_url: String,
    #[serde(rename = "longurl", deserialize_with = "lenient")]
    pub long_url: String,
    #[serde(deserialize_with = "lenient")]
    pub title: String,
    #[serde(deserialize_with = "lenient")]
    pub message: String,
    #[serde(deserialize_with = "lenient")]
    pub status_code: i64,
}

/// Reply to `url-stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UrlStatsResponse {
    #[serde(deserialize_with = "lenient")]
    pub status_code: i64,
    #[serde(deserialize_with = "lenient")]
    pub message: String,
    #[serde(deserialize_with = "lenient")]
    pub link: LinkInfo,
}

/// Reply to `db-stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DbStatsResponse {
    #[serde(rename = "db-stats", deserialize_with = "lenient")]
    pub stats: StatsTotals,
    #[serde(deserialize_with = "lenient")]
    pub message: String,
    #[serde(deserialize_with = "lenient")]
    pub status_code: i64,
}

/// Reply to `stats` without a limit: totals only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StatsSimpleResponse {
    #[serde(deserialize_with = "lenient")]
    pub stats: StatsTotals,
    #[serde(deserialize_with = "lenient")]
    pub message: String,
    #[serde(deserialize_with = "lenient")]
    pub status_code: i64,
}

/// Reply to `stats` with a limit: totals plus the selected links, keyed
/// `link_1`, `link_2`, ...
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StatsFullResponse {
    #[serde(deserialize_with = "lenient_map")]
    pub links: BTreeMap<String, LinkInfo>,
    #[serde(deserialize_with = "lenient")]
    pub stats: StatsTotals,
    #[serde(deserialize_with = "lenient")]
    pub message: String,
    #[serde(deserialize_with = "lenient")]
    pub status_code: i64,
}

/// Reply to an action without a typed model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UnknownResponse {
    #[serde(deserialize_with = "lenient")]
    pub status: String,
    #[serde(deserialize_with = "lenient")]
    pub code: String,
    #[serde(deserialize_with = "lenient")]
    pub error_code: String,
    #[serde(deserialize_with = "lenient")]
    pub message: String,
    #[serde(deserialize_with = "lenient")]
    pub status_code: i64,
}

/// The error fields YOURLS may put in any reply.
///
/// Decoded from every response, successful or not, so `message` is usually
/// populated even when the action worked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ErrorResponse {
    #[serde(deserialize_with = "lenient")]
    pub error_code: i64,
    #[serde(deserialize_with = "lenient")]
    pub message: String,
    #[serde(deserialize_with = "lenient")]
    pub keyword: bool,
}

/// The decoded success shape of one call. Which variant is produced depends
/// only on the request that was sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ActionResponse {
    ShortUrl(ShortUrlResponse),
    Expand(ExpandResponse),
    UrlStats(UrlStatsResponse),
    DbStats(DbStatsResponse),
    StatsSimple(StatsSimpleResponse),
    StatsFull(StatsFullResponse),
    Unknown(UnknownResponse),
}

impl ActionResponse {
    /// Zero value of the shape `request` decodes into.
    ///
    /// `stats` with a zero limit maps to `StatsSimple`, any other limit to
    /// `StatsFull`; custom actions map to `Unknown`.
    pub fn empty_for(request: &ActionRequest) -> Self {
        match request {
            ActionRequest::ShortUrl(_) => ActionResponse::ShortUrl(Default::default()),
            ActionRequest::Expand(_) => ActionResponse::Expand(Default::default()),
            ActionRequest::UrlStats(_) => ActionResponse::UrlStats(Default::default()),
            ActionRequest::DbStats(_) => ActionResponse::DbStats(Default::default()),
            ActionRequest::Stats(r) if r.limit == 0 => {
                ActionResponse::StatsSimple(Default::default())
            }
            ActionRequest::Stats(_) => ActionResponse::StatsFull(Default::default()),
            ActionRequest::Custom(_) => ActionResponse::Unknown(Default::default()),
        }
    }

    /// Decode `body` into the shape selected for `request`.
    pub fn decode_for(request: &ActionRequest, body: &[u8]) -> Self {
        match Self::empty_for(request) {
            ActionResponse::ShortUrl(_) => ActionResponse::ShortUrl(decode_or_default(body)),
            ActionResponse::Expand(_) => ActionResponse::Expand(decode_or_default(body)),
            ActionResponse::UrlStats(_) => ActionResponse::UrlStats(decode_or_default(body)),
            ActionResponse::DbStats(_) => ActionResponse::DbStats(decode_or_default(body)),
            ActionResponse::StatsSimple(_) => ActionResponse::StatsSimple(decode_or_default(body)),
            ActionResponse::StatsFull(_) => ActionResponse::StatsFull(decode_or_default(body)),
            ActionResponse::Unknown(_) => ActionResponse::Unknown(decode_or_default(body)),
        }
    }

    pub fn status_code(&self) -> i64 {
        match self {
            ActionResponse::ShortUrl(r) => r.status_code,
            ActionResponse::Expand(r) => r.status_code,
            ActionResponse::UrlStats(r) => r.status_code,
            ActionResponse::DbStats(r) => r.status_code,
            ActionResponse::StatsSimple(r) => r.status_code,
            ActionResponse::StatsFull(r) => r.status_code,
            ActionResponse::Unknown(r) => r.status_code,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ActionResponse::ShortUrl(r) => &r.message,
            ActionResponse::Expand(r) => &r.message,
            ActionResponse::UrlStats(r) => &r.message,
            ActionResponse::DbStats(r) => &r.message,
            ActionResponse::StatsSimple(r) => &r.message,
            ActionResponse::StatsFull(r) => &r.message,
            ActionResponse::Unknown(r) => &r.message,
        }
    }
}
