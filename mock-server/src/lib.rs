use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

/// Credentials the API accepts. When all three are empty the API is public.
#[derive(Clone, Debug, Default)]
pub struct Credentials {
    pub signature: String,
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).unwrap_or_default();
        Self {
            signature: var("YOURLS_SIGNATURE"),
            username: var("YOURLS_USERNAME"),
            password: var("YOURLS_PASSWORD"),
        }
    }

    fn is_public(&self) -> bool {
        self.signature.is_empty() && self.username.is_empty() && self.password.is_empty()
    }

    fn accepts(&self, params: &HashMap<String, String>) -> bool {
        let param = |key: &str| params.get(key).map(String::as_str).unwrap_or_default();
        if self.is_public() {
            return true;
        }
        if !self.signature.is_empty() && param("signature") == self.signature {
            return true;
        }
        !self.username.is_empty()
            && param("username") == self.username
            && param("password") == self.password
    }
}

#[derive(Clone, Debug)]
pub struct Link {
    pub keyword: String,
    pub url: String,
    pub title: String,
    pub timestamp: String,
    pub ip: String,
    pub clicks: u64,
    seq: u64,
}

#[derive(Debug, Default)]
pub struct Store {
    links: HashMap<String, Link>,
    next_seq: u64,
}

impl Store {
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn get(&self, keyword: &str) -> Option<&Link> {
        self.links.get(keyword)
    }

    fn total_clicks(&self) -> u64 {
        self.links.values().map(|l| l.clicks).sum()
    }

    fn find_url(&self, url: &str) -> Option<&Link> {
        self.links.values().find(|l| l.url == url)
    }

    fn insert(&mut self, keyword: String, url: String, title: String, ip: String) -> Link {
        self.next_seq += 1;
        let link = Link {
            keyword: keyword.clone(),
            url,
            title,
            timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            ip,
            clicks: 0,
            seq: self.next_seq,
        };
        self.links.insert(keyword, link.clone());
        link
    }

    fn free_keyword(&self) -> String {
        loop {
            let candidate = Uuid::new_v4().simple().to_string()[..6].to_string();
            if !self.links.contains_key(&candidate) {
                return candidate;
            }
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub credentials: Arc<Credentials>,
}

pub type Db = Arc<RwLock<Store>>;

type ApiReply = (StatusCode, Json<Value>);

pub fn app(credentials: Credentials) -> Router {
    router(AppState {
        db: Db::default(),
        credentials: Arc::new(credentials),
    })
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/yourls-api.php", get(api).post(api))
        .route("/{keyword}", get(follow))
        .with_state(state)
}

pub async fn run(listener: TcpListener, credentials: Credentials) -> Result<(), std::io::Error> {
    info!(addr = ?listener.local_addr().ok(), "mock YOURLS listening");
    axum::serve(listener, app(credentials)).await
}

async fn api(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> ApiReply {
    let action = params.get("action").map(String::as_str).unwrap_or_default();
    debug!(action, "api call");

    if !state.credentials.accepts(&params) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "errorCode": 403, "message": "Please log in" })),
        );
    }

    let base = short_base(&headers);
    match action {
        "shorturl" => shorturl(&state.db, &params, &base, client_ip(&headers)).await,
        "expand" => expand(&state.db, &params, &base).await,
        "url-stats" => url_stats(&state.db, &params, &base).await,
        "db-stats" => db_stats(&state.db).await,
        "stats" => stats(&state.db, &params, &base).await,
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "errorCode": 400,
                "message": "Unknown or missing \"action\" parameter",
            })),
        ),
    }
}

/// Redirect to the long URL and count the click.
async fn follow(State(state): State<AppState>, Path(keyword): Path<String>) -> Response {
    let mut db = state.db.write().await;
    match db.links.get_mut(&keyword) {
        Some(link) => {
            link.clicks += 1;
            Redirect::permanent(&link.url).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn shorturl(
    db: &Db,
    params: &HashMap<String, String>,
    base: &str,
    ip: String,
) -> ApiReply {
    let url = param(params, "url");
    if url.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "status": "fail",
                "code": "error:nourl",
                "message": "Missing or malformed URL",
                "errorCode": "400",
                "statusCode": 400,
            })),
        );
    }

    let mut db = db.write().await;
    if let Some(existing) = db.find_url(url) {
        return (
            StatusCode::OK,
            Json(json!({
                "status": "fail",
                "code": "error:url",
                "url": { "keyword": existing.keyword, "url": existing.url, "title": existing.title,
                         "date": existing.timestamp, "ip": existing.ip, "clicks": existing.clicks.to_string() },
                "message": format!("{url} already exists in database"),
                "title": existing.title,
                "shorturl": format!("{base}/{}", existing.keyword),
                "statusCode": 200,
            })),
        );
    }

    let keyword = match param(params, "keyword") {
        "" => db.free_keyword(),
        k if db.get(k).is_some() => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "status": "fail",
                    "code": "error:keyword",
                    "message": format!("Short URL {k} already exists in database or is reserved"),
                    "errorCode": "400",
                    "statusCode": 400,
                })),
            );
        }
        k => k.to_string(),
    };
    let title = match param(params, "title") {
        "" => url.to_string(),
        t => t.to_string(),
    };

    let link = db.insert(keyword, url.to_string(), title, ip);
    (
        StatusCode::OK,
        Json(json!({
            "url": { "keyword": link.keyword, "url": link.url, "title": link.title,
                     "date": link.timestamp, "ip": link.ip },
            "status": "success",
            "message": format!("{} added to database", link.url),
            "title": link.title,
            "shorturl": format!("{base}/{}", link.keyword),
            "statusCode": 200,
        })),
    )
}

async fn expand(db: &Db, params: &HashMap<String, String>, base: &str) -> ApiReply {
    let keyword = keyword_of(param(params, "shorturl"));
    let db = db.read().await;
    match db.get(keyword) {
        Some(link) => (
            StatusCode::OK,
            Json(json!({
                "keyword": link.keyword,
                "shorturl": format!("{base}/{}", link.keyword),
                "longurl": link.url,
                "title": link.title,
                "message": "success",
                "statusCode": 200,
            })),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "keyword": keyword,
                "message": "Error: short URL not found",
                "errorCode": 404,
            })),
        ),
    }
}

async fn url_stats(db: &Db, params: &HashMap<String, String>, base: &str) -> ApiReply {
    let keyword = keyword_of(param(params, "shorturl"));
    let db = db.read().await;
    match db.get(keyword) {
        Some(link) => (
            StatusCode::OK,
            Json(json!({
                "statusCode": 200,
                "message": "success",
                "link": link_json(link, base),
            })),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "statusCode": 404,
                "message": "Error: short URL not found",
            })),
        ),
    }
}

async fn db_stats(db: &Db) -> ApiReply {
    let db = db.read().await;
    (
        StatusCode::OK,
        Json(json!({
            "db-stats": totals(&db),
            "statusCode": 200,
            "message": "success",
        })),
    )
}

async fn stats(db: &Db, params: &HashMap<String, String>, base: &str) -> ApiReply {
    let db = db.read().await;
    let limit: usize = param(params, "limit").parse().unwrap_or(0);
    if limit == 0 {
        return (
            StatusCode::OK,
            Json(json!({ "stats": totals(&db), "statusCode": 200, "message": "success" })),
        );
    }

    let mut selected: Vec<&Link> = db.links.values().collect();
    match param(params, "filter") {
        "bottom" => selected.sort_by_key(|l| (l.clicks, l.seq)),
        "last" => selected.sort_by_key(|l| std::cmp::Reverse(l.seq)),
        "rand" => selected.sort_by(|a, b| a.keyword.cmp(&b.keyword)),
        _ => selected.sort_by_key(|l| (std::cmp::Reverse(l.clicks), l.seq)),
    }
    let links: serde_json::Map<String, Value> = selected
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, link)| (format!("link_{}", i + 1), link_json(link, base)))
        .collect();

    (
        StatusCode::OK,
        Json(json!({
            "links": links,
            "stats": totals(&db),
            "statusCode": 200,
            "message": "success",
        })),
    )
}

fn param<'a>(params: &'a HashMap<String, String>, key: &str) -> &'a str {
    params.get(key).map(String::as_str).unwrap_or_default()
}

/// `http://host/abc` and `abc` both name keyword `abc`.
fn keyword_of(short_url: &str) -> &str {
    short_url.trim_end_matches('/').rsplit('/').next().unwrap_or_default()
}

fn short_base(headers: &HeaderMap) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    format!("http://{host}")
}

fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.split(',').next())
        .map(|ip| ip.trim().to_string())
        .unwrap_or_else(|| "127.0.0.1".to_string())
}

fn link_json(link: &Link, base: &str) -> Value {
    json!({
        "shorturl": format!("{base}/{}", link.keyword),
        "url": link.url,
        "title": link.title,
        "timestamp": link.timestamp,
        "ip": link.ip,
        "clicks": link.clicks.to_string(),
    })
}

fn totals(store: &Store) -> Value {
    json!({
        "total_links": store.len().to_string(),
        "total_clicks": store.total_clicks().to_string(),
    })
}
