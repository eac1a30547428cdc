use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Credentials};
use serde_json::Value;
use tower::ServiceExt;

const SIGNATURE: &str = "f6d89851aa";

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn api_request(query: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(format!("/yourls-api.php?{query}"))
        .header(header::HOST, "kb.in")
        .body(String::new())
        .unwrap()
}

fn signed(query: &str) -> String {
    format!("{query}&format=json&signature={SIGNATURE}")
}

fn credentials() -> Credentials {
    Credentials {
        signature: SIGNATURE.to_string(),
        username: "default".to_string(),
        password: "secret".to_string(),
    }
}

// --- auth ---

#[tokio::test]
async fn missing_credentials_return_403() {
    let resp = app(credentials())
        .oneshot(api_request("action=db-stats"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body = body_json(resp).await;
    assert_eq!(body["errorCode"], 403);
    assert_eq!(body["message"], "Please log in");
}

#[tokio::test]
async fn username_and_password_are_accepted() {
    let resp = app(credentials())
        .oneshot(api_request("action=db-stats&username=default&password=secret"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn public_server_needs_no_credentials() {
    let resp = app(Credentials::default())
        .oneshot(api_request("action=db-stats"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
}

// --- dispatch ---

#[tokio::test]
async fn unknown_action_returns_400() {
    let resp = app(credentials())
        .oneshot(api_request(&signed("action=version")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["errorCode"], 400);
}

#[tokio::test]
async fn get_is_accepted_as_well_as_post() {
    let resp = app(credentials())
        .oneshot(
            Request::builder()
                .uri(format!("/yourls-api.php?{}", signed("action=db-stats")))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
}

// --- shorturl ---

#[tokio::test]
async fn shorturl_without_url_is_rejected() {
    let resp = app(credentials())
        .oneshot(api_request(&signed("action=shorturl")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["code"], "error:nourl");
    assert_eq!(body["errorCode"], "400");
}

#[tokio::test]
async fn shorturl_generates_keyword_when_missing() {
    let resp = app(credentials())
        .oneshot(api_request(&signed("action=shorturl&url=https%3A%2F%2Fexample.com")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let keyword = body["url"]["keyword"].as_str().unwrap();
    assert_eq!(keyword.len(), 6);
    assert_eq!(body["shorturl"], format!("http://kb.in/{keyword}"));
    assert_eq!(body["title"], "https://example.com");
}

// --- expand / url-stats ---

#[tokio::test]
async fn expand_unknown_keyword_returns_404() {
    let resp = app(credentials())
        .oneshot(api_request(&signed("action=expand&shorturl=http%3A%2F%2Fkb.in%2Fzz")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["keyword"], "zz");
    assert_eq!(body["errorCode"], 404);
}

#[tokio::test]
async fn url_stats_unknown_keyword_returns_404() {
    let resp = app(credentials())
        .oneshot(api_request(&signed("action=url-stats&shorturl=zz")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["statusCode"], 404);
}

// --- full lifecycle ---

#[tokio::test]
async fn link_lifecycle() {
    use tower::Service;

    let mut app = app(credentials()).into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(api_request(&signed(
            "action=shorturl&url=https%3A%2F%2Furl.com%2F%3Fa7&keyword=a7&title=Link+URL",
        )))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let created = body_json(resp).await;
    assert_eq!(created["status"], "success");
    assert_eq!(created["shorturl"], "http://kb.in/a7");
    assert_eq!(created["message"], "https://url.com/?a7 added to database");
    assert_eq!(created["url"]["title"], "Link URL");

    // same keyword again
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(api_request(&signed(
            "action=shorturl&url=https%3A%2F%2Fother.com&keyword=a7",
        )))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["code"], "error:keyword");

    // same url again
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(api_request(&signed("action=shorturl&url=https%3A%2F%2Furl.com%2F%3Fa7")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let dup = body_json(resp).await;
    assert_eq!(dup["code"], "error:url");
    assert_eq!(dup["shorturl"], "http://kb.in/a7");

    // expand
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(api_request(&signed("action=expand&shorturl=http%3A%2F%2Fkb.in%2Fa7")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let expanded = body_json(resp).await;
    assert_eq!(expanded["longurl"], "https://url.com/?a7");
    assert_eq!(expanded["statusCode"], 200);

    // follow the short link twice
    for _ in 0..2 {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(Request::builder().uri("/a7").body(String::new()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::PERMANENT_REDIRECT);
        assert_eq!(resp.headers()[header::LOCATION], "https://url.com/?a7");
        assert!(body_bytes(resp).await.is_empty());
    }

    // url-stats
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(api_request(&signed("action=url-stats&shorturl=a7")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let link = body_json(resp).await;
    assert_eq!(link["link"]["clicks"], "2");
    assert_eq!(link["link"]["shorturl"], "http://kb.in/a7");

    // stats without limit: totals only
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(api_request(&signed("action=stats")))
        .await
        .unwrap();
    let simple = body_json(resp).await;
    assert!(simple.get("links").is_none());
    assert_eq!(simple["stats"]["total_links"], "1");
    assert_eq!(simple["stats"]["total_clicks"], "2");

    // stats with limit
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(api_request(&signed("action=stats&filter=top&limit=5")))
        .await
        .unwrap();
    let full = body_json(resp).await;
    assert_eq!(full["links"]["link_1"]["url"], "https://url.com/?a7");
    assert!(full["links"].get("link_2").is_none());

    // db-stats
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(api_request(&signed("action=db-stats")))
        .await
        .unwrap();
    let db = body_json(resp).await;
    assert_eq!(db["db-stats"]["total_links"], "1");
    assert_eq!(db["statusCode"], 200);
}

#[tokio::test]
async fn following_unknown_keyword_returns_404() {
    let resp = app(credentials())
        .oneshot(Request::builder().uri("/nope").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
