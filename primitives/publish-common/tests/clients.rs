//! HTTP Client Integration Tests
//!
//! Runs `GitHubClient` and `QiitaClient` against a local axum server that
//! answers with scripted responses and records every request it receives.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use publish_common::{
    Article, ContentApi, Error, GitHubClient, GitHubConfig, MappingStore, Publisher, QiitaClient,
    QiitaConfig, RawSource, RemoteMappingStore,
};
use serde_json::{Value, json};

const CONTENTS: &str = "/repos/octo/blog/contents";

#[derive(Debug, Clone)]
struct Recorded {
    method: Method,
    path: String,
    accept: String,
    authorization: String,
    user_agent: String,
    body: Vec<u8>,
}

impl Recorded {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// Responses keyed by `"<METHOD> <path>"`, with ` raw` appended for
/// requests that ask GitHub for raw content.
#[derive(Default)]
struct Mock {
    responses: Mutex<HashMap<String, (StatusCode, String)>>,
    requests: Mutex<Vec<Recorded>>,
}

impl Mock {
    fn respond(&self, key: &str, status: StatusCode, body: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(key.to_string(), (status, body.into()));
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

async fn answer(
    State(mock): State<Arc<Mock>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|h| h.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };
    let recorded = Recorded {
        method: method.clone(),
        path: uri.path().to_string(),
        accept: header_value(header::ACCEPT),
        authorization: header_value(header::AUTHORIZATION),
        user_agent: header_value(header::USER_AGENT),
        body: body.to_vec(),
    };

    let mut key = format!("{method} {}", recorded.path);
    if recorded.accept == "application/vnd.github.raw" {
        key.push_str(" raw");
    }
    mock.requests.lock().unwrap().push(recorded);

    match mock.responses.lock().unwrap().get(&key).cloned() {
        Some((status, body)) => (status, [(header::CONTENT_TYPE, "application/json")], body).into_response(),
        None => (StatusCode::NOT_FOUND, r#"{"message":"Not Found"}"#).into_response(),
    }
}

async fn serve() -> (Arc<Mock>, String) {
    let mock = Arc::new(Mock::default());
    let app = Router::new().fallback(answer).with_state(mock.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (mock, format!("http://{addr}"))
}

fn github(base_url: &str) -> GitHubClient {
    GitHubClient::new(GitHubConfig {
        api_url: base_url.to_string(),
        repo: "octo/blog".to_string(),
        token: "ghp_secret".to_string(),
    })
    .unwrap()
}

fn qiita(base_url: &str) -> QiitaClient {
    QiitaClient::new(QiitaConfig {
        base_url: base_url.to_string(),
        access_token: "qiita_secret".to_string(),
    })
    .unwrap()
}

fn article() -> Article {
    Article {
        title: "Hello".to_string(),
        body: "Body text.\n".to_string(),
        tags: vec!["ruby".to_string()],
        private: false,
    }
}

#[tokio::test]
async fn test_raw_fetch_returns_bytes() {
    let (mock, url) = serve().await;
    mock.respond(
        &format!("GET {CONTENTS}/blog/articles/hello.md raw"),
        StatusCode::OK,
        "---\ntitle: Hello\n---\nBody\n",
    );

    let bytes = github(&url).fetch_raw_file("blog/articles/hello.md").await.unwrap();

    assert_eq!(bytes, b"---\ntitle: Hello\n---\nBody\n");
    let request = &mock.requests()[0];
    assert_eq!(request.authorization, "token ghp_secret");
    assert!(request.user_agent.starts_with("publish-common/"));
}

#[tokio::test]
async fn test_raw_fetch_failure_carries_status() {
    let (mock, url) = serve().await;
    mock.respond(
        &format!("GET {CONTENTS}/blog/articles/hello.md raw"),
        StatusCode::FORBIDDEN,
        r#"{"message":"Bad credentials"}"#,
    );

    let err = github(&url).fetch_raw_file("blog/articles/hello.md").await.unwrap_err();

    match err {
        Error::SourceFetch { path, status, body } => {
            assert_eq!(path, "blog/articles/hello.md");
            assert_eq!(status, 403);
            assert!(body.contains("Bad credentials"));
        }
        other => panic!("expected SourceFetch, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_missing_file_is_none() {
    let (_mock, url) = serve().await;

    assert_eq!(github(&url).fetch_file("mapping.txt").await.unwrap(), None);
}

#[tokio::test]
async fn test_fetch_error_status_is_remote_store_error() {
    let (mock, url) = serve().await;
    mock.respond(&format!("GET {CONTENTS}/mapping.txt"), StatusCode::INTERNAL_SERVER_ERROR, "{}");

    let err = github(&url).fetch_file("mapping.txt").await.unwrap_err();

    assert!(matches!(err, Error::RemoteStore { status: 500, .. }));
}

#[tokio::test]
async fn test_fetch_decodes_base64_content() {
    let (mock, url) = serve().await;
    let encoded = STANDARD.encode("blog/a.md, 111\n");
    mock.respond(
        &format!("GET {CONTENTS}/mapping.txt"),
        StatusCode::OK,
        json!({"content": format!("{encoded}\n"), "encoding": "base64", "sha": "abc"}).to_string(),
    );

    let file = github(&url).fetch_file("mapping.txt").await.unwrap().unwrap();

    assert_eq!(file.content, b"blog/a.md, 111\n");
    assert_eq!(file.sha, "abc");
    assert_eq!(mock.requests()[0].accept, "application/vnd.github+json");
}

#[tokio::test]
async fn test_large_mapping_file_is_fetched_raw_and_kept_on_record() {
    let (mock, url) = serve().await;
    mock.respond(
        &format!("GET {CONTENTS}/mapping.txt"),
        StatusCode::OK,
        json!({"content": "", "encoding": "none", "sha": "abc"}).to_string(),
    );
    mock.respond(
        &format!("GET {CONTENTS}/mapping.txt raw"),
        StatusCode::OK,
        "blog/a.md, old\nblog/b.md, other\n",
    );
    mock.respond(&format!("PUT {CONTENTS}/mapping.txt"), StatusCode::OK, "{}");

    let store = RemoteMappingStore::new(Arc::new(github(&url)), "mapping.txt");
    store.record("blog/a.md", "new").await.unwrap();

    let put = mock
        .requests()
        .into_iter()
        .find(|r| r.method == Method::PUT)
        .unwrap();
    let body = put.json();
    let written = STANDARD.decode(body["content"].as_str().unwrap()).unwrap();
    assert_eq!(written, b"blog/a.md, new\nblog/a.md, old\nblog/b.md, other\n");
    assert_eq!(body["sha"], "abc");
}

#[tokio::test]
async fn test_large_file_raw_failure_is_remote_store_error() {
    let (mock, url) = serve().await;
    mock.respond(
        &format!("GET {CONTENTS}/mapping.txt"),
        StatusCode::OK,
        json!({"content": "", "encoding": "none", "sha": "abc"}).to_string(),
    );

    let err = github(&url).fetch_file("mapping.txt").await.unwrap_err();

    assert!(matches!(err, Error::RemoteStore { status: 404, .. }));
}

#[tokio::test]
async fn test_write_sends_base64_and_sha() {
    let (mock, url) = serve().await;
    mock.respond(&format!("PUT {CONTENTS}/mapping.txt"), StatusCode::OK, "{}");

    github(&url)
        .write_file("mapping.txt", b"blog/a.md, 1\n", Some("abc"), "Update mapping file")
        .await
        .unwrap();

    let body = mock.requests()[0].json();
    assert_eq!(body["message"], "Update mapping file");
    assert_eq!(body["content"], STANDARD.encode("blog/a.md, 1\n"));
    assert_eq!(body["sha"], "abc");
}

#[tokio::test]
async fn test_write_conflict_is_remote_store_error() {
    let (mock, url) = serve().await;
    mock.respond(
        &format!("PUT {CONTENTS}/mapping.txt"),
        StatusCode::CONFLICT,
        r#"{"message":"mapping.txt does not match abc"}"#,
    );

    let err = github(&url)
        .write_file("mapping.txt", b"x", Some("abc"), "Update mapping file")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::RemoteStore { status: 409, .. }));
}

#[tokio::test]
async fn test_create_posts_item_and_returns_id() {
    let (mock, url) = serve().await;
    mock.respond(
        "POST /api/v2/items",
        StatusCode::CREATED,
        json!({"id": "c686397e4a0f4f11683d", "title": "Hello"}).to_string(),
    );

    let id = qiita(&url).create_article(&article(), true).await.unwrap();

    assert_eq!(id, "c686397e4a0f4f11683d");
    let request = &mock.requests()[0];
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.authorization, "Bearer qiita_secret");
    let body = request.json();
    assert_eq!(body["tweet"], true);
    assert_eq!(body["private"], false);
    assert_eq!(body["tags"], json!([{"name": "ruby"}]));
}

#[tokio::test]
async fn test_update_patches_item_without_tweet() {
    let (mock, url) = serve().await;
    mock.respond(
        "PATCH /api/v2/items/c686397e4a0f4f11683d",
        StatusCode::OK,
        json!({"id": "c686397e4a0f4f11683d"}).to_string(),
    );

    qiita(&url)
        .update_article("c686397e4a0f4f11683d", &article())
        .await
        .unwrap();

    let request = &mock.requests()[0];
    assert_eq!(request.method, Method::PATCH);
    assert_eq!(request.path, "/api/v2/items/c686397e4a0f4f11683d");
    assert!(request.json().get("tweet").is_none());
}

#[tokio::test]
async fn test_qiita_error_status_is_publish_error() {
    let (mock, url) = serve().await;
    mock.respond(
        "POST /api/v2/items",
        StatusCode::UNAUTHORIZED,
        r#"{"message":"Unauthorized","type":"unauthorized"}"#,
    );

    let err = qiita(&url).create_article(&article(), false).await.unwrap_err();

    match err {
        Error::Publish { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("unauthorized"));
        }
        other => panic!("expected Publish, got {other:?}"),
    }
}
