mod common;

use linkpool::api::dto::shorten::ShortenResponse;
use serde_json::json;

#[tokio::test]
async fn test_shorten_single_url() {
    let (state, store) = common::memory_state();
    let server = common::test_server(state);

    let response = server
        .post("/shorten")
        .json(&json!({ "long_url": "https://example.com/a" }))
        .await;

    response.assert_status_ok();

    let body = response.json::<ShortenResponse>();
    assert_eq!(body.short_code.len(), 8);
    assert_eq!(body.long_url, "https://example.com/a");
    assert_eq!(
        body.short_url,
        format!("{}/{}", common::BASE_URL, body.short_code)
    );
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_shorten_deduplication() {
    let (state, store) = common::memory_state();
    let server = common::test_server(state);

    let first = server
        .post("/shorten")
        .json(&json!({ "long_url": "https://dedup.com" }))
        .await
        .json::<ShortenResponse>();
    let second = server
        .post("/shorten")
        .json(&json!({ "long_url": "https://dedup.com" }))
        .await
        .json::<ShortenResponse>();

    assert_eq!(first.short_code, second.short_code);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_shorten_keeps_url_verbatim() {
    let (state, _store) = common::memory_state();
    let server = common::test_server(state);

    let url = "https://Example.com/Path/?q=1&b=2#frag";
    let body = server
        .post("/shorten")
        .json(&json!({ "long_url": url }))
        .await
        .json::<ShortenResponse>();

    assert_eq!(body.long_url, url);

    let response = server.get(&format!("/{}", body.short_code)).await;
    assert_eq!(response.header("location"), url);
}

#[tokio::test]
async fn test_shorten_invalid_url() {
    let (state, store) = common::memory_state();
    let server = common::test_server(state);

    let response = server
        .post("/shorten")
        .json(&json!({ "long_url": "not-a-valid-url" }))
        .await;

    response.assert_status_bad_request();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "validation_error");
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_shorten_rejects_line_breaks_in_url() {
    let (state, store) = common::memory_state();
    let server = common::test_server(state);

    let response = server
        .post("/shorten")
        .json(&json!({ "long_url": "https://example.com/a\r\nb" }))
        .await;

    response.assert_status_bad_request();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "validation_error");
    assert_eq!(
        json["error"]["details"]["long_url"][0]["code"],
        "control_characters"
    );
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_shorten_missing_field() {
    let (state, _store) = common::memory_state();
    let server = common::test_server(state);

    let response = server
        .post("/shorten")
        .json(&json!({ "url": "https://example.com" }))
        .await;

    assert!(response.status_code().is_client_error());
}

#[tokio::test]
async fn test_shorten_rate_limited() {
    let store = std::sync::Arc::new(linkpool::infrastructure::persistence::MemoryUrlStore::new());
    let state = common::create_test_state(
        store.clone(),
        common::TestOptions {
            burst: 3,
            ..Default::default()
        },
    );
    let server = common::test_server(state);

    for i in 0..3 {
        server
            .post("/shorten")
            .json(&json!({ "long_url": format!("https://example.com/{i}") }))
            .await
            .assert_status_ok();
    }

    let response = server
        .post("/shorten")
        .json(&json!({ "long_url": "https://example.com/over" }))
        .await;

    assert_eq!(response.status_code(), 429);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "rate_limited");
    assert_eq!(store.len(), 3);
}
