//! SheetClient against a local fake of the spreadsheet script (axum on a free loopback port).

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sheetrelay::config::{RepliesConfig, DEFAULT_FALLBACK, DEFAULT_GREETING};
use sheetrelay::remote::{RemoteEndpoint, RemoteError, SheetClient};
use sheetrelay::responder::resolve_reply;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Default)]
struct FakeScript {
    posts: Arc<Mutex<Vec<Value>>>,
    queries: Arc<Mutex<Vec<String>>>,
}

async fn script_get(
    State(script): State<FakeScript>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let q = params.get("query").cloned().unwrap_or_default();
    script.queries.lock().unwrap().push(q.clone());
    match q.as_str() {
        "multi line" => Json(json!({ "response": "a\\nb" })).into_response(),
        "nothing" => Json(json!({ "status": "ok" })).into_response(),
        "empty" => Json(json!({ "response": "" })).into_response(),
        "number" => Json(json!({ "response": 42 })).into_response(),
        "boom" => (StatusCode::INTERNAL_SERVER_ERROR, "script error").into_response(),
        "garbled" => "<html>not json</html>".into_response(),
        "slow" => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!({ "response": "late" })).into_response()
        }
        other => Json(json!({ "response": format!("echo: {}", other) })).into_response(),
    }
}

async fn script_post(State(script): State<FakeScript>, Json(body): Json<Value>) -> Response {
    let fail = body.get("message").and_then(|v| v.as_str()) == Some("fail");
    script.posts.lock().unwrap().push(body);
    if fail {
        return (StatusCode::INTERNAL_SERVER_ERROR, "quota exceeded").into_response();
    }
    Json(json!({ "result": "success", "row": 7 })).into_response()
}

/// Start the fake script; returns its /exec URL and recorded traffic.
async fn start_fake_script() -> (String, FakeScript) {
    let script = FakeScript::default();
    let app = Router::new()
        .route("/exec", get(script_get).post(script_post))
        .with_state(script.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake script");
    let addr = listener.local_addr().expect("local_addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{}/exec", addr), script)
}

#[tokio::test]
async fn log_message_posts_message_json() {
    let (url, script) = start_fake_script().await;
    let client = SheetClient::new(url, None).unwrap();

    let ack = client.log_message("Hello there").await.unwrap();
    assert_eq!(ack.get("result").and_then(|v| v.as_str()), Some("success"));
    assert_eq!(
        script.posts.lock().unwrap().clone(),
        vec![json!({ "message": "Hello there" })]
    );
}

#[tokio::test]
async fn log_location_posts_coordinates() {
    let (url, script) = start_fake_script().await;
    let client = SheetClient::new(url, None).unwrap();

    client.log_location(51.5074, -0.1278).await.unwrap();
    assert_eq!(
        script.posts.lock().unwrap().clone(),
        vec![json!({ "latitude": 51.5074, "longitude": -0.1278 })]
    );
}

#[tokio::test]
async fn log_failure_status_is_api_error() {
    let (url, _script) = start_fake_script().await;
    let client = SheetClient::new(url, None).unwrap();

    let err = client.log_message("fail").await.unwrap_err();
    assert!(matches!(err, RemoteError::Api(ref m) if m.contains("500")));
}

#[tokio::test]
async fn fetch_reply_url_encodes_query() {
    let (url, script) = start_fake_script().await;
    let client = SheetClient::new(url, None).unwrap();

    let reply = client.fetch_reply("fish & chips?=yes").await.unwrap();
    assert_eq!(reply.as_deref(), Some("echo: fish & chips?=yes"));
    assert_eq!(
        script.queries.lock().unwrap().clone(),
        vec!["fish & chips?=yes".to_string()]
    );
}

#[tokio::test]
async fn fetch_reply_variants() {
    let (url, _script) = start_fake_script().await;
    let client = SheetClient::new(url, None).unwrap();

    assert_eq!(client.fetch_reply("multi line").await.unwrap().as_deref(), Some("a\\nb"));
    assert_eq!(client.fetch_reply("nothing").await.unwrap(), None);
    assert_eq!(client.fetch_reply("empty").await.unwrap(), None);
    assert!(matches!(client.fetch_reply("number").await, Err(RemoteError::Api(_))));
    assert!(matches!(client.fetch_reply("boom").await, Err(RemoteError::Api(_))));
    assert!(matches!(client.fetch_reply("garbled").await, Err(RemoteError::Decode(_))));
}

#[tokio::test]
async fn resolve_reply_maps_outcomes_to_texts() {
    let (url, _script) = start_fake_script().await;
    let client = SheetClient::new(url, None).unwrap();
    let replies = RepliesConfig::default();

    assert_eq!(resolve_reply(&client, "Multi LINE", &replies).await, "a\nb");
    assert_eq!(resolve_reply(&client, "NOTHING", &replies).await, DEFAULT_GREETING);
    assert_eq!(resolve_reply(&client, "boom", &replies).await, DEFAULT_FALLBACK);
    assert_eq!(resolve_reply(&client, "garbled", &replies).await, DEFAULT_FALLBACK);
}

#[tokio::test]
async fn configured_timeout_bounds_reply_fetch() {
    let (url, _script) = start_fake_script().await;
    let client = SheetClient::new(url, Some(Duration::from_millis(200))).unwrap();

    let err = client.fetch_reply("slow").await.unwrap_err();
    match err {
        RemoteError::Request(e) => assert!(e.is_timeout()),
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn unreachable_endpoint_is_request_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("local_addr").port();
    drop(listener);
    let client = SheetClient::new(format!("http://127.0.0.1:{}/exec", port), None).unwrap();

    assert!(matches!(client.log_message("x").await, Err(RemoteError::Request(_))));
    let replies = RepliesConfig::default();
    assert_eq!(resolve_reply(&client, "x", &replies).await, DEFAULT_FALLBACK);
}
