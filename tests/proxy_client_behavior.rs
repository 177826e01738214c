//! Behavior-driven tests for the brokerage proxy client
//!
//! These tests verify how `ProxyApiClient` talks HTTP: where requests go,
//! what they carry, and how non-2xx answers become recognized API errors.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use orderdesk_core::{
    BrokerApi, CallError, DeskConfig, HttpClient, HttpError, HttpMethod, HttpRequest,
    HttpResponse, OrderFormController, ProxyApiClient, TimeEndpoint,
};
use serde_json::json;

/// Transport stub that records requests and replays one response.
struct RecordingHttpClient {
    reply: Result<HttpResponse, HttpError>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl RecordingHttpClient {
    fn new(reply: Result<HttpResponse, HttpError>) -> Arc<Self> {
        Arc::new(Self {
            reply,
            requests: Mutex::new(Vec::new()),
        })
    }

    fn last_request(&self) -> HttpRequest {
        self.requests
            .lock()
            .expect("requests lock")
            .last()
            .cloned()
            .expect("a request was sent")
    }
}

impl HttpClient for RecordingHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            self.requests.lock().expect("requests lock").push(request);
            self.reply.clone()
        })
    }
}

fn config() -> DeskConfig {
    DeskConfig {
        base_url: String::from("http://desk.test"),
        api_token: Some(String::from("token-123")),
        ..DeskConfig::default()
    }
}

// =============================================================================
// Proxy Client: Request Shape
// =============================================================================

#[tokio::test]
async fn when_operation_is_called_request_is_posted_to_operation_path() {
    // Given: A proxy client with a bearer token
    let http = RecordingHttpClient::new(Ok(HttpResponse::ok_json(
        r#"{"success":true,"data":{"return_msg":"OK"}}"#,
    )));
    let client = ProxyApiClient::with_http_client(http.clone(), config());

    // When: An operation is invoked
    let response = client
        .call("kt10000", json!({ "stk_cd": "005930" }))
        .await
        .expect("call succeeds");

    // Then: A JSON POST reaches the operation path with auth and timeout
    assert!(response.success);
    assert_eq!(response.return_msg(), Some("OK"));

    let request = http.last_request();
    assert_eq!(request.method, HttpMethod::Post);
    assert_eq!(request.url, "http://desk.test/api/v1/kiwoom/kt10000");
    assert_eq!(
        request.headers.get("authorization").map(String::as_str),
        Some("Bearer token-123")
    );
    assert_eq!(
        request.headers.get("content-type").map(String::as_str),
        Some("application/json")
    );
    assert_eq!(request.timeout_ms, 3_000);
    let body: serde_json::Value =
        serde_json::from_str(request.body.as_deref().expect("body present")).expect("json body");
    assert_eq!(body, json!({ "stk_cd": "005930" }));
}

// =============================================================================
// Proxy Client: Error Mapping
// =============================================================================

#[tokio::test]
async fn when_proxy_answers_non_2xx_caller_gets_recognized_api_error() {
    // Given: A proxy that rejects the token
    let http = RecordingHttpClient::new(Ok(HttpResponse::new(
        401,
        r#"{"detail":"token expired"}"#,
    )));
    let client = ProxyApiClient::with_http_client(http, config());

    // When: An operation is invoked
    let error = client
        .call("kt10000", json!({}))
        .await
        .expect_err("must fail");

    // Then: The status and detail survive as an API error
    match error {
        CallError::Api(api) => {
            assert_eq!(api.status(), "401");
            assert_eq!(api.message(), "token expired");
        }
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn when_proxy_answers_garbage_caller_gets_decode_error() {
    // Given: A proxy that returns HTML on success
    let http = RecordingHttpClient::new(Ok(HttpResponse::ok_json("<html></html>")));
    let client = ProxyApiClient::with_http_client(http, config());

    // When: An operation is invoked
    let error = client.call("kt10000", json!({})).await.expect_err("must fail");

    // Then: The failure is a decode error, not an API error
    assert!(matches!(error, CallError::Decode(_)));
}

#[tokio::test]
async fn when_proxy_rejects_order_form_shows_status_code() {
    // Given: An order form wired to a proxy that answers 500
    let http = RecordingHttpClient::new(Ok(HttpResponse::new(
        500,
        r#"{"message":"broker offline"}"#,
    )));
    let form = OrderFormController::new(Arc::new(ProxyApiClient::with_http_client(
        http,
        config(),
    )));
    form.set_symbol("005930");

    // When: The user submits
    form.submit().await;

    // Then: The form shows the status-coded error
    assert_eq!(form.snapshot().error_message(), "Error 500: broker offline");
}

// =============================================================================
// Proxy Client: Server Time
// =============================================================================

#[tokio::test]
async fn when_server_time_is_requested_time_field_is_returned() {
    // Given: A backend exposing the system time endpoint
    let http = RecordingHttpClient::new(Ok(HttpResponse::ok_json(
        r#"{"time":"2024-03-04 09:05:07 (월)"}"#,
    )));
    let client = ProxyApiClient::with_http_client(http.clone(), config());

    // When: The time is fetched
    let time = client.fetch_time().await.expect("time fetch succeeds");

    // Then: The raw time string is returned from a GET on the system path
    assert_eq!(time, "2024-03-04 09:05:07 (월)");
    let request = http.last_request();
    assert_eq!(request.method, HttpMethod::Get);
    assert_eq!(request.url, "http://desk.test/api/v1/system/time");
}

#[tokio::test]
async fn when_backend_is_unreachable_time_fetch_reports_transport_error() {
    // Given: A transport that cannot connect
    let http = RecordingHttpClient::new(Err(HttpError::new("connection failed")));
    let client = ProxyApiClient::with_http_client(http, config());

    // When: The time is fetched
    let error = client.fetch_time().await.expect_err("must fail");

    // Then: The transport error is surfaced unchanged
    assert_eq!(error, CallError::Transport(HttpError::new("connection failed")));
}
