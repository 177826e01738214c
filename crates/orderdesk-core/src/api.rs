//! Client for the dashboard backend.
//!
//! [`BrokerApi`] is the API-call capability the order form depends on: it
//! takes an operation id (`kt10000` for order submission) and a JSON payload
//! and resolves to the proxy's `{ success, data, error_message }` envelope.
//! [`TimeEndpoint`] is the server clock used to seed the clock widget.
//! [`ProxyApiClient`] implements both over an [`HttpClient`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::DeskConfig;
use crate::error::{ApiError, CallError};
use crate::http_client::{HttpClient, HttpRequest, HttpResponse, ReqwestHttpClient};

pub const SYSTEM_TIME_PATH: &str = "/api/v1/system/time";

const FALLBACK_ERROR_MESSAGE: &str = "request failed";

/// Envelope returned by the brokerage proxy for every operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ApiResponse {
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data,
            error_message: None,
        }
    }

    pub fn failed(error_message: Option<String>) -> Self {
        Self {
            success: false,
            data: Value::Object(Default::default()),
            error_message,
        }
    }

    /// Broker confirmation text, if present and non-empty.
    pub fn return_msg(&self) -> Option<&str> {
        self.data
            .get("return_msg")
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message
            .as_deref()
            .filter(|message| !message.is_empty())
    }
}

/// Remote operation invoker.
pub trait BrokerApi: Send + Sync {
    fn call<'a>(
        &'a self,
        api_id: &'a str,
        payload: Value,
    ) -> Pin<Box<dyn Future<Output = Result<ApiResponse, CallError>> + Send + 'a>>;
}

/// Source of the server's notion of the current time, as display text.
pub trait TimeEndpoint: Send + Sync {
    fn fetch_time<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<String, CallError>> + Send + 'a>>;
}

#[derive(Debug, Deserialize)]
struct TimePayload {
    time: String,
}

/// HTTP client for the dashboard backend and its brokerage proxy.
#[derive(Clone)]
pub struct ProxyApiClient {
    http_client: Arc<dyn HttpClient>,
    config: DeskConfig,
}

impl ProxyApiClient {
    pub fn new(config: DeskConfig) -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()), config)
    }

    pub fn with_http_client(http_client: Arc<dyn HttpClient>, config: DeskConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }

    pub fn config(&self) -> &DeskConfig {
        &self.config
    }

    fn operation_url(&self, api_id: &str) -> String {
        format!("{}{}/{}", self.config.base_url, self.config.api_path, api_id)
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, CallError> {
        let request = request
            .with_auth(&self.config.auth())
            .with_timeout_ms(self.config.timeout_ms);

        let response = self.http_client.execute(request).await?;
        if !response.is_success() {
            return Err(ApiError::from_http_status(
                response.status,
                error_message_from_body(&response.body),
            )
            .into());
        }
        Ok(response)
    }
}

impl BrokerApi for ProxyApiClient {
    fn call<'a>(
        &'a self,
        api_id: &'a str,
        payload: Value,
    ) -> Pin<Box<dyn Future<Output = Result<ApiResponse, CallError>> + Send + 'a>> {
        Box::pin(async move {
            let url = self.operation_url(api_id);
            debug!(api_id, %url, "dispatching broker api call");

            let body = serde_json::to_string(&payload)
                .map_err(|error| CallError::Decode(error.to_string()))?;
            let response = self.send(HttpRequest::post(url).with_json_body(body)).await?;

            serde_json::from_str::<ApiResponse>(&response.body)
                .map_err(|error| CallError::Decode(error.to_string()))
        })
    }
}

impl TimeEndpoint for ProxyApiClient {
    fn fetch_time<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<String, CallError>> + Send + 'a>> {
        Box::pin(async move {
            let url = format!("{}{}", self.config.base_url, SYSTEM_TIME_PATH);
            let response = self.send(HttpRequest::get(url)).await?;

            serde_json::from_str::<TimePayload>(&response.body)
                .map(|payload| payload.time)
                .map_err(|error| CallError::Decode(error.to_string()))
        })
    }
}

/// Best-effort human message from an error response body.
fn error_message_from_body(body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["detail", "message", "error_message"] {
            match map.get(key) {
                Some(Value::String(message)) if !message.is_empty() => return message.clone(),
                Some(Value::Null) | None => {}
                Some(Value::String(_)) => {}
                Some(other) => return other.to_string(),
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        String::from(FALLBACK_ERROR_MESSAGE)
    } else {
        trimmed.to_owned()
    }
}
