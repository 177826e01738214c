//! # Orderdesk Core
//!
//! Client-side building blocks for the orderdesk trading dashboard.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | Brokerage proxy client and server time endpoint |
//! | [`clock`] | Clock widget refreshed once per second |
//! | [`config`] | Environment-driven client configuration |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`order`] | Order-entry form controller |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use orderdesk_core::{DeskConfig, OrderFormController, ProxyApiClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = ProxyApiClient::new(DeskConfig::from_env()?);
//!     let form = OrderFormController::new(Arc::new(api));
//!     form.set_symbol("005930");
//!     form.set_limit_price("70000");
//!     form.set_order_type("0");
//!
//!     form.submit().await;
//!     let state = form.snapshot();
//!     println!("{}{}", state.result_message(), state.error_message());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! `OrderFormController::submit` never returns an error: every failure is
//! rendered into the form's error message.
//!
//! ```rust
//! use orderdesk_core::{ApiError, CallError, OrderError};
//!
//! let error = OrderError::from(CallError::from(ApiError::from_http_status(401, "token expired")));
//! assert_eq!(error.user_message(), "Error 401: token expired");
//! ```

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod http_client;
pub mod order;

pub use api::{ApiResponse, BrokerApi, ProxyApiClient, TimeEndpoint, SYSTEM_TIME_PATH};

pub use clock::{
    format_display, in_zone, ClockHandle, ClockSource, ClockWidget, FixedClock, LocalClock,
    WallClock, TICK_INTERVAL, WEEKDAYS,
};

pub use config::DeskConfig;

pub use error::{ApiError, CallError, ConfigError, OrderError};

pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient,
};

pub use order::{
    Market, OrderFormController, OrderFormState, OrderPayload, SubmitOutcome, TradeType,
    UnknownCode, DEFAULT_CONFIRMATION, DEFAULT_FAILURE, ORDER_SUBMIT_API_ID,
};
