//! Order-entry form.
//!
//! [`OrderFormController`] owns the form fields and turns a submit into a
//! single broker call. The outcome always lands in exactly one of the two
//! message slots; `submit` itself never fails.

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::api::BrokerApi;
use crate::error::{CallError, OrderError};

/// Operation id of the broker's stock order endpoint.
pub const ORDER_SUBMIT_API_ID: &str = "kt10000";

pub const DEFAULT_CONFIRMATION: &str = "Order submitted successfully.";
pub const DEFAULT_FAILURE: &str = "An unknown error occurred.";

/// Exchange an order is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Market {
    #[serde(rename = "KRX")]
    Krx,
    #[serde(rename = "NXT")]
    Nxt,
    #[serde(rename = "SOR")]
    Sor,
}

impl Market {
    pub const fn code(self) -> &'static str {
        match self {
            Self::Krx => "KRX",
            Self::Nxt => "NXT",
            Self::Sor => "SOR",
        }
    }
}

impl Display for Market {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Market {
    type Err = UnknownCode;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "KRX" => Ok(Self::Krx),
            "NXT" => Ok(Self::Nxt),
            "SOR" => Ok(Self::Sor),
            _ => Err(UnknownCode::new("market", value)),
        }
    }
}

/// Order variant, identified on the wire by a numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeType {
    Limit,
    Market,
    ConditionalLimit,
    BestLimit,
    TopPriorityLimit,
    LimitIoc,
    MarketIoc,
    BestIoc,
    LimitFok,
    MarketFok,
    BestFok,
    StopLimit,
    MidPrice,
    MidPriceIoc,
    MidPriceFok,
    PreMarketOffHours,
    SingleOffHours,
    AfterMarketOffHours,
}

impl TradeType {
    pub const ALL: [Self; 18] = [
        Self::Limit,
        Self::Market,
        Self::ConditionalLimit,
        Self::BestLimit,
        Self::TopPriorityLimit,
        Self::LimitIoc,
        Self::MarketIoc,
        Self::BestIoc,
        Self::LimitFok,
        Self::MarketFok,
        Self::BestFok,
        Self::StopLimit,
        Self::MidPrice,
        Self::MidPriceIoc,
        Self::MidPriceFok,
        Self::PreMarketOffHours,
        Self::SingleOffHours,
        Self::AfterMarketOffHours,
    ];

    pub const fn code(self) -> &'static str {
        match self {
            Self::Limit => "0",
            Self::Market => "3",
            Self::ConditionalLimit => "5",
            Self::BestLimit => "6",
            Self::TopPriorityLimit => "7",
            Self::LimitIoc => "10",
            Self::MarketIoc => "13",
            Self::BestIoc => "16",
            Self::LimitFok => "20",
            Self::MarketFok => "23",
            Self::BestFok => "26",
            Self::StopLimit => "28",
            Self::MidPrice => "29",
            Self::MidPriceIoc => "30",
            Self::MidPriceFok => "31",
            Self::PreMarketOffHours => "61",
            Self::SingleOffHours => "62",
            Self::AfterMarketOffHours => "81",
        }
    }
}

impl Display for TradeType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for TradeType {
    type Err = UnknownCode;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.code() == trimmed)
            .ok_or_else(|| UnknownCode::new("trade type", value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} code '{value}'")]
pub struct UnknownCode {
    kind: &'static str,
    value: String,
}

impl UnknownCode {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

/// Field values of the order form plus its two message slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderFormState {
    market: String,
    symbol: String,
    quantity: String,
    limit_price: String,
    order_type: String,
    conditional_price: String,
    result_message: String,
    error_message: String,
}

impl Default for OrderFormState {
    fn default() -> Self {
        Self {
            market: String::from(Market::Krx.code()),
            symbol: String::new(),
            quantity: String::from("1"),
            limit_price: String::new(),
            order_type: String::from(TradeType::Market.code()),
            conditional_price: String::new(),
            result_message: String::new(),
            error_message: String::new(),
        }
    }
}

impl OrderFormState {
    pub fn market(&self) -> &str {
        &self.market
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn quantity(&self) -> &str {
        &self.quantity
    }

    pub fn limit_price(&self) -> &str {
        &self.limit_price
    }

    pub fn order_type(&self) -> &str {
        &self.order_type
    }

    pub fn conditional_price(&self) -> &str {
        &self.conditional_price
    }

    pub fn result_message(&self) -> &str {
        &self.result_message
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    pub fn payload(&self) -> OrderPayload {
        OrderPayload::from_form(self)
    }

    fn clear_messages(&mut self) {
        self.result_message.clear();
        self.error_message.clear();
    }

    fn succeed(&mut self, message: String) {
        self.result_message = message;
        self.error_message.clear();
    }

    fn fail(&mut self, message: String) {
        self.error_message = message;
        self.result_message.clear();
    }
}

/// Body of a `kt10000` call. Blank optional prices go out as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPayload {
    pub dmst_stex_tp: String,
    pub stk_cd: String,
    pub ord_qty: String,
    pub ord_uv: Option<String>,
    pub trde_tp: String,
    pub cond_uv: Option<String>,
}

impl OrderPayload {
    pub fn from_form(form: &OrderFormState) -> Self {
        Self {
            dmst_stex_tp: form.market.clone(),
            stk_cd: form.symbol.clone(),
            ord_qty: form.quantity.clone(),
            ord_uv: absent_if_blank(&form.limit_price),
            trde_tp: form.order_type.clone(),
            cond_uv: absent_if_blank(&form.conditional_price),
        }
    }
}

fn absent_if_blank(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_owned())
    }
}

/// What happened to a call to [`OrderFormController::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The broker accepted the order; carries the confirmation shown.
    Accepted(String),
    /// The submit failed; carries the error text shown.
    Failed(String),
    /// Another submit was still in flight; nothing was sent.
    Busy,
}

impl SubmitOutcome {
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Controller behind the order-entry form.
pub struct OrderFormController {
    api: Arc<dyn BrokerApi>,
    state: Mutex<OrderFormState>,
    in_flight: AtomicBool,
}

impl OrderFormController {
    pub fn new(api: Arc<dyn BrokerApi>) -> Self {
        Self::with_state(api, OrderFormState::default())
    }

    pub fn with_state(api: Arc<dyn BrokerApi>, state: OrderFormState) -> Self {
        Self {
            api,
            state: Mutex::new(state),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn snapshot(&self) -> OrderFormState {
        self.lock_state().clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn set_market(&self, market: impl Into<String>) {
        self.lock_state().market = market.into();
    }

    pub fn set_symbol(&self, symbol: impl Into<String>) {
        self.lock_state().symbol = symbol.into();
    }

    pub fn set_quantity(&self, quantity: impl Into<String>) {
        self.lock_state().quantity = quantity.into();
    }

    pub fn set_limit_price(&self, price: impl Into<String>) {
        self.lock_state().limit_price = price.into();
    }

    pub fn set_order_type(&self, order_type: impl Into<String>) {
        self.lock_state().order_type = order_type.into();
    }

    pub fn set_conditional_price(&self, price: impl Into<String>) {
        self.lock_state().conditional_price = price.into();
    }

    /// Send the current form as an order.
    ///
    /// Returns [`SubmitOutcome::Busy`] without touching the form when a
    /// previous submit has not finished yet.
    pub async fn submit(&self) -> SubmitOutcome {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            debug!("order submit ignored; previous submit still in flight");
            return SubmitOutcome::Busy;
        };

        let payload = {
            let mut state = self.lock_state();
            state.clear_messages();
            state.payload()
        };

        match self.send(payload).await {
            Ok(message) => {
                self.lock_state().succeed(message.clone());
                SubmitOutcome::Accepted(message)
            }
            Err(failure) => {
                error!(error = %failure, "order submit failed");
                let message = failure.user_message();
                self.lock_state().fail(message.clone());
                SubmitOutcome::Failed(message)
            }
        }
    }

    async fn send(&self, payload: OrderPayload) -> Result<String, OrderError> {
        let payload = serde_json::to_value(&payload)
            .map_err(|e| CallError::Decode(e.to_string()))?;
        let response = self.api.call(ORDER_SUBMIT_API_ID, payload).await?;

        if !response.success {
            return Err(OrderError::rejected(
                response.error_message().unwrap_or(DEFAULT_FAILURE),
            ));
        }

        info!(data = %response.data, "order response");
        Ok(response
            .return_msg()
            .unwrap_or(DEFAULT_CONFIRMATION)
            .to_owned())
    }

    fn lock_state(&self) -> MutexGuard<'_, OrderFormState> {
        // Never held across an await, and no update can panic midway.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Clears the in-flight flag on drop, including when the submit future is cancelled.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn defaults_match_form_initial_values() {
        let state = OrderFormState::default();
        assert_eq!(state.market(), "KRX");
        assert_eq!(state.quantity(), "1");
        assert_eq!(state.order_type(), "3");
        assert!(state.result_message().is_empty());
        assert!(state.error_message().is_empty());
    }

    #[test]
    fn blank_prices_serialize_as_null() {
        let payload = OrderFormState::default().payload();
        let value = serde_json::to_value(&payload).expect("payload serializes");
        assert_eq!(
            value,
            json!({
                "dmst_stex_tp": "KRX",
                "stk_cd": "",
                "ord_qty": "1",
                "ord_uv": null,
                "trde_tp": "3",
                "cond_uv": null,
            })
        );
    }

    #[test]
    fn trade_type_codes_parse_back() {
        for kind in TradeType::ALL {
            assert_eq!(kind.code().parse::<TradeType>(), Ok(kind));
        }
        assert!("99".parse::<TradeType>().is_err());
    }

    #[test]
    fn market_parses_case_insensitively() {
        assert_eq!("nxt".parse::<Market>(), Ok(Market::Nxt));
        assert!("NYSE".parse::<Market>().is_err());
    }

    #[test]
    fn in_flight_guard_is_exclusive_and_released_on_drop() {
        let flag = AtomicBool::new(false);
        let first = InFlightGuard::acquire(&flag).expect("first acquire succeeds");
        assert!(InFlightGuard::acquire(&flag).is_none());
        drop(first);
        assert!(InFlightGuard::acquire(&flag).is_some());
    }
}
