use std::process::ExitCode;
use std::sync::Arc;

use orderdesk_core::{DeskConfig, OrderFormController, ProxyApiClient};

use crate::cli::{OrderArgs, OutputFormat};
use crate::error::CliError;
use crate::output;

pub async fn run(
    args: &OrderArgs,
    config: DeskConfig,
    format: OutputFormat,
) -> Result<ExitCode, CliError> {
    let form = OrderFormController::new(Arc::new(ProxyApiClient::new(config)));
    form.set_market(args.market.code());
    form.set_symbol(args.symbol.as_str());
    form.set_quantity(args.qty.as_str());
    form.set_limit_price(args.price.as_str());
    form.set_order_type(args.trade_type.code());
    form.set_conditional_price(args.cond_price.as_str());

    let outcome = form.submit().await;
    output::render_order(&form.snapshot(), format)?;

    if outcome.is_accepted() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(3))
    }
}
