use std::process::ExitCode;
use std::sync::Arc;

use orderdesk_core::{ClockSource, ClockWidget, DeskConfig, LocalClock, ProxyApiClient};
use tracing::debug;

use crate::cli::{ClockArgs, OutputFormat};
use crate::error::CliError;
use crate::output;

pub async fn run(
    args: &ClockArgs,
    config: DeskConfig,
    format: OutputFormat,
) -> Result<ExitCode, CliError> {
    let source = if args.server {
        ClockSource::Server(Arc::new(ProxyApiClient::new(config)))
    } else {
        ClockSource::Local
    };
    let widget = ClockWidget::new(Arc::new(LocalClock)).with_source(source);

    // subscribe before spawning so the initial display is not missed
    let mut updates = widget.subscribe();
    let handle = widget.spawn();

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut printed: u64 = 0;
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let text = updates.borrow_and_update().clone();
                output::render_clock(&text, format)?;
                printed += 1;
                if args.ticks.is_some_and(|limit| printed >= limit) {
                    break;
                }
            }
            _ = &mut shutdown => {
                debug!("interrupted; stopping clock");
                break;
            }
        }
    }

    handle.stop();
    Ok(ExitCode::SUCCESS)
}
