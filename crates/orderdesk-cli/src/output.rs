use std::io::Write;

use orderdesk_core::OrderFormState;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::error::CliError;

pub fn render_order(state: &OrderFormState, format: OutputFormat) -> Result<(), CliError> {
    let line = match format {
        OutputFormat::Text => {
            if state.error_message().is_empty() {
                state.result_message().to_owned()
            } else {
                state.error_message().to_owned()
            }
        }
        OutputFormat::Json => serde_json::to_string(&json!({
            "payload": state.payload(),
            "result_message": state.result_message(),
            "error_message": state.error_message(),
        }))?,
    };
    write_line(&line)
}

pub fn render_clock(display_text: &str, format: OutputFormat) -> Result<(), CliError> {
    let line = match format {
        OutputFormat::Text => display_text.to_owned(),
        OutputFormat::Json => serde_json::to_string(&json!({ "time": display_text }))?,
    };
    write_line(&line)
}

fn write_line(line: &str) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{line}")?;
    stdout.flush()?;
    Ok(())
}
