use crmpilot_core::config::{AppConfig, LoadOptions};

use crate::bootstrap;
use crate::commands::{CommandResult, EXIT_CONFIG_ERROR, EXIT_DISPATCH_FAILURE};

/// Dispatches one free-text request and prints the result envelope as
/// JSON. The envelope is always printed, whatever its status; the exit
/// code distinguishes ok from failed dispatches for scripting.
pub fn run(text: &str) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                EXIT_CONFIG_ERROR,
                format!("config validation failed: {error}"),
            )
        }
    };
    bootstrap::init_logging(&config);

    let dispatcher = match bootstrap::build_dispatcher(&config) {
        Ok(dispatcher) => dispatcher,
        Err(error) => {
            return CommandResult::failure(EXIT_CONFIG_ERROR, format!("startup failed: {error:#}"))
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                EXIT_CONFIG_ERROR,
                format!("failed to initialize async runtime: {error}"),
            )
        }
    };

    let envelope = runtime.block_on(dispatcher.dispatch(text));
    let output = serde_json::to_string_pretty(&envelope)
        .unwrap_or_else(|error| format!("{{\"status\":\"execution_error\",\"message\":\"envelope serialization failed: {error}\"}}"));

    if envelope.is_ok() {
        CommandResult::success(output)
    } else {
        CommandResult::failure(EXIT_DISPATCH_FAILURE, output)
    }
}
