use crmpilot_core::config::{AppConfig, LoadOptions};

use crate::bootstrap;
use crate::commands::{CommandResult, EXIT_CONFIG_ERROR};

/// Prints the capability catalog exactly as the resolver advertises it
/// to the model: names, descriptions, and parameter schemas.
pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                EXIT_CONFIG_ERROR,
                format!("config validation failed: {error}"),
            )
        }
    };

    let registry = match bootstrap::build_registry(&config) {
        Ok(registry) => registry,
        Err(error) => {
            return CommandResult::failure(EXIT_CONFIG_ERROR, format!("startup failed: {error:#}"))
        }
    };

    let catalog: Vec<_> = registry.describe_all().collect();
    match serde_json::to_string_pretty(&catalog) {
        Ok(output) => CommandResult::success(output),
        Err(error) => CommandResult::failure(
            EXIT_CONFIG_ERROR,
            format!("catalog serialization failed: {error}"),
        ),
    }
}
