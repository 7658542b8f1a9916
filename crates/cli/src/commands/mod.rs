pub mod ask;
pub mod capabilities;
pub mod config;
pub mod doctor;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

impl CommandResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self { exit_code: 0, output: output.into() }
    }

    pub fn failure(exit_code: u8, output: impl Into<String>) -> Self {
        Self { exit_code, output: output.into() }
    }
}

/// Exit code for configuration problems, distinct from dispatch failures.
pub const EXIT_CONFIG_ERROR: u8 = 2;
/// Exit code when a dispatched request ends in a non-ok envelope.
pub const EXIT_DISPATCH_FAILURE: u8 = 1;
