use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("capability `{0}` is already registered")]
    DuplicateCapability(String),
    #[error("no capability named `{0}` is registered")]
    CapabilityNotFound(String),
}

/// Parameter-scoped validation failure. The parameter name always appears
/// in the message so the caller never sees a generic failure.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("required parameter `{parameter}` is missing or empty")]
    MissingParameter { parameter: String },
    #[error("parameter `{parameter}` is invalid: expected {expected}")]
    InvalidValue { parameter: String, expected: String },
}

/// Failure class reported by a collaborator (CRM or email service).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionErrorKind {
    Auth,
    NotFound,
    RateLimit,
    Transport,
    InvalidInput,
}

impl ExecutionErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::NotFound => "not_found",
            Self::RateLimit => "rate_limit",
            Self::Transport => "transport",
            Self::InvalidInput => "invalid_input",
        }
    }
}

/// Wraps any collaborator-reported failure, preserving the collaborator's
/// own error kind for the caller's retry decisions. The dispatcher never
/// retries on its own.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{} failure: {message}", kind.as_str())]
pub struct ExecutionError {
    pub kind: ExecutionErrorKind,
    pub message: String,
}

impl ExecutionError {
    pub fn new(kind: ExecutionErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ExecutionErrorKind::Auth, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ExecutionErrorKind::NotFound, message)
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(ExecutionErrorKind::RateLimit, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ExecutionErrorKind::Transport, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ExecutionErrorKind::InvalidInput, message)
    }
}
