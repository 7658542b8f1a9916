use serde::Serialize;
use serde_json::Value;

/// Outcome category of one dispatched request. Exactly these five exist;
/// every request produces exactly one envelope with one of them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStatus {
    Ok,
    InvalidRequest,
    CapabilityNotFound,
    ArgumentError,
    ExecutionError,
}

impl DispatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::InvalidRequest => "invalid_request",
            Self::CapabilityNotFound => "capability_not_found",
            Self::ArgumentError => "argument_error",
            Self::ExecutionError => "execution_error",
        }
    }
}

/// The uniform response returned to the caller for every request: a status,
/// a human-readable message that names the offending capability or
/// parameter on failure, and the executor's payload on success.
#[derive(Clone, Debug, Serialize)]
pub struct ResultEnvelope {
    pub status: DispatchStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl ResultEnvelope {
    pub fn ok(message: impl Into<String>, payload: Value) -> Self {
        Self { status: DispatchStatus::Ok, message: message.into(), payload: Some(payload) }
    }

    pub fn failure(status: DispatchStatus, message: impl Into<String>) -> Self {
        Self { status, message: message.into(), payload: None }
    }

    pub fn is_ok(&self) -> bool {
        self.status == DispatchStatus::Ok
    }
}
