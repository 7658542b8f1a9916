use std::sync::Arc;

use async_trait::async_trait;
use crmpilot_core::capability::Capability;
use crmpilot_core::errors::ExecutionError;
use crmpilot_core::schema::{ArgumentSchema, ParameterKind, ParameterSpec};
use serde_json::{json, Map, Value};

use crate::client::EmailApi;

/// Sends one email through the configured account. All three parameters
/// are required; the resolver is told never to invent a recipient or a
/// body, so anything missing fails validation before reaching here.
pub struct SendEmail {
    email: Arc<dyn EmailApi>,
}

impl SendEmail {
    pub fn new(email: Arc<dyn EmailApi>) -> Self {
        Self { email }
    }
}

#[async_trait]
impl Capability for SendEmail {
    fn name(&self) -> &'static str {
        "send_email"
    }

    fn description(&self) -> &'static str {
        "Send an email to a recipient"
    }

    fn schema(&self) -> ArgumentSchema {
        ArgumentSchema::new(vec![
            ParameterSpec::required("to", "recipient email address", ParameterKind::Text),
            ParameterSpec::required("subject", "subject line", ParameterKind::Text),
            ParameterSpec::required("body", "plain-text message body", ParameterKind::Text),
        ])
    }

    async fn execute(&self, arguments: Map<String, Value>) -> Result<Value, ExecutionError> {
        let field = |name: &str| {
            arguments
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| ExecutionError::invalid_input(format!("{name} is required")))
        };
        let to = field("to")?;
        let subject = field("subject")?;
        let body = field("body")?;

        let sent = self.email.send_email(&to, &subject, &body).await?;
        Ok(json!({
            "message_id": sent.id,
            "thread_id": sent.thread_id,
            "to": to,
        }))
    }
}
