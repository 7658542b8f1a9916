use crmpilot_core::envelope::{DispatchStatus, ResultEnvelope};
use crmpilot_core::registry::CapabilityRegistry;
use tracing::{info, warn};
use uuid::Uuid;

use crate::resolver::{IntentResolver, ResolveError};

/// The orchestrator: validates the resolver's suggestion against the
/// registry, coerces arguments against the capability's schema, invokes
/// the single matched executor, and normalizes every outcome into one
/// `ResultEnvelope`. At most one collaborator call happens per request,
/// and none happens if any earlier step fails.
///
/// Requests are handled one at a time; the registry is read-only and the
/// suggestion/invocation data lives only for the request's duration.
pub struct Dispatcher {
    registry: CapabilityRegistry,
    resolver: IntentResolver,
}

impl Dispatcher {
    pub fn new(registry: CapabilityRegistry, resolver: IntentResolver) -> Self {
        Self { registry, resolver }
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    pub async fn dispatch(&self, user_text: &str) -> ResultEnvelope {
        let correlation_id = Uuid::new_v4().simple().to_string();
        let request_text = user_text.trim();

        if request_text.is_empty() {
            warn!(
                event_name = "dispatch.rejected_empty_input",
                correlation_id = %correlation_id,
                "request text is empty"
            );
            return ResultEnvelope::failure(
                DispatchStatus::InvalidRequest,
                "request text is empty; describe the CRM or email action you need",
            );
        }

        info!(
            event_name = "dispatch.received",
            correlation_id = %correlation_id,
            "resolving request against capability catalog"
        );

        let descriptions: Vec<_> = self.registry.describe_all().collect();
        let suggestion = match self.resolver.resolve(request_text, &descriptions).await {
            Ok(suggestion) => suggestion,
            Err(error @ ResolveError::MalformedSuggestion { .. }) => {
                warn!(
                    event_name = "dispatch.malformed_suggestion",
                    correlation_id = %correlation_id,
                    error = %error,
                    "model reply could not be parsed"
                );
                return ResultEnvelope::failure(DispatchStatus::InvalidRequest, error.to_string());
            }
            Err(error @ ResolveError::Llm(_)) => {
                warn!(
                    event_name = "dispatch.resolver_unavailable",
                    correlation_id = %correlation_id,
                    error = %error,
                    "language model call failed"
                );
                return ResultEnvelope::failure(DispatchStatus::InvalidRequest, error.to_string());
            }
        };

        let capability = match self.registry.lookup(&suggestion.capability) {
            Ok(capability) => capability,
            Err(error) => {
                warn!(
                    event_name = "dispatch.capability_not_found",
                    correlation_id = %correlation_id,
                    capability = %suggestion.capability,
                    "suggested capability is not registered"
                );
                return ResultEnvelope::failure(
                    DispatchStatus::CapabilityNotFound,
                    error.to_string(),
                );
            }
        };

        let typed_arguments = match capability.schema().validate(&suggestion.arguments) {
            Ok(typed) => typed,
            Err(error) => {
                warn!(
                    event_name = "dispatch.argument_error",
                    correlation_id = %correlation_id,
                    capability = capability.name(),
                    error = %error,
                    "suggested arguments failed schema validation"
                );
                return ResultEnvelope::failure(DispatchStatus::ArgumentError, error.to_string());
            }
        };

        info!(
            event_name = "dispatch.invoking",
            correlation_id = %correlation_id,
            capability = capability.name(),
            "invoking capability executor"
        );

        match capability.execute(typed_arguments).await {
            Ok(payload) => {
                info!(
                    event_name = "dispatch.completed",
                    correlation_id = %correlation_id,
                    capability = capability.name(),
                    "capability completed"
                );
                ResultEnvelope::ok(format!("capability `{}` completed", capability.name()), payload)
            }
            Err(error) => {
                warn!(
                    event_name = "dispatch.execution_error",
                    correlation_id = %correlation_id,
                    capability = capability.name(),
                    error_kind = error.kind.as_str(),
                    "collaborator reported a failure"
                );
                ResultEnvelope::failure(
                    DispatchStatus::ExecutionError,
                    format!("capability `{}` failed: {error}", capability.name()),
                )
            }
        }
    }
}
