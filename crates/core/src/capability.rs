use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::ExecutionError;
use crate::schema::ArgumentSchema;

/// One registered operation: a name the model can pick, a description used
/// for prompting, an argument schema, and an executor that delegates to an
/// external collaborator. Implementations own their collaborator client
/// (injected at construction) and are immutable after registration.
///
/// `execute` is only ever called with arguments that already passed
/// `schema().validate`; executors may rely on required parameters being
/// present and typed.
#[async_trait]
pub trait Capability: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn schema(&self) -> ArgumentSchema;
    async fn execute(&self, arguments: Map<String, Value>) -> Result<Value, ExecutionError>;
}

impl std::fmt::Debug for dyn Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capability").field("name", &self.name()).finish_non_exhaustive()
    }
}

/// Serialized view of a capability, consumed by the prompt builder.
#[derive(Clone, Debug, Serialize)]
pub struct CapabilityDescription {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: ArgumentSchema,
}

impl CapabilityDescription {
    pub fn of(capability: &dyn Capability) -> Self {
        Self {
            name: capability.name(),
            description: capability.description(),
            parameters: capability.schema(),
        }
    }
}
