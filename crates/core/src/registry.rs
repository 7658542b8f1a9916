use std::collections::HashMap;
use std::sync::Arc;

use crate::capability::{Capability, CapabilityDescription};
use crate::errors::RegistryError;

/// Holds the set of available capabilities, keyed by unique name.
///
/// Built once at startup and read-only during request handling; there is
/// no dynamic registration mid-request and no locking, since requests are
/// processed one at a time.
#[derive(Default)]
pub struct CapabilityRegistry {
    ordered: Vec<Arc<dyn Capability>>,
    by_name: HashMap<&'static str, usize>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a capability. Duplicate names are a startup defect: the
    /// registry keeps the first registration and reports the clash so the
    /// process can fail fast.
    pub fn register<C>(&mut self, capability: C) -> Result<(), RegistryError>
    where
        C: Capability + 'static,
    {
        let name = capability.name();
        if self.by_name.contains_key(name) {
            return Err(RegistryError::DuplicateCapability(name.to_string()));
        }

        self.by_name.insert(name, self.ordered.len());
        self.ordered.push(Arc::new(capability));
        Ok(())
    }

    /// Capability descriptions in registration order, for prompt building.
    pub fn describe_all(&self) -> impl Iterator<Item = CapabilityDescription> + '_ {
        self.ordered.iter().map(|capability| CapabilityDescription::of(capability.as_ref()))
    }

    pub fn lookup(&self, name: &str) -> Result<&Arc<dyn Capability>, RegistryError> {
        self.by_name
            .get(name)
            .map(|index| &self.ordered[*index])
            .ok_or_else(|| RegistryError::CapabilityNotFound(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::{json, Map, Value};

    use super::CapabilityRegistry;
    use crate::capability::Capability;
    use crate::errors::{ExecutionError, RegistryError};
    use crate::schema::{ArgumentSchema, ParameterKind, ParameterSpec};

    struct Stub {
        name: &'static str,
        description: &'static str,
    }

    #[async_trait]
    impl Capability for Stub {
        fn name(&self) -> &'static str {
            self.name
        }

        fn description(&self) -> &'static str {
            self.description
        }

        fn schema(&self) -> ArgumentSchema {
            ArgumentSchema::new(vec![ParameterSpec::required(
                "email",
                "contact email",
                ParameterKind::Text,
            )])
        }

        async fn execute(&self, _arguments: Map<String, Value>) -> Result<Value, ExecutionError> {
            Ok(json!({"stub": self.name}))
        }
    }

    #[test]
    fn describe_all_preserves_registration_order_and_count() {
        let mut registry = CapabilityRegistry::new();
        registry.register(Stub { name: "create_contact", description: "adds a contact" }).unwrap();
        registry.register(Stub { name: "send_email", description: "sends an email" }).unwrap();
        registry.register(Stub { name: "create_deal", description: "opens a deal" }).unwrap();

        let names: Vec<_> = registry.describe_all().map(|description| description.name).collect();
        assert_eq!(names, vec!["create_contact", "send_email", "create_deal"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn duplicate_registration_fails_and_keeps_the_first() {
        let mut registry = CapabilityRegistry::new();
        registry.register(Stub { name: "send_email", description: "first" }).unwrap();

        let error = registry
            .register(Stub { name: "send_email", description: "second" })
            .expect_err("duplicate name must be rejected");
        assert_eq!(error, RegistryError::DuplicateCapability("send_email".to_string()));

        assert_eq!(registry.len(), 1);
        let kept = registry.lookup("send_email").expect("first registration survives");
        assert_eq!(kept.description(), "first");
    }

    #[test]
    fn lookup_of_unknown_name_reports_capability_not_found() {
        let registry = CapabilityRegistry::new();
        let error = registry.lookup("update_deal").expect_err("empty registry has no entries");
        assert_eq!(error, RegistryError::CapabilityNotFound("update_deal".to_string()));
    }
}
