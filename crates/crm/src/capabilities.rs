use std::sync::Arc;

use async_trait::async_trait;
use crmpilot_core::capability::Capability;
use crmpilot_core::errors::ExecutionError;
use crmpilot_core::schema::{ArgumentSchema, ParameterKind, ParameterSpec};
use serde_json::{json, Map, Value};

use crate::client::{CrmApi, CrmRecord};

/// HubSpot's default pipeline stages. Matched case-insensitively at the
/// schema layer; the canonical lowercase ids are what the API accepts.
const DEAL_STAGES: &[&str] = &[
    "appointmentscheduled",
    "qualifiedtobuy",
    "presentationscheduled",
    "decisionmakerboughtin",
    "contractsent",
    "closedwon",
    "closedlost",
];

fn string_argument(arguments: &Map<String, Value>, name: &str) -> Option<String> {
    arguments.get(name).and_then(Value::as_str).map(str::to_string)
}

/// Copies a validated argument into a HubSpot property map under the
/// API's property name. Numbers become strings; HubSpot stores amounts
/// that way.
fn map_property(
    arguments: &Map<String, Value>,
    argument: &str,
    property: &str,
    properties: &mut Map<String, Value>,
) {
    match arguments.get(argument) {
        Some(Value::String(text)) => {
            properties.insert(property.to_string(), json!(text));
        }
        Some(Value::Number(number)) => {
            properties.insert(property.to_string(), json!(number.to_string()));
        }
        _ => {}
    }
}

fn record_payload(object: &'static str, record: CrmRecord) -> Value {
    json!({
        "object": object,
        "id": record.id,
        "properties": record.properties,
    })
}

/// Creates a new HubSpot contact keyed by email.
pub struct CreateContact {
    crm: Arc<dyn CrmApi>,
}

impl CreateContact {
    pub fn new(crm: Arc<dyn CrmApi>) -> Self {
        Self { crm }
    }
}

#[async_trait]
impl Capability for CreateContact {
    fn name(&self) -> &'static str {
        "create_contact"
    }

    fn description(&self) -> &'static str {
        "Create a new contact in the CRM"
    }

    fn schema(&self) -> ArgumentSchema {
        ArgumentSchema::new(vec![
            ParameterSpec::required("email", "email address of the contact", ParameterKind::Text),
            ParameterSpec::optional("first_name", "first name of the contact", ParameterKind::Text),
            ParameterSpec::optional("last_name", "last name of the contact", ParameterKind::Text),
        ])
    }

    async fn execute(&self, arguments: Map<String, Value>) -> Result<Value, ExecutionError> {
        let mut properties = Map::new();
        map_property(&arguments, "email", "email", &mut properties);
        map_property(&arguments, "first_name", "firstname", &mut properties);
        map_property(&arguments, "last_name", "lastname", &mut properties);

        let record = self.crm.create_contact(properties).await?;
        Ok(record_payload("contact", record))
    }
}

/// Updates an existing contact, located by its current email address.
pub struct UpdateContact {
    crm: Arc<dyn CrmApi>,
}

impl UpdateContact {
    pub fn new(crm: Arc<dyn CrmApi>) -> Self {
        Self { crm }
    }
}

#[async_trait]
impl Capability for UpdateContact {
    fn name(&self) -> &'static str {
        "update_contact"
    }

    fn description(&self) -> &'static str {
        "Update an existing CRM contact, found by its current email address"
    }

    fn schema(&self) -> ArgumentSchema {
        ArgumentSchema::new(vec![
            ParameterSpec::required(
                "email",
                "current email address identifying the contact",
                ParameterKind::Text,
            ),
            ParameterSpec::optional("new_email", "replacement email address", ParameterKind::Text),
            ParameterSpec::optional("new_first_name", "replacement first name", ParameterKind::Text),
            ParameterSpec::optional("new_last_name", "replacement last name", ParameterKind::Text),
        ])
    }

    async fn execute(&self, arguments: Map<String, Value>) -> Result<Value, ExecutionError> {
        let email = string_argument(&arguments, "email")
            .ok_or_else(|| ExecutionError::invalid_input("contact email is required"))?;

        let mut properties = Map::new();
        map_property(&arguments, "new_email", "email", &mut properties);
        map_property(&arguments, "new_first_name", "firstname", &mut properties);
        map_property(&arguments, "new_last_name", "lastname", &mut properties);
        if properties.is_empty() {
            return Err(ExecutionError::invalid_input(
                "nothing to update; provide new_email, new_first_name, or new_last_name",
            ));
        }

        let record = self.crm.update_contact(&email, properties).await?;
        Ok(record_payload("contact", record))
    }
}

/// Creates a new HubSpot deal. The pipeline stage defaults to the first
/// stage when the user does not name one.
pub struct CreateDeal {
    crm: Arc<dyn CrmApi>,
}

impl CreateDeal {
    pub fn new(crm: Arc<dyn CrmApi>) -> Self {
        Self { crm }
    }
}

#[async_trait]
impl Capability for CreateDeal {
    fn name(&self) -> &'static str {
        "create_deal"
    }

    fn description(&self) -> &'static str {
        "Create a new deal in the CRM"
    }

    fn schema(&self) -> ArgumentSchema {
        ArgumentSchema::new(vec![
            ParameterSpec::required("deal_name", "name of the deal", ParameterKind::Text),
            ParameterSpec::optional("amount", "deal amount", ParameterKind::Number),
            ParameterSpec::optional("stage", "pipeline stage", ParameterKind::Enum(DEAL_STAGES))
                .with_default(json!("appointmentscheduled")),
        ])
    }

    async fn execute(&self, arguments: Map<String, Value>) -> Result<Value, ExecutionError> {
        let mut properties = Map::new();
        map_property(&arguments, "deal_name", "dealname", &mut properties);
        map_property(&arguments, "amount", "amount", &mut properties);
        map_property(&arguments, "stage", "dealstage", &mut properties);

        let record = self.crm.create_deal(properties).await?;
        Ok(record_payload("deal", record))
    }
}

/// Updates an existing deal, located by its deal name.
pub struct UpdateDeal {
    crm: Arc<dyn CrmApi>,
}

impl UpdateDeal {
    pub fn new(crm: Arc<dyn CrmApi>) -> Self {
        Self { crm }
    }
}

#[async_trait]
impl Capability for UpdateDeal {
    fn name(&self) -> &'static str {
        "update_deal"
    }

    fn description(&self) -> &'static str {
        "Update an existing CRM deal, found by its deal name"
    }

    fn schema(&self) -> ArgumentSchema {
        ArgumentSchema::new(vec![
            ParameterSpec::required(
                "deal_name",
                "name identifying the deal",
                ParameterKind::Text,
            ),
            ParameterSpec::optional("amount", "new deal amount", ParameterKind::Number),
            ParameterSpec::optional(
                "stage",
                "new pipeline stage",
                ParameterKind::Enum(DEAL_STAGES),
            ),
        ])
    }

    async fn execute(&self, arguments: Map<String, Value>) -> Result<Value, ExecutionError> {
        let deal_name = string_argument(&arguments, "deal_name")
            .ok_or_else(|| ExecutionError::invalid_input("deal name is required"))?;

        let mut properties = Map::new();
        map_property(&arguments, "amount", "amount", &mut properties);
        map_property(&arguments, "stage", "dealstage", &mut properties);
        if properties.is_empty() {
            return Err(ExecutionError::invalid_input(
                "nothing to update; provide amount or stage",
            ));
        }

        let record = self.crm.update_deal(&deal_name, properties).await?;
        Ok(record_payload("deal", record))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use crmpilot_core::capability::Capability;
    use crmpilot_core::errors::ExecutionErrorKind;
    use serde_json::{json, Map, Value};

    use super::{CreateContact, CreateDeal, UpdateContact, UpdateDeal};
    use crate::client::{CrmApi, CrmError, CrmRecord};

    #[derive(Default)]
    struct FakeCrm {
        creates: Mutex<Vec<(&'static str, Map<String, Value>)>>,
        updates: Mutex<Vec<(&'static str, String, Map<String, Value>)>>,
        update_calls: AtomicUsize,
        missing_deal: Option<String>,
    }

    impl FakeCrm {
        fn record(&self, id: &str) -> CrmRecord {
            CrmRecord { id: id.to_string(), properties: Map::new() }
        }
    }

    #[async_trait]
    impl CrmApi for FakeCrm {
        async fn create_contact(
            &self,
            properties: Map<String, Value>,
        ) -> Result<CrmRecord, CrmError> {
            self.creates.lock().unwrap().push(("contacts", properties));
            Ok(self.record("201"))
        }

        async fn update_contact(
            &self,
            email: &str,
            properties: Map<String, Value>,
        ) -> Result<CrmRecord, CrmError> {
            self.update_calls.fetch_add(1, Ordering::SeqCst);
            self.updates.lock().unwrap().push(("contacts", email.to_string(), properties));
            Ok(self.record("201"))
        }

        async fn create_deal(
            &self,
            properties: Map<String, Value>,
        ) -> Result<CrmRecord, CrmError> {
            self.creates.lock().unwrap().push(("deals", properties));
            Ok(self.record("301"))
        }

        async fn update_deal(
            &self,
            deal_name: &str,
            properties: Map<String, Value>,
        ) -> Result<CrmRecord, CrmError> {
            self.update_calls.fetch_add(1, Ordering::SeqCst);
            if self.missing_deal.as_deref() == Some(deal_name) {
                return Err(CrmError::NotFound { what: format!("deal `{deal_name}`") });
            }
            self.updates.lock().unwrap().push(("deals", deal_name.to_string(), properties));
            Ok(self.record("301"))
        }
    }

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn create_contact_maps_arguments_onto_hubspot_property_names() {
        let crm = Arc::new(FakeCrm::default());
        let capability = CreateContact::new(Arc::clone(&crm) as _);

        let typed = capability
            .schema()
            .validate(&args(json!({
                "email": "john@example.com",
                "first_name": "John",
                "last_name": "Doe"
            })))
            .expect("arguments are valid");
        let payload = capability.execute(typed).await.expect("create succeeds");

        assert_eq!(payload["object"], json!("contact"));
        let creates = crm.creates.lock().unwrap();
        assert_eq!(creates.len(), 1);
        let (object, properties) = &creates[0];
        assert_eq!(*object, "contacts");
        assert_eq!(properties.get("email"), Some(&json!("john@example.com")));
        assert_eq!(properties.get("firstname"), Some(&json!("John")));
        assert_eq!(properties.get("lastname"), Some(&json!("Doe")));
    }

    #[tokio::test]
    async fn update_contact_without_new_fields_fails_before_any_remote_call() {
        let crm = Arc::new(FakeCrm::default());
        let capability = UpdateContact::new(Arc::clone(&crm) as _);

        let typed = capability
            .schema()
            .validate(&args(json!({"email": "john@example.com"})))
            .expect("email alone passes the schema");
        let error = capability.execute(typed).await.expect_err("nothing to update");

        assert_eq!(error.kind, ExecutionErrorKind::InvalidInput);
        assert_eq!(crm.update_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn create_deal_defaults_the_stage_and_stringifies_the_amount() {
        let crm = Arc::new(FakeCrm::default());
        let capability = CreateDeal::new(Arc::clone(&crm) as _);

        let typed = capability
            .schema()
            .validate(&args(json!({"deal_name": "Acme expansion", "amount": 5000})))
            .expect("arguments are valid");
        capability.execute(typed).await.expect("create succeeds");

        let creates = crm.creates.lock().unwrap();
        let (_, properties) = &creates[0];
        assert_eq!(properties.get("dealname"), Some(&json!("Acme expansion")));
        assert_eq!(properties.get("amount"), Some(&json!("5000")));
        assert_eq!(properties.get("dealstage"), Some(&json!("appointmentscheduled")));
    }

    #[tokio::test]
    async fn update_deal_repeats_produce_the_same_remote_write() {
        let crm = Arc::new(FakeCrm::default());
        let capability = UpdateDeal::new(Arc::clone(&crm) as _);

        for _ in 0..2 {
            let typed = capability
                .schema()
                .validate(&args(json!({"deal_name": "Acme", "stage": "ClosedWon"})))
                .expect("arguments are valid");
            capability.execute(typed).await.expect("update succeeds");
        }

        let updates = crm.updates.lock().unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0], updates[1]);
        assert_eq!(updates[0].2.get("dealstage"), Some(&json!("closedwon")));
    }

    #[tokio::test]
    async fn update_deal_surfaces_a_missing_deal_as_not_found() {
        let crm = Arc::new(FakeCrm {
            missing_deal: Some("Ghost".to_string()),
            ..FakeCrm::default()
        });
        let capability = UpdateDeal::new(Arc::clone(&crm) as _);

        let typed = capability
            .schema()
            .validate(&args(json!({"deal_name": "Ghost", "amount": 100})))
            .expect("arguments are valid");
        let error = capability.execute(typed).await.expect_err("deal does not exist");

        assert_eq!(error.kind, ExecutionErrorKind::NotFound);
        assert!(error.message.contains("Ghost"));
    }
}
