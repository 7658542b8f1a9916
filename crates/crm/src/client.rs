use async_trait::async_trait;
use crmpilot_core::config::CrmConfig;
use crmpilot_core::errors::ExecutionError;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::info;

/// CRM backend seam. One method per remote operation the capabilities
/// need; implementations map their own transport failures into
/// `CrmError` so the capability layer stays HTTP-free.
#[async_trait]
pub trait CrmApi: Send + Sync {
    async fn create_contact(&self, properties: Map<String, Value>)
        -> Result<CrmRecord, CrmError>;
    async fn update_contact(
        &self,
        email: &str,
        properties: Map<String, Value>,
    ) -> Result<CrmRecord, CrmError>;
    async fn create_deal(&self, properties: Map<String, Value>) -> Result<CrmRecord, CrmError>;
    async fn update_deal(
        &self,
        deal_name: &str,
        properties: Map<String, Value>,
    ) -> Result<CrmRecord, CrmError>;
}

/// A created or updated CRM object as the remote side reports it.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CrmRecord {
    pub id: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Error)]
pub enum CrmError {
    #[error("crm rejected the access token; check crm.access_token")]
    Auth,
    #[error("{what} not found in the crm")]
    NotFound { what: String },
    #[error("crm rate limit exceeded; retry later")]
    RateLimited,
    #[error("crm rejected the request: {detail}")]
    InvalidInput { detail: String },
    #[error("crm upstream failure {status}: {detail}")]
    Upstream { status: u16, detail: String },
    #[error("crm request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl From<CrmError> for ExecutionError {
    fn from(error: CrmError) -> Self {
        match &error {
            CrmError::Auth => ExecutionError::auth(error.to_string()),
            CrmError::NotFound { .. } => ExecutionError::not_found(error.to_string()),
            CrmError::RateLimited => ExecutionError::rate_limit(error.to_string()),
            CrmError::InvalidInput { .. } => ExecutionError::invalid_input(error.to_string()),
            CrmError::Upstream { .. } | CrmError::Transport(_) => {
                ExecutionError::transport(error.to_string())
            }
        }
    }
}

/// HubSpot v3 objects API client. Contacts are keyed by email and deals
/// by deal name: updates first search for the single matching object,
/// then PATCH it by id.
pub struct HubSpotClient {
    client: Client,
    base_url: String,
    access_token: SecretString,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    #[serde(rename = "filterGroups")]
    filter_groups: [FilterGroup<'a>; 1],
    limit: u32,
}

#[derive(Debug, Serialize)]
struct FilterGroup<'a> {
    filters: [SearchFilter<'a>; 1],
}

#[derive(Debug, Serialize)]
struct SearchFilter<'a> {
    #[serde(rename = "propertyName")]
    property_name: &'a str,
    operator: &'static str,
    value: &'a str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<CrmRecord>,
}

impl HubSpotClient {
    pub fn new(client: Client, config: &CrmConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
        }
    }

    fn object_url(&self, object: &str) -> String {
        format!("{}/crm/v3/objects/{object}", self.base_url)
    }

    async fn create(&self, object: &str, properties: Map<String, Value>) -> Result<CrmRecord, CrmError> {
        let response = self
            .client
            .post(self.object_url(object))
            .bearer_auth(self.access_token.expose_secret())
            .json(&serde_json::json!({ "properties": properties }))
            .send()
            .await?;
        let record: CrmRecord = Self::decode(response).await?;
        info!(event_name = "crm.object_created", object, id = %record.id, "created crm object");
        Ok(record)
    }

    async fn patch(
        &self,
        object: &str,
        id: &str,
        properties: Map<String, Value>,
    ) -> Result<CrmRecord, CrmError> {
        let response = self
            .client
            .patch(format!("{}/{id}", self.object_url(object)))
            .bearer_auth(self.access_token.expose_secret())
            .json(&serde_json::json!({ "properties": properties }))
            .send()
            .await?;
        let record: CrmRecord = Self::decode(response).await?;
        info!(event_name = "crm.object_updated", object, id = %record.id, "updated crm object");
        Ok(record)
    }

    /// Finds the single object whose `property` equals `value`. An empty
    /// result set is a `NotFound` for the caller's description of the
    /// thing being looked up.
    async fn find_one(
        &self,
        object: &str,
        property: &str,
        value: &str,
        what: &str,
    ) -> Result<CrmRecord, CrmError> {
        let body = SearchRequest {
            filter_groups: [FilterGroup {
                filters: [SearchFilter { property_name: property, operator: "EQ", value }],
            }],
            limit: 1,
        };
        let response = self
            .client
            .post(format!("{}/search", self.object_url(object)))
            .bearer_auth(self.access_token.expose_secret())
            .json(&body)
            .send()
            .await?;
        let parsed: SearchResponse = Self::decode(response).await?;
        parsed
            .results
            .into_iter()
            .next()
            .ok_or_else(|| CrmError::NotFound { what: format!("{what} `{value}`") })
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, CrmError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let detail = response.text().await.unwrap_or_default();
        Err(map_status(status, detail))
    }
}

fn map_status(status: StatusCode, detail: String) -> CrmError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => CrmError::Auth,
        StatusCode::TOO_MANY_REQUESTS => CrmError::RateLimited,
        StatusCode::NOT_FOUND => CrmError::NotFound { what: "requested object".to_string() },
        status if status.is_client_error() => CrmError::InvalidInput {
            detail: if detail.is_empty() { status.to_string() } else { detail },
        },
        // 5xx and anything else unexpected is the remote side's problem,
        // not the request's; callers may retry
        status => CrmError::Upstream { status: status.as_u16(), detail },
    }
}

#[async_trait]
impl CrmApi for HubSpotClient {
    async fn create_contact(
        &self,
        properties: Map<String, Value>,
    ) -> Result<CrmRecord, CrmError> {
        self.create("contacts", properties).await
    }

    async fn update_contact(
        &self,
        email: &str,
        properties: Map<String, Value>,
    ) -> Result<CrmRecord, CrmError> {
        let existing = self.find_one("contacts", "email", email, "contact").await?;
        self.patch("contacts", &existing.id, properties).await
    }

    async fn create_deal(&self, properties: Map<String, Value>) -> Result<CrmRecord, CrmError> {
        self.create("deals", properties).await
    }

    async fn update_deal(
        &self,
        deal_name: &str,
        properties: Map<String, Value>,
    ) -> Result<CrmRecord, CrmError> {
        let existing = self.find_one("deals", "dealname", deal_name, "deal").await?;
        self.patch("deals", &existing.id, properties).await
    }
}

#[cfg(test)]
mod tests {
    use crmpilot_core::errors::ExecutionErrorKind;
    use reqwest::StatusCode;

    use super::{map_status, CrmError};
    use crmpilot_core::errors::ExecutionError;

    #[test]
    fn auth_statuses_map_to_auth_errors() {
        assert!(matches!(map_status(StatusCode::UNAUTHORIZED, String::new()), CrmError::Auth));
        assert!(matches!(map_status(StatusCode::FORBIDDEN, String::new()), CrmError::Auth));
    }

    #[test]
    fn rate_limit_status_maps_to_rate_limited() {
        assert!(matches!(
            map_status(StatusCode::TOO_MANY_REQUESTS, String::new()),
            CrmError::RateLimited
        ));
    }

    #[test]
    fn other_client_errors_keep_the_response_detail() {
        let error = map_status(
            StatusCode::BAD_REQUEST,
            r#"{"message":"Property values were not valid"}"#.to_string(),
        );
        let CrmError::InvalidInput { detail } = error else {
            panic!("expected InvalidInput");
        };
        assert!(detail.contains("Property values were not valid"));
    }

    #[test]
    fn server_errors_map_to_the_retryable_transport_kind() {
        let error = map_status(StatusCode::BAD_GATEWAY, "upstream timeout".to_string());
        let CrmError::Upstream { status, ref detail } = error else {
            panic!("expected Upstream");
        };
        assert_eq!(status, 502);
        assert_eq!(detail, "upstream timeout");

        let converted: ExecutionError = error.into();
        assert_eq!(converted.kind, ExecutionErrorKind::Transport);
    }

    #[test]
    fn crm_errors_convert_to_collaborator_error_kinds() {
        let auth: ExecutionError = CrmError::Auth.into();
        assert_eq!(auth.kind, ExecutionErrorKind::Auth);

        let missing: ExecutionError =
            CrmError::NotFound { what: "contact `x@example.com`".to_string() }.into();
        assert_eq!(missing.kind, ExecutionErrorKind::NotFound);
        assert!(missing.message.contains("x@example.com"));

        let limited: ExecutionError = CrmError::RateLimited.into();
        assert_eq!(limited.kind, ExecutionErrorKind::RateLimit);
    }
}
