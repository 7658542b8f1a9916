//! Startup wiring: builds the shared HTTP client, the collaborator
//! clients, the capability registry, and the dispatcher from a loaded
//! config. Credentials are consumed here once; nothing downstream reads
//! the environment.

use std::sync::Arc;

use anyhow::{Context, Result};
use crmpilot_agent::{Dispatcher, HttpLlmClient, IntentResolver};
use crmpilot_core::config::AppConfig;
use crmpilot_core::registry::CapabilityRegistry;
use crmpilot_crm::{CreateContact, CreateDeal, HubSpotClient, UpdateContact, UpdateDeal};
use crmpilot_email::{GmailClient, SendEmail};

pub fn init_logging(config: &AppConfig) {
    use crmpilot_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

pub fn build_dispatcher(config: &AppConfig) -> Result<Dispatcher> {
    let registry = build_registry(config)?;

    let llm = HttpLlmClient::from_config(&config.llm)
        .context("failed to build the language model client")?;
    let resolver = IntentResolver::new(Arc::new(llm));

    Ok(Dispatcher::new(registry, resolver))
}

pub fn build_registry(config: &AppConfig) -> Result<CapabilityRegistry> {
    let http = reqwest::Client::new();
    let crm: Arc<dyn crmpilot_crm::CrmApi> =
        Arc::new(HubSpotClient::new(http.clone(), &config.crm));
    let email: Arc<dyn crmpilot_email::EmailApi> =
        Arc::new(GmailClient::new(http, &config.email));

    let mut registry = CapabilityRegistry::new();
    registry.register(CreateContact::new(Arc::clone(&crm)))?;
    registry.register(UpdateContact::new(Arc::clone(&crm)))?;
    registry.register(CreateDeal::new(Arc::clone(&crm)))?;
    registry.register(UpdateDeal::new(crm))?;
    registry.register(SendEmail::new(email))?;

    Ok(registry)
}
