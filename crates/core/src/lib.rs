//! Core capability model for the crmpilot dispatcher.
//!
//! This crate defines the vocabulary the rest of the workspace speaks:
//!
//! - `Capability` - one named, schema-typed operation (a CRM write or an
//!   email send) backed by an injected collaborator client
//! - `CapabilityRegistry` - the read-only set of capabilities built once
//!   at startup, keyed by name, described to the language model
//! - `ArgumentSchema` - per-capability parameter declarations with
//!   coercion and validation
//! - `ResultEnvelope` - the uniform success/failure response every
//!   dispatched request produces
//! - `AppConfig` - file/env/override configuration for the collaborators
//!
//! The dispatcher itself lives in `crmpilot-agent`; collaborator clients
//! live in `crmpilot-crm` and `crmpilot-email`. Nothing in this crate
//! performs I/O besides config-file reading.

pub mod capability;
pub mod config;
pub mod envelope;
pub mod errors;
pub mod registry;
pub mod schema;

pub use capability::{Capability, CapabilityDescription};
pub use envelope::{DispatchStatus, ResultEnvelope};
pub use errors::{ArgumentError, ExecutionError, ExecutionErrorKind, RegistryError};
pub use registry::CapabilityRegistry;
pub use schema::{ArgumentSchema, ParameterKind, ParameterSpec};
