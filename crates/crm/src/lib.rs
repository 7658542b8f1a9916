//! HubSpot integration: a thin typed client over the v3 objects API and
//! the four CRM capabilities built on top of it.
//!
//! The client owns authentication and HTTP status mapping; the
//! capabilities own argument schemas and payload shaping. Capabilities
//! talk to the client only through the `CrmApi` trait so tests can swap
//! in a scripted fake.

pub mod capabilities;
pub mod client;

pub use capabilities::{CreateContact, CreateDeal, UpdateContact, UpdateDeal};
pub use client::{CrmApi, CrmError, CrmRecord, HubSpotClient};
