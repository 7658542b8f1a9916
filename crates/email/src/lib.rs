//! Gmail integration: a minimal send-only client over the Gmail REST API
//! and the `send_email` capability built on it.

pub mod capability;
pub mod client;

pub use capability::SendEmail;
pub use client::{EmailApi, EmailError, GmailClient, SentMessage};
