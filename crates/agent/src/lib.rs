//! Intent resolution and dispatch - the decision layer between free text
//! and structured collaborator calls.
//!
//! The flow per request:
//! 1. **Prompting** (`prompt`) - serialize the capability catalog into a
//!    system prompt with strict JSON output instructions
//! 2. **Resolution** (`resolver`) - ask the `LlmClient` for a structured
//!    suggestion and parse it strictly, never coercing a malformed reply
//! 3. **Dispatch** (`dispatcher`) - validate the suggestion against the
//!    registry and the capability's schema, invoke the single matched
//!    executor, and fold every outcome into one `ResultEnvelope`
//!
//! # Safety principle
//!
//! The model is strictly a translator. It never executes anything and its
//! output is never trusted: the dispatcher's schema validation, not the
//! model, is the source of correctness guarantees.

pub mod dispatcher;
pub mod llm;
pub mod prompt;
pub mod resolver;

pub use dispatcher::Dispatcher;
pub use llm::{HttpLlmClient, LlmClient, LlmError};
pub use resolver::{IntentResolver, IntentSuggestion, ResolveError};
