//! Doctor routing: picks the doctor for an incoming emergency.
//!
//! One pass per emergency:
//! 1. Optional AI suggestion (`LlmClient`), attempted at most once
//! 2. Deterministic lexicon scoring when the suggestion is absent or invalid
//! 3. Conditional write through `RecordStore`

pub mod gemini;
pub mod lexicon;
pub mod parser;
pub mod prompt;
pub mod router;
pub mod scorer;
pub mod store;
pub mod summary;
pub mod types;

pub use gemini::*;
pub use lexicon::*;
pub use parser::*;
pub use prompt::*;
pub use router::*;
pub use scorer::*;
pub use store::*;
pub use summary::*;
pub use types::*;

use thiserror::Error;
use uuid::Uuid;

use crate::db::DatabaseError;

/// Terminal routing failures reported to the caller.
#[derive(Error, Debug)]
pub enum RoutingError {
    #[error("Emergency not found: {0}")]
    EmergencyNotFound(Uuid),

    #[error("No active doctors available for assignment")]
    NoCandidates,

    #[error("Record store error: {0}")]
    Store(#[from] DatabaseError),
}

/// Suggestion-service failures. Always recovered inside the router.
#[derive(Error, Debug)]
pub enum AiError {
    #[error("Gemini API key is not configured")]
    MissingApiKey,

    #[error("Gemini is not reachable at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Gemini returned error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Gemini returned no candidate text")]
    EmptyResponse,

    #[error("Malformed routing suggestion: {0}")]
    MalformedSuggestion(String),

    #[error("Suggested doctor is not an active candidate: {0}")]
    UnknownCandidate(String),
}

#[derive(Error, Debug)]
pub enum LexiconError {
    #[error("Cannot read lexicon file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Lexicon JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported lexicon version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("Invalid lexicon rule: {0}")]
    InvalidRule(String),
}
