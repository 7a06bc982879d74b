use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AiError;
use crate::models::Doctor;

/// A doctor eligible for assignment, normalized at the store boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: Uuid,
    pub full_name: String,
    pub specialization: Option<String>,
    pub is_online: bool,
}

impl Candidate {
    /// Lowercased specialization, empty when unknown.
    pub fn specialization_lower(&self) -> String {
        self.specialization
            .as_deref()
            .unwrap_or_default()
            .to_lowercase()
    }
}

impl From<Doctor> for Candidate {
    fn from(d: Doctor) -> Self {
        Self {
            id: d.id,
            full_name: d.full_name,
            specialization: d.specialization,
            is_online: d.is_online,
        }
    }
}

/// Which path produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    Ai,
    Fallback,
}

impl DecisionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ai => "ai",
            Self::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub doctor_id: Uuid,
    pub reasoning: String,
    pub source: DecisionSource,
}

/// Record stored on the emergency next to the assigned doctor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingJustification {
    pub assigned_by: DecisionSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub reasoning: String,
    pub timestamp: DateTime<Utc>,
}

impl RoutingJustification {
    pub fn for_decision(decision: &RoutingDecision, model: Option<&str>) -> Self {
        Self {
            assigned_by: decision.source,
            model: match decision.source {
                DecisionSource::Ai => model.map(str::to_string),
                DecisionSource::Fallback => None,
            },
            reasoning: decision.reasoning.clone(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RoutingOutcome {
    Assigned(RoutingDecision),
    /// The emergency already had a doctor; nothing was written.
    AlreadyAssigned { doctor_id: Uuid },
}

impl RoutingOutcome {
    pub fn doctor_id(&self) -> Uuid {
        match self {
            Self::Assigned(decision) => decision.doctor_id,
            Self::AlreadyAssigned { doctor_id } => *doctor_id,
        }
    }
}

/// Raw suggestion parsed out of model output, not yet checked against
/// the candidate pool.
#[derive(Debug, Clone, PartialEq)]
pub struct AiSuggestion {
    pub selected_doctor_id: String,
    pub reasoning: String,
}

/// Generative model client abstraction (allows mocking)
pub trait LlmClient: Send + Sync {
    /// Send one prompt, return the raw text answer.
    fn generate(&self, prompt: &str) -> Result<String, AiError>;

    /// Model identifier recorded in routing justifications.
    fn model_name(&self) -> &str;
}
