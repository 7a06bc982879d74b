use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{EmergencyStatus, TriageLevel};

/// A patient incident requiring care.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Emergency {
    pub id: Uuid,
    pub ambulance_id: Option<Uuid>,
    pub nurse_id: Option<Uuid>,
    pub patient_name: Option<String>,
    pub patient_age: Option<i64>,
    pub gender: Option<String>,
    pub symptoms: Option<String>,
    /// Full triage report as produced upstream. Only the fields of
    /// `routing::TriageSummary` are ever read back.
    pub ai_summary: Option<serde_json::Value>,
    /// Specialty explicitly requested for this case.
    pub doctor_specialty: Option<String>,
    pub triage_level: TriageLevel,
    pub status: EmergencyStatus,
    pub doctor_id: Option<Uuid>,
    pub ai_routing_agent_output: Option<serde_json::Value>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Fields supplied when intake creates a new emergency.
#[derive(Debug, Clone)]
pub struct NewEmergency {
    pub ambulance_id: Option<Uuid>,
    pub nurse_id: Option<Uuid>,
    pub patient_name: Option<String>,
    pub patient_age: Option<i64>,
    pub gender: Option<String>,
    pub symptoms: Option<String>,
    pub ai_summary: Option<serde_json::Value>,
    pub doctor_specialty: Option<String>,
    pub triage_level: TriageLevel,
}
