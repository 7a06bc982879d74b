use serde::Serialize;
use serde_json::Value;

use super::summary::TriageSummary;
use super::types::Candidate;
use crate::models::Emergency;

pub const ROUTING_RULES: &str = r#"
Assignment Rules:
1. Specialty match: prefer doctors whose specialization fits the symptoms or
   the requested doctor_specialty.
   - Chest pain / cardiac -> Cardiology
   - Trauma / fracture -> Orthopedics or Trauma Surgery
   - Stroke / seizure -> Neurology
   - Breathing problems -> Pulmonology
   - General / unknown -> General Physician or Emergency Medicine
2. Availability: prefer doctors who are online (is_online: true).
3. Severity: for critical or high triage levels, prefer Emergency Medicine or
   the most relevant senior specialist.
4. Fallback: with no direct match, choose Emergency Medicine or a General
   Physician.
5. selected_doctor_id MUST be one of the ids listed under Available Doctors.
"#;

pub const OUTPUT_FORMAT: &str = r#"
Output Format:
Return ONLY a JSON object, no markdown fences:
{
  "selected_doctor_id": "id of the selected doctor",
  "reasoning": "one or two sentences on why this doctor was chosen"
}
"#;

#[derive(Serialize)]
struct EmergencyPayload<'a> {
    patient_age: Option<i64>,
    gender: Option<&'a str>,
    symptoms: Option<&'a str>,
    triage_level: &'a str,
    summary: Option<&'a str>,
    severity: Option<&'a str>,
    doctor_specialty: Option<&'a str>,
}

/// Build the routing prompt. Patient name and ids of the ambulance and
/// nurse are left out; the model only sees what routing needs.
pub fn build_routing_prompt(
    emergency: &Emergency,
    summary: &TriageSummary,
    candidates: &[Candidate],
) -> String {
    let payload = EmergencyPayload {
        patient_age: emergency.patient_age,
        gender: emergency.gender.as_deref(),
        symptoms: emergency
            .symptoms
            .as_deref()
            .or(summary.symptoms.as_deref()),
        triage_level: emergency.triage_level.as_str(),
        summary: summary.summary.as_deref(),
        severity: summary.severity.as_deref(),
        doctor_specialty: emergency.doctor_specialty.as_deref(),
    };

    let emergency_json = to_pretty(&payload);
    let doctors_json = to_pretty(candidates);

    format!(
        r#"You are an expert hospital resource manager. Assign the most appropriate doctor to this emergency case.

Emergency Case:
{emergency_json}

Available Doctors:
{doctors_json}
{ROUTING_RULES}{OUTPUT_FORMAT}"#
    )
}

fn to_pretty<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| Value::Null.to_string())
}
