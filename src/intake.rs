//! Ambulance intake: turns a triage report into a stored emergency.

use rusqlite::Connection;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::db::{self, DatabaseError};
use crate::models::{Ambulance, Emergency, NewEmergency, TriageLevel};
use crate::routing::stamp_schema_version;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Symptoms are required")]
    MissingSymptoms,

    #[error("Severity is required")]
    MissingSeverity,

    #[error("Unknown severity: {0}")]
    InvalidSeverity(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Structured triage report produced on the ambulance side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageReport {
    pub patient_name: Option<String>,
    #[serde(deserialize_with = "lenient_age")]
    pub patient_age: Option<i64>,
    pub gender: Option<String>,
    pub symptoms: Option<String>,
    pub summary: Option<String>,
    pub severity: Option<String>,
    pub suggested_actions: Vec<String>,
    pub doctor_specialty: Option<String>,
}

/// Accepts `54`, `"54"`, `54.0` or null; anything else is treated as unknown.
fn lenient_age<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let age = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    Ok(age.filter(|a| *a >= 0))
}

impl TriageReport {
    /// Check required fields; returns the parsed triage level.
    pub fn validate(&self) -> Result<TriageLevel, IntakeError> {
        if self.symptoms.as_deref().map_or(true, |s| s.trim().is_empty()) {
            return Err(IntakeError::MissingSymptoms);
        }
        let severity = self
            .severity
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or(IntakeError::MissingSeverity)?;
        TriageLevel::parse_lenient(severity)
            .ok_or_else(|| IntakeError::InvalidSeverity(severity.to_string()))
    }
}

/// Store a new emergency for `ambulance`. Routing happens separately.
pub fn record_intake(
    conn: &Connection,
    ambulance: &Ambulance,
    report: &TriageReport,
) -> Result<Emergency, IntakeError> {
    let triage_level = report.validate()?;
    let mut blob = serde_json::to_value(report)
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;
    stamp_schema_version(&mut blob);

    let new = NewEmergency {
        ambulance_id: Some(ambulance.id),
        nurse_id: ambulance.assigned_nurse,
        patient_name: trimmed(report.patient_name.as_deref()),
        patient_age: report.patient_age,
        gender: trimmed(report.gender.as_deref()),
        symptoms: trimmed(report.symptoms.as_deref()),
        ai_summary: Some(blob),
        doctor_specialty: trimmed(report.doctor_specialty.as_deref()),
        triage_level,
    };
    let emergency = db::insert_emergency(conn, &new)?;

    tracing::info!(
        emergency_id = %emergency.id,
        ambulance = %ambulance.ambulance_number,
        triage_level = triage_level.as_str(),
        "Intake recorded"
    );
    Ok(emergency)
}

fn trimmed(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use uuid::Uuid;

    use super::*;
    use crate::db::{get_emergency, insert_ambulance, insert_user, open_memory_database};
    use crate::models::{EmergencyStatus, UserRole, UserStatus};
    use crate::routing::{TriageSummary, SCHEMA_VERSION_KEY, SUMMARY_SCHEMA_VERSION};

    fn report(value: Value) -> TriageReport {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn age_accepts_numbers_and_numeric_strings() {
        assert_eq!(report(json!({"patient_age": 54})).patient_age, Some(54));
        assert_eq!(report(json!({"patient_age": "61 "})).patient_age, Some(61));
        assert_eq!(report(json!({"patient_age": 7.0})).patient_age, Some(7));
        assert_eq!(report(json!({"patient_age": "unknown"})).patient_age, None);
        assert_eq!(report(json!({"patient_age": null})).patient_age, None);
        assert_eq!(report(json!({"patient_age": -3})).patient_age, None);
        assert_eq!(report(json!({})).patient_age, None);
    }

    #[test]
    fn validation_requires_symptoms_and_known_severity() {
        let r = report(json!({"severity": "high"}));
        assert!(matches!(r.validate(), Err(IntakeError::MissingSymptoms)));

        let r = report(json!({"symptoms": "  ", "severity": "high"}));
        assert!(matches!(r.validate(), Err(IntakeError::MissingSymptoms)));

        let r = report(json!({"symptoms": "fever"}));
        assert!(matches!(r.validate(), Err(IntakeError::MissingSeverity)));

        let r = report(json!({"symptoms": "fever", "severity": "purple"}));
        assert!(matches!(r.validate(), Err(IntakeError::InvalidSeverity(s)) if s == "purple"));

        let r = report(json!({"symptoms": "fever", "severity": "Medium"}));
        assert_eq!(r.validate().unwrap(), TriageLevel::Medium);
    }

    #[test]
    fn intake_creates_initiated_emergency() {
        let conn = open_memory_database().unwrap();
        let nurse = Uuid::new_v4();
        insert_user(
            &conn,
            &nurse,
            "Nurse Ada",
            UserRole::Nurse,
            None,
            UserStatus::Active,
        )
        .unwrap();
        let ambulance = Ambulance {
            id: Uuid::new_v4(),
            ambulance_number: "AMB-3".into(),
            device_token: Some("tok".into()),
            assigned_nurse: Some(nurse),
        };
        insert_ambulance(&conn, &ambulance).unwrap();

        let r = report(json!({
            "patient_name": " Ravi ",
            "patient_age": "47",
            "gender": "male",
            "symptoms": "Severe chest pain",
            "summary": "Suspected myocardial infarction",
            "severity": "critical",
            "suggested_actions": ["Aspirin", "ECG"]
        }));
        let created = record_intake(&conn, &ambulance, &r).unwrap();

        let stored = get_emergency(&conn, &created.id).unwrap().unwrap();
        assert_eq!(stored.ambulance_id, Some(ambulance.id));
        assert_eq!(stored.nurse_id, Some(nurse));
        assert_eq!(stored.patient_name.as_deref(), Some("Ravi"));
        assert_eq!(stored.patient_age, Some(47));
        assert_eq!(stored.triage_level, TriageLevel::Critical);
        assert_eq!(stored.status, EmergencyStatus::Initiated);
        assert!(stored.doctor_id.is_none());

        let summary = TriageSummary::from_blob(stored.ai_summary.as_ref());
        assert_eq!(summary.summary.as_deref(), Some("Suspected myocardial infarction"));
        assert_eq!(summary.severity.as_deref(), Some("critical"));
        let blob = stored.ai_summary.unwrap();
        assert_eq!(blob["suggested_actions"][1], "ECG");
        assert_eq!(blob[SCHEMA_VERSION_KEY], SUMMARY_SCHEMA_VERSION);
    }

    #[test]
    fn invalid_report_stores_nothing() {
        let conn = open_memory_database().unwrap();
        let ambulance = Ambulance {
            id: Uuid::new_v4(),
            ambulance_number: "AMB-4".into(),
            device_token: None,
            assigned_nurse: None,
        };
        insert_ambulance(&conn, &ambulance).unwrap();

        let err =
            record_intake(&conn, &ambulance, &report(json!({"severity": "low"}))).unwrap_err();
        assert!(matches!(err, IntakeError::MissingSymptoms));
        assert!(crate::db::list_emergencies(&conn).unwrap().is_empty());
    }
}
