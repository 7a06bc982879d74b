//! Typed view over the stored triage summary blob.
//!
//! The blob is whatever the upstream summarizer produced. Routing reads
//! exactly three fields; aliases are listed here and nowhere else.
//!
//! | Field      | Keys, in precedence order                                         |
//! |------------|-------------------------------------------------------------------|
//! | `summary`  | `summary`, `ai_triage_agent_output.summary`                       |
//! | `symptoms` | `symptoms`                                                        |
//! | `severity` | `severity`, `triage_level`, `ai_triage_agent_output.triage_level` |
//!
//! Intake stamps `schema_version`. Stamped blobs are read by primary key
//! only; the aliases apply to unstamped records written before versioning.
//! Each key is resolved on its own, so one malformed key never hides the
//! others.

use serde_json::Value;

pub const SUMMARY_SCHEMA_VERSION: u64 = 1;
pub const SCHEMA_VERSION_KEY: &str = "schema_version";

const NO_ALIASES: &[&str] = &[];
const SUMMARY_ALIASES: &[&str] = &["/ai_triage_agent_output/summary"];
const SEVERITY_ALIASES: &[&str] = &["/triage_level", "/ai_triage_agent_output/triage_level"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriageSummary {
    pub summary: Option<String>,
    pub symptoms: Option<String>,
    pub severity: Option<String>,
}

impl TriageSummary {
    /// Extract the routed fields from a stored blob. Never fails: shapes
    /// that do not match yield empty fields.
    pub fn from_blob(blob: Option<&Value>) -> Self {
        let Some(blob) = blob else {
            return Self::default();
        };

        let fields = match blob {
            // Older intake records stored the summary as a bare string.
            Value::String(s) => {
                return Self {
                    summary: non_empty(s),
                    ..Self::default()
                };
            }
            Value::Object(_) => blob,
            _ => return Self::default(),
        };

        let aliases_apply = match fields.get(SCHEMA_VERSION_KEY).map(Value::as_u64) {
            None => true,
            Some(Some(version)) if version <= SUMMARY_SCHEMA_VERSION => false,
            Some(version) => {
                tracing::warn!(
                    version = ?version,
                    supported = SUMMARY_SCHEMA_VERSION,
                    "Unsupported triage summary schema version, reading primary keys only"
                );
                false
            }
        };
        let resolve = |primary: &str, aliases: &[&str]| {
            text(fields.get(primary)).or_else(|| {
                aliases
                    .iter()
                    .filter(|_| aliases_apply)
                    .find_map(|pointer| text(fields.pointer(pointer)))
            })
        };

        Self {
            summary: resolve("summary", SUMMARY_ALIASES),
            symptoms: resolve("symptoms", NO_ALIASES),
            severity: resolve("severity", SEVERITY_ALIASES),
        }
    }

    /// Fields that take part in keyword search, in fixed order.
    pub fn search_fragments(&self) -> impl Iterator<Item = &str> {
        [&self.summary, &self.symptoms, &self.severity]
            .into_iter()
            .filter_map(|f| f.as_deref())
    }
}

/// Mark an intake blob with the current summary schema version. Non-object
/// blobs are left untouched.
pub fn stamp_schema_version(blob: &mut Value) {
    if let Value::Object(map) = blob {
        map.insert(SCHEMA_VERSION_KEY.to_string(), Value::from(SUMMARY_SCHEMA_VERSION));
    }
}

fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => non_empty(s),
        _ => None,
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn reads_primary_keys() {
        let blob = json!({
            "summary": "Crushing chest pain radiating to left arm",
            "symptoms": "chest pain, sweating",
            "severity": "critical",
            "suggested_actions": ["Aspirin 300mg", "12-lead ECG"]
        });
        let s = TriageSummary::from_blob(Some(&blob));
        assert_eq!(
            s.summary.as_deref(),
            Some("Crushing chest pain radiating to left arm")
        );
        assert_eq!(s.symptoms.as_deref(), Some("chest pain, sweating"));
        assert_eq!(s.severity.as_deref(), Some("critical"));
    }

    #[test]
    fn resolves_nested_aliases() {
        let blob = json!({
            "ai_triage_agent_output": {
                "summary": "Seizure lasting 4 minutes",
                "triage_level": "high"
            }
        });
        let s = TriageSummary::from_blob(Some(&blob));
        assert_eq!(s.summary.as_deref(), Some("Seizure lasting 4 minutes"));
        assert_eq!(s.severity.as_deref(), Some("high"));
    }

    #[test]
    fn top_level_wins_over_alias() {
        let blob = json!({
            "summary": "top",
            "triage_level": "low",
            "severity": "moderate",
            "ai_triage_agent_output": {"summary": "nested"}
        });
        let s = TriageSummary::from_blob(Some(&blob));
        assert_eq!(s.summary.as_deref(), Some("top"));
        assert_eq!(s.severity.as_deref(), Some("moderate"));
    }

    #[test]
    fn unsearched_fields_are_ignored() {
        let blob = json!({
            "patient_name": "Critical Care Cathy",
            "suggested_actions": ["stroke scale"]
        });
        let s = TriageSummary::from_blob(Some(&blob));
        assert_eq!(s, TriageSummary::default());
        assert_eq!(s.search_fragments().count(), 0);
    }

    #[test]
    fn bare_string_blob_is_summary() {
        let blob = json!("difficulty breathing");
        let s = TriageSummary::from_blob(Some(&blob));
        assert_eq!(s.summary.as_deref(), Some("difficulty breathing"));
    }

    #[test]
    fn wrong_types_and_missing_blob_are_empty() {
        let blob = json!({"summary": 42, "severity": null, "symptoms": "   "});
        assert_eq!(TriageSummary::from_blob(Some(&blob)), TriageSummary::default());
        assert_eq!(TriageSummary::from_blob(None), TriageSummary::default());
        assert_eq!(
            TriageSummary::from_blob(Some(&json!([1, 2]))),
            TriageSummary::default()
        );
    }

    #[test]
    fn malformed_nested_alias_keeps_other_fields() {
        let blob = json!({
            "summary": "crushing chest pain",
            "severity": "critical",
            "ai_triage_agent_output": "n/a"
        });
        let s = TriageSummary::from_blob(Some(&blob));
        assert_eq!(s.summary.as_deref(), Some("crushing chest pain"));
        assert_eq!(s.severity.as_deref(), Some("critical"));

        let blob = json!({"symptoms": "wheezing", "ai_triage_agent_output": [1, 2]});
        let s = TriageSummary::from_blob(Some(&blob));
        assert_eq!(s.symptoms.as_deref(), Some("wheezing"));
        assert!(s.summary.is_none());
    }

    #[test]
    fn stamped_blob_ignores_legacy_aliases() {
        let mut blob = json!({
            "summary": "fall from scaffold",
            "ai_triage_agent_output": {"triage_level": "critical"}
        });
        stamp_schema_version(&mut blob);
        assert_eq!(blob[SCHEMA_VERSION_KEY], SUMMARY_SCHEMA_VERSION);

        let s = TriageSummary::from_blob(Some(&blob));
        assert_eq!(s.summary.as_deref(), Some("fall from scaffold"));
        assert!(s.severity.is_none());
    }

    #[test]
    fn newer_schema_version_reads_primary_keys() {
        let blob = json!({
            "schema_version": SUMMARY_SCHEMA_VERSION + 1,
            "severity": "high",
            "triage_level": "low"
        });
        let s = TriageSummary::from_blob(Some(&blob));
        assert_eq!(s.severity.as_deref(), Some("high"));
    }

    #[test]
    fn stamping_skips_non_objects() {
        let mut blob = json!("bare summary");
        stamp_schema_version(&mut blob);
        assert_eq!(blob, json!("bare summary"));
    }
}
