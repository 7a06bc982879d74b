//! Routing lexicon: keyword → specialty rules and scoring weights.
//!
//! The built-in default can be replaced by a JSON file with the same
//! shape (`HOPE_ROUTING_LEXICON`). All text is lowercased on load so the
//! scorer compares lowercase against lowercase.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::LexiconError;

pub const LEXICON_VERSION: u32 = 1;

pub const DEFAULT_KEYWORD_WEIGHT: i64 = 10;
pub const DEFAULT_ONLINE_WEIGHT: i64 = 3;
pub const DEFAULT_ACUITY_WEIGHT: i64 = 8;
pub const DEFAULT_REQUESTED_SPECIALTY_WEIGHT: i64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub keyword: String,
    /// Specialization substrings that earn the weight when the keyword hits.
    pub specialties: Vec<String>,
    #[serde(default = "default_keyword_weight")]
    pub weight: i64,
}

fn default_keyword_weight() -> i64 {
    DEFAULT_KEYWORD_WEIGHT
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingLexicon {
    pub version: u32,
    pub rules: Vec<KeywordRule>,
    pub online_weight: i64,
    /// Markers of a high-acuity case, searched in the triage tag and text.
    pub acuity_markers: Vec<String>,
    /// Specialization substring boosted for high-acuity cases.
    pub acuity_specialty: String,
    pub acuity_weight: i64,
    /// Applied only when nothing else scored.
    pub requested_specialty_weight: i64,
}

impl Default for RoutingLexicon {
    fn default() -> Self {
        let cardiology = &["cardiology", "cardiologist"][..];
        let neurology = &["neurology", "neurologist"][..];
        let pulmonology = &["pulmonology", "pulmonologist", "respiratory"][..];
        let emergency = &["emergency medicine"][..];

        let rules = vec![
            rule("chest", cardiology),
            rule("cardiac", cardiology),
            rule("fracture", &["orthopedic"]),
            rule("bleed", &["emergency medicine", "general surgery", "trauma"]),
            rule("trauma", &["emergency medicine", "trauma"]),
            rule("breathing", pulmonology),
            rule("breathless", pulmonology),
            rule("seizure", neurology),
            rule("stroke", neurology),
            rule("allergic", &["allergist", "allergy", "immunology"]),
            rule("pregnancy", &["obstetrics", "obgyn", "gynecology"]),
            rule("burn", &["plastic surgery", "burn unit", "emergency medicine"]),
            rule("severe", emergency),
            rule("critical", emergency),
        ];

        Self {
            version: LEXICON_VERSION,
            rules,
            online_weight: DEFAULT_ONLINE_WEIGHT,
            acuity_markers: ["critical", "red", "high", "severe"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            acuity_specialty: "emergency".to_string(),
            acuity_weight: DEFAULT_ACUITY_WEIGHT,
            requested_specialty_weight: DEFAULT_REQUESTED_SPECIALTY_WEIGHT,
        }
    }
}

fn rule(keyword: &str, specialties: &[&str]) -> KeywordRule {
    KeywordRule {
        keyword: keyword.to_string(),
        specialties: specialties.iter().map(|s| s.to_string()).collect(),
        weight: DEFAULT_KEYWORD_WEIGHT,
    }
}

impl RoutingLexicon {
    /// Parse, validate and normalize a lexicon from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, LexiconError> {
        let lexicon: Self = serde_json::from_str(json)?;
        lexicon.validate()?;
        Ok(lexicon.normalized())
    }

    /// Load a lexicon file.
    pub fn load(path: &Path) -> Result<Self, LexiconError> {
        let json = std::fs::read_to_string(path)?;
        let lexicon = Self::from_json_str(&json)?;
        tracing::info!(
            path = %path.display(),
            rules = lexicon.rules.len(),
            "Loaded routing lexicon"
        );
        Ok(lexicon)
    }

    /// Load from `path` when given, otherwise use the built-in default.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, LexiconError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), LexiconError> {
        if self.version != LEXICON_VERSION {
            return Err(LexiconError::UnsupportedVersion {
                found: self.version,
                expected: LEXICON_VERSION,
            });
        }

        for r in &self.rules {
            if r.keyword.trim().is_empty() {
                return Err(LexiconError::InvalidRule("empty keyword".into()));
            }
            if r.specialties.iter().all(|s| s.trim().is_empty()) {
                return Err(LexiconError::InvalidRule(format!(
                    "keyword '{}' maps to no specialty",
                    r.keyword
                )));
            }
            if r.weight < 0 {
                return Err(LexiconError::InvalidRule(format!(
                    "keyword '{}' has negative weight",
                    r.keyword
                )));
            }
        }

        let weights = [
            ("online_weight", self.online_weight),
            ("acuity_weight", self.acuity_weight),
            ("requested_specialty_weight", self.requested_specialty_weight),
        ];
        if let Some((name, _)) = weights.iter().find(|(_, w)| *w < 0) {
            return Err(LexiconError::InvalidRule(format!("{name} is negative")));
        }

        if self.acuity_specialty.trim().is_empty() {
            return Err(LexiconError::InvalidRule("empty acuity_specialty".into()));
        }

        Ok(())
    }

    fn normalized(mut self) -> Self {
        let lower = |s: &String| s.trim().to_lowercase();
        for r in &mut self.rules {
            r.keyword = lower(&r.keyword);
            r.specialties = r
                .specialties
                .iter()
                .map(lower)
                .filter(|s| !s.is_empty())
                .collect();
        }
        self.acuity_markers = self
            .acuity_markers
            .iter()
            .map(lower)
            .filter(|s| !s.is_empty())
            .collect();
        self.acuity_specialty = lower(&self.acuity_specialty);
        self
    }
}
