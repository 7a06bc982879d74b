//! Deterministic candidate scoring.
//!
//! | Signal                                        | Weight (default) |
//! |-----------------------------------------------|------------------|
//! | lexicon keyword hit × matching specialization | +10 per keyword  |
//! | candidate online                              | +3               |
//! | acuity marker × "emergency" specialization    | +8               |
//! | requested specialty (only if all scores are 0)| +5               |

use super::lexicon::RoutingLexicon;
use super::summary::TriageSummary;
use super::types::Candidate;
use crate::models::Emergency;

/// Scores for one emergency, aligned with the candidate slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreCard {
    pub scores: Vec<i64>,
    /// Lexicon keywords found in the search text, in lexicon order.
    pub matched_keywords: Vec<String>,
    pub high_acuity: bool,
    /// A keyword, acuity or requested-specialty weight landed on at least
    /// one candidate.
    pub specialty_hit: bool,
}

impl ScoreCard {
    /// Whether anything beyond availability informed the scores.
    pub fn has_signal(&self) -> bool {
        self.specialty_hit || !self.matched_keywords.is_empty()
    }
}

/// Scoring seam used by the router's fallback path.
pub trait CandidateScorer {
    fn score(&self, emergency: &Emergency, candidates: &[Candidate]) -> ScoreCard;
}

/// Lexicon-driven scorer.
pub struct LexiconScorer<'a> {
    lexicon: &'a RoutingLexicon,
}

impl<'a> LexiconScorer<'a> {
    pub fn new(lexicon: &'a RoutingLexicon) -> Self {
        Self { lexicon }
    }
}

impl CandidateScorer for LexiconScorer<'_> {
    fn score(&self, emergency: &Emergency, candidates: &[Candidate]) -> ScoreCard {
        let lex = self.lexicon;
        let summary = TriageSummary::from_blob(emergency.ai_summary.as_ref());
        let search_text = build_search_text(emergency.symptoms.as_deref(), &summary);
        let specs: Vec<String> = candidates.iter().map(Candidate::specialization_lower).collect();
        let mut scores = vec![0_i64; candidates.len()];

        let mut matched_keywords = Vec::new();
        let mut specialty_hit = false;
        for rule in &lex.rules {
            if !search_text.contains(rule.keyword.as_str()) {
                continue;
            }
            matched_keywords.push(rule.keyword.clone());
            for (score, spec) in scores.iter_mut().zip(&specs) {
                if rule.specialties.iter().any(|s| spec.contains(s.as_str())) {
                    *score += rule.weight;
                    specialty_hit = true;
                }
            }
        }

        for (score, candidate) in scores.iter_mut().zip(candidates) {
            if candidate.is_online {
                *score += lex.online_weight;
            }
        }

        let triage_tag = emergency.triage_level.as_str();
        let summary_severity = summary.severity.as_deref().unwrap_or_default().to_lowercase();
        let high_acuity = lex.acuity_markers.iter().any(|m| {
            triage_tag.contains(m.as_str())
                || summary_severity.contains(m.as_str())
                || search_text.contains(m.as_str())
        });
        if high_acuity {
            for (score, spec) in scores.iter_mut().zip(&specs) {
                if spec.contains(lex.acuity_specialty.as_str()) {
                    *score += lex.acuity_weight;
                    specialty_hit = true;
                }
            }
        }

        if scores.iter().all(|s| *s == 0) {
            let requested = emergency
                .doctor_specialty
                .as_deref()
                .unwrap_or_default()
                .trim()
                .to_lowercase();
            if !requested.is_empty() {
                for (score, spec) in scores.iter_mut().zip(&specs) {
                    if spec.contains(requested.as_str()) {
                        *score += lex.requested_specialty_weight;
                        specialty_hit = true;
                    }
                }
            }
        }

        ScoreCard {
            scores,
            matched_keywords,
            high_acuity,
            specialty_hit,
        }
    }
}

/// Lowercased haystack for keyword search: symptoms followed by the
/// summary fields routing is allowed to read.
pub fn build_search_text(symptoms: Option<&str>, summary: &TriageSummary) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if let Some(s) = symptoms {
        parts.push(s);
    }
    parts.extend(summary.search_fragments());
    parts.join(" ").to_lowercase()
}

/// Result of picking the best-scored candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pick {
    pub index: usize,
    pub score: i64,
    /// False when no score or availability difference separated the
    /// candidates, so the pick is just input order.
    pub distinguished: bool,
}

/// Highest score wins; on a tie an online candidate displaces an offline
/// incumbent; otherwise the earlier candidate stays. `None` only for an
/// empty pool.
pub fn pick_best(candidates: &[Candidate], scores: &[i64]) -> Option<Pick> {
    let first_score = *scores.first()?;
    if candidates.is_empty() {
        return None;
    }

    let mut best = 0;
    for (i, (candidate, &score)) in candidates.iter().zip(scores).enumerate().skip(1) {
        let incumbent = &candidates[best];
        let online_displaces = score == scores[best] && candidate.is_online && !incumbent.is_online;
        if score > scores[best] || online_displaces {
            best = i;
        }
    }

    let uniform_scores = scores.iter().all(|s| *s == first_score);
    let uniform_availability = candidates
        .iter()
        .all(|c| c.is_online == candidates[0].is_online);

    Some(Pick {
        index: best,
        score: scores[best],
        distinguished: !(uniform_scores && uniform_availability),
    })
}
