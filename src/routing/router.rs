use serde::Serialize;
use uuid::Uuid;

use super::parser::parse_suggestion;
use super::prompt::build_routing_prompt;
use super::scorer::{pick_best, CandidateScorer};
use super::store::RecordStore;
use super::summary::TriageSummary;
use super::types::{
    Candidate, DecisionSource, LlmClient, RoutingDecision, RoutingJustification, RoutingOutcome,
};
use super::{AiError, RoutingError};
use crate::db::DatabaseError;
use crate::models::Emergency;

const DEFAULT_AI_REASONING: &str = "AI selected doctor";

/// Picks and records one doctor per emergency.
pub struct DoctorRouter<'a> {
    store: &'a dyn RecordStore,
    scorer: &'a dyn CandidateScorer,
    advisor: Option<&'a dyn LlmClient>,
}

/// Result of routing one emergency during a sweep.
#[derive(Debug, Serialize)]
pub struct SweepEntry {
    pub emergency_id: Uuid,
    #[serde(flatten)]
    pub outcome: Option<RoutingOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<'a> DoctorRouter<'a> {
    pub fn new(store: &'a dyn RecordStore, scorer: &'a dyn CandidateScorer) -> Self {
        Self {
            store,
            scorer,
            advisor: None,
        }
    }

    /// Consult `advisor` once per emergency before scoring.
    pub fn with_advisor(mut self, advisor: &'a dyn LlmClient) -> Self {
        self.advisor = Some(advisor);
        self
    }

    /// Route one emergency.
    pub fn assign(&self, emergency_id: &Uuid) -> Result<RoutingOutcome, RoutingError> {
        let emergency = self
            .store
            .fetch_emergency(emergency_id)?
            .ok_or(RoutingError::EmergencyNotFound(*emergency_id))?;

        if let Some(doctor_id) = emergency.doctor_id {
            tracing::debug!(%emergency_id, %doctor_id, "Emergency already has a doctor");
            return Ok(RoutingOutcome::AlreadyAssigned { doctor_id });
        }

        let candidates = self.store.fetch_active_candidates()?;
        if candidates.is_empty() {
            tracing::warn!(%emergency_id, "No active doctors to route to");
            return Err(RoutingError::NoCandidates);
        }

        let decision = self.select_doctor(&emergency, &candidates);
        let justification =
            RoutingJustification::for_decision(&decision, self.advisor.map(|a| a.model_name()));

        if self
            .store
            .assign_emergency(emergency_id, &decision.doctor_id, &justification)?
        {
            tracing::info!(
                %emergency_id,
                doctor_id = %decision.doctor_id,
                source = decision.source.as_str(),
                "Doctor assigned"
            );
            return Ok(RoutingOutcome::Assigned(decision));
        }

        // Lost the conditional write; report whoever won.
        let current = self
            .store
            .fetch_emergency(emergency_id)?
            .ok_or(RoutingError::EmergencyNotFound(*emergency_id))?;
        match current.doctor_id {
            Some(doctor_id) => {
                tracing::info!(%emergency_id, %doctor_id, "Emergency assigned concurrently");
                Ok(RoutingOutcome::AlreadyAssigned { doctor_id })
            }
            None => Err(RoutingError::Store(DatabaseError::ConstraintViolation(
                format!("assignment of emergency {emergency_id} affected no rows"),
            ))),
        }
    }

    /// Route every unassigned emergency, oldest first. Individual failures
    /// are recorded in the returned entries.
    pub fn route_pending(&self) -> Result<Vec<SweepEntry>, RoutingError> {
        let pending = self.store.list_unassigned()?;
        tracing::info!(count = pending.len(), "Routing pending emergencies");

        let mut entries = Vec::with_capacity(pending.len());
        for emergency_id in pending {
            let entry = match self.assign(&emergency_id) {
                Ok(outcome) => SweepEntry {
                    emergency_id,
                    outcome: Some(outcome),
                    error: None,
                },
                Err(e) => {
                    tracing::warn!(%emergency_id, error = %e, "Routing failed during sweep");
                    SweepEntry {
                        emergency_id,
                        outcome: None,
                        error: Some(e.to_string()),
                    }
                }
            };
            entries.push(entry);
        }
        Ok(entries)
    }

    /// AI suggestion when available and valid, deterministic scoring
    /// otherwise. `candidates` must be non-empty.
    fn select_doctor(&self, emergency: &Emergency, candidates: &[Candidate]) -> RoutingDecision {
        if let Some(advisor) = self.advisor {
            match ai_decision(advisor, emergency, candidates) {
                Ok(decision) => return decision,
                Err(e) => log_ai_failure(&emergency.id, &e),
            }
        }
        self.fallback_decision(emergency, candidates)
    }

    fn fallback_decision(
        &self,
        emergency: &Emergency,
        candidates: &[Candidate],
    ) -> RoutingDecision {
        let card = self.scorer.score(emergency, candidates);
        let Some(pick) = pick_best(candidates, &card.scores) else {
            // Misaligned score card.
            return pure_fallback(&candidates[0]);
        };
        let chosen = &candidates[pick.index];

        // Pure fallback: no keyword, acuity or requested-specialty signal
        // and availability separates no one.
        if !card.has_signal() && !pick.distinguished {
            return pure_fallback(chosen);
        }

        let keywords = if card.matched_keywords.is_empty() {
            "none".to_string()
        } else {
            card.matched_keywords.join(", ")
        };
        RoutingDecision {
            doctor_id: chosen.id,
            reasoning: format!(
                "Deterministic fallback: {} ({}, {}) scored {}; matched keywords: {}{}",
                chosen.full_name,
                chosen.specialization.as_deref().unwrap_or("no specialization"),
                if chosen.is_online { "online" } else { "offline" },
                pick.score,
                keywords,
                if card.high_acuity { "; high acuity" } else { "" },
            ),
            source: DecisionSource::Fallback,
        }
    }
}

fn pure_fallback(chosen: &Candidate) -> RoutingDecision {
    RoutingDecision {
        doctor_id: chosen.id,
        reasoning: format!(
            "Pure fallback selection: no distinguishing signal, assigned first available doctor {}",
            chosen.full_name
        ),
        source: DecisionSource::Fallback,
    }
}

fn ai_decision(
    advisor: &dyn LlmClient,
    emergency: &Emergency,
    candidates: &[Candidate],
) -> Result<RoutingDecision, AiError> {
    let summary = TriageSummary::from_blob(emergency.ai_summary.as_ref());
    let prompt = build_routing_prompt(emergency, &summary, candidates);
    let response = advisor.generate(&prompt)?;
    let suggestion = parse_suggestion(&response)?;

    let doctor_id = Uuid::parse_str(&suggestion.selected_doctor_id)
        .map_err(|_| AiError::UnknownCandidate(suggestion.selected_doctor_id.clone()))?;
    if !candidates.iter().any(|c| c.id == doctor_id) {
        return Err(AiError::UnknownCandidate(suggestion.selected_doctor_id));
    }

    let reasoning = if suggestion.reasoning.is_empty() {
        DEFAULT_AI_REASONING.to_string()
    } else {
        suggestion.reasoning
    };

    Ok(RoutingDecision {
        doctor_id,
        reasoning,
        source: DecisionSource::Ai,
    })
}

fn log_ai_failure(emergency_id: &Uuid, error: &AiError) {
    tracing::warn!(
        %emergency_id,
        error = %error,
        "AI routing suggestion unusable, continuing with deterministic fallback"
    );
    if let AiError::Status {
        status: 401 | 403, ..
    } = error
    {
        tracing::error!("Gemini rejected the API key; check GEMINI_API_KEY");
    }
}
