use crate::{
    error::PipelineError,
    models::{Patient, PipelineStage, StageTransition, StageTransitionRequest},
};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

/// Validates and applies engagement-stage transitions.
///
/// Transition rules:
/// - Forward progress is strictly sequential:
///   `Awareness -> Start -> Treatment -> Established`. Skipping fails.
/// - Any of `Start`, `Treatment`, `Established` may move to `AtRisk`;
///   risk is monitored continuously, not only at specific stages.
/// - From `AtRisk` a patient recovers back to the prior active stage, or
///   moves forward to `Churned`.
/// - `Churned -> Awareness` is the only re-entry edge; `Churned` has no
///   other exits.
/// - A transition to the current stage is an idempotent no-op that records
///   no history entry.
///
/// Every applied transition carries a `reason` and is appended to the
/// patient's stage history, which is never rewritten.
#[derive(Debug, Default)]
pub struct StateMachine;

impl StateMachine {
    pub fn new() -> Self {
        Self
    }

    /// Move `patient` to `target`, recording `reason` in the history.
    pub fn transition(
        &self,
        patient: &mut Patient,
        target: PipelineStage,
        reason: &str,
    ) -> Result<(), PipelineError> {
        let current = patient.status;

        // Idempotent re-transition: no-op, no history entry.
        if target == current {
            return Ok(());
        }

        if reason.trim().is_empty() {
            return Err(PipelineError::MissingReason);
        }

        if !self.is_legal(patient, current, target) {
            warn!(
                patient_id = %patient.id,
                from = %current,
                to = %target,
                "Rejected stage transition"
            );
            return Err(PipelineError::InvalidTransition {
                from: current,
                to: target,
            });
        }

        let now = Utc::now();
        patient.stage_history.push(StageTransition {
            id: Uuid::new_v4(),
            from: current,
            to: target,
            reason: reason.to_string(),
            occurred_at: now,
        });
        patient.status = target;
        patient.updated_at = now;

        info!(
            patient_id = %patient.id,
            from = %current,
            to = %target,
            reason = reason,
            "Stage transition applied"
        );

        Ok(())
    }

    /// Apply a batch of requests produced by upstream analysis, collecting
    /// the per-request outcome. Requests addressed to a different patient
    /// id are skipped.
    pub fn apply_requests(
        &self,
        patient: &mut Patient,
        requests: &[StageTransitionRequest],
    ) -> Vec<Result<(), PipelineError>> {
        let patient_id = patient.id;
        requests
            .iter()
            .filter(|r| r.patient_id == patient_id)
            .map(|r| self.transition(patient, r.target, &r.reason))
            .collect()
    }

    fn is_legal(&self, patient: &Patient, from: PipelineStage, to: PipelineStage) -> bool {
        use PipelineStage::*;

        match (from, to) {
            // Strictly sequential forward progress.
            (Awareness, Start) | (Start, Treatment) | (Treatment, Established) => true,
            // Risk branch is reachable from any active stage past Awareness.
            (Start, AtRisk) | (Treatment, AtRisk) | (Established, AtRisk) => true,
            // At-risk patients either churn or recover to where they were.
            (AtRisk, Churned) => true,
            (AtRisk, stage) if stage.is_active() => {
                patient.prior_active_stage().unwrap_or(Start) == stage
            }
            // The single re-entry edge out of churn.
            (Churned, Awareness) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient() -> Patient {
        Patient::new("MRN-0001")
    }

    #[test]
    fn forward_progress_is_sequential() {
        let machine = StateMachine::new();
        let mut p = patient();

        machine
            .transition(&mut p, PipelineStage::Start, "first outreach call")
            .unwrap();
        machine
            .transition(&mut p, PipelineStage::Treatment, "treatment scheduled")
            .unwrap();
        machine
            .transition(&mut p, PipelineStage::Established, "third visit completed")
            .unwrap();

        assert_eq!(p.status, PipelineStage::Established);
        assert_eq!(p.stage_history.len(), 3);
    }

    #[test]
    fn skipping_stages_fails() {
        let machine = StateMachine::new();
        let mut p = patient();

        let err = machine
            .transition(&mut p, PipelineStage::Established, "skip ahead")
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidTransition {
                from: PipelineStage::Awareness,
                to: PipelineStage::Established,
            }
        ));
        assert_eq!(p.status, PipelineStage::Awareness);
        assert!(p.stage_history.is_empty());
    }

    #[test]
    fn idempotent_transition_is_a_noop() {
        let machine = StateMachine::new();
        let mut p = patient();

        machine
            .transition(&mut p, PipelineStage::Awareness, "")
            .unwrap();
        assert!(p.stage_history.is_empty());
    }

    #[test]
    fn at_risk_recovers_to_prior_stage() {
        let machine = StateMachine::new();
        let mut p = patient();

        machine
            .transition(&mut p, PipelineStage::Start, "enrolled")
            .unwrap();
        machine
            .transition(&mut p, PipelineStage::Treatment, "in treatment")
            .unwrap();
        machine
            .transition(&mut p, PipelineStage::AtRisk, "missed two appointments")
            .unwrap();

        // Recovery must target Treatment, not any other active stage.
        let err = machine
            .transition(&mut p, PipelineStage::Start, "re-engaged")
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidTransition { .. }));

        machine
            .transition(&mut p, PipelineStage::Treatment, "re-engaged")
            .unwrap();
        assert_eq!(p.status, PipelineStage::Treatment);
    }

    #[test]
    fn churned_reenters_only_at_awareness() {
        let machine = StateMachine::new();
        let mut p = patient();

        machine.transition(&mut p, PipelineStage::Start, "enrolled").unwrap();
        machine
            .transition(&mut p, PipelineStage::AtRisk, "unreachable")
            .unwrap();
        machine
            .transition(&mut p, PipelineStage::Churned, "no contact in 90 days")
            .unwrap();

        let err = machine
            .transition(&mut p, PipelineStage::Treatment, "direct to treatment")
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidTransition { .. }));

        machine
            .transition(&mut p, PipelineStage::Awareness, "new outreach campaign")
            .unwrap();
        assert_eq!(p.status, PipelineStage::Awareness);
    }

    #[test]
    fn transition_requires_reason() {
        let machine = StateMachine::new();
        let mut p = patient();

        let err = machine
            .transition(&mut p, PipelineStage::Start, "  ")
            .unwrap_err();
        assert!(matches!(err, PipelineError::MissingReason));
    }
}
