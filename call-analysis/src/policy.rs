use crate::analysis::{CallAnalysis, RecommendationPriority};
use crate::models::Call;
use engagement_pipeline::{Patient, PipelineStage, StageTransitionRequest};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Thresholds for the default stage policy.
///
/// | Field | Env var | Default |
/// |---|---|---|
/// | `enrollment_threshold` | `POLICY_ENROLLMENT_THRESHOLD` | 1 |
/// | `escalation_threshold` | `POLICY_ESCALATION_THRESHOLD` | 3 |
///
/// Product-configurable; deployments tune these without code changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// High-priority enrollment recommendations in a single analysis
    /// needed to advance the patient one stage.
    pub enrollment_threshold: usize,
    /// Consecutive calls with a high-severity escalation barrier needed
    /// to flag the patient for `AtRisk`.
    pub escalation_threshold: u32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            enrollment_threshold: 1,
            escalation_threshold: 3,
        }
    }
}

impl PolicyConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enrollment_threshold: std::env::var("POLICY_ENROLLMENT_THRESHOLD")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.enrollment_threshold),
            escalation_threshold: std::env::var("POLICY_ESCALATION_THRESHOLD")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.escalation_threshold),
        }
    }
}

/// Turns analysis signals into pipeline stage-transition requests.
///
/// Policies only propose; the engagement-pipeline state machine validates
/// and applies. Implementations must not mutate anything.
pub trait StagePolicy: Send + Sync {
    fn evaluate(
        &self,
        patient: &Patient,
        call: &Call,
        analysis: &CallAnalysis,
    ) -> Vec<StageTransitionRequest>;
}

/// Built-in policy:
///
/// - Enough high-priority, enrollment-implying recommendations advance an
///   `Awareness` or `Start` patient one stage forward.
/// - A run of consecutive escalation-flagged calls at or past the
///   configured threshold proposes `AtRisk` for actively engaged
///   patients.
#[derive(Debug, Default)]
pub struct DefaultStagePolicy {
    config: PolicyConfig,
}

impl DefaultStagePolicy {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }
}

impl StagePolicy for DefaultStagePolicy {
    fn evaluate(
        &self,
        patient: &Patient,
        call: &Call,
        analysis: &CallAnalysis,
    ) -> Vec<StageTransitionRequest> {
        let mut requests = Vec::new();

        let enrolling = analysis
            .recommendations
            .iter()
            .filter(|r| r.priority == RecommendationPriority::High && r.implies_enrollment)
            .count();

        if enrolling >= self.config.enrollment_threshold {
            if let Some(next) = match patient.status {
                PipelineStage::Awareness | PipelineStage::Start => patient.status.next_forward(),
                _ => None,
            } {
                debug!(
                    patient_id = %patient.id,
                    call_id = %call.id,
                    enrolling,
                    target = %next,
                    "Enrollment recommendations propose stage advance"
                );
                requests.push(StageTransitionRequest {
                    patient_id: patient.id,
                    target: next,
                    reason: format!(
                        "{} high-priority enrollment recommendation(s) from call {}",
                        enrolling, call.id
                    ),
                });
            }
        }

        let churn_risk = patient.consecutive_escalations >= self.config.escalation_threshold;
        if churn_risk && patient.status.is_active() && patient.status != PipelineStage::Awareness {
            debug!(
                patient_id = %patient.id,
                call_id = %call.id,
                consecutive = patient.consecutive_escalations,
                "Escalation run proposes at-risk"
            );
            requests.push(StageTransitionRequest {
                patient_id: patient.id,
                target: PipelineStage::AtRisk,
                reason: format!(
                    "{} consecutive calls with high-severity escalation",
                    patient.consecutive_escalations
                ),
            });
        }

        requests
    }
}
