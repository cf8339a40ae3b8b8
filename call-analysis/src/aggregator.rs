use crate::{
    analysis::{BarrierSeverity, CallAnalysis},
    error::AnalysisError,
    models::{BarrierCode, Call},
    policy::{DefaultStagePolicy, PolicyConfig, StagePolicy},
    scoring::ScoringWeights,
};
use engagement_pipeline::{Patient, StageTransitionRequest};
use std::sync::Arc;
use tracing::{debug, info};

/// What an aggregation produced, for the caller to act on.
///
/// Stage requests are proposals; the caller applies them through the
/// engagement-pipeline state machine, which validates each edge. Keeping
/// application out of the aggregator keeps the two independently testable.
#[derive(Debug)]
pub struct AggregationOutcome {
    /// The recomputed SDOH risk score, already written to the patient.
    pub risk_score: f64,
    /// Proposed stage changes; none have been applied.
    pub stage_requests: Vec<StageTransitionRequest>,
}

/// Merges a single call's analysis into the patient and call records.
///
/// Aggregation is a pure in-memory operation; loading the records before
/// and persisting them after is the caller's concern. Exclusive `&mut`
/// access to the call serializes concurrent aggregation in-process, and
/// the `finalized` flag rejects re-aggregation of a reloaded call.
pub struct Aggregator {
    weights: ScoringWeights,
    policy: Arc<dyn StagePolicy>,
}

impl Aggregator {
    pub fn new(weights: ScoringWeights, policy: Arc<dyn StagePolicy>) -> Self {
        Self { weights, policy }
    }

    /// Aggregator with weights and thresholds from the environment.
    pub fn from_env() -> Self {
        Self::new(
            ScoringWeights::from_env(),
            Arc::new(DefaultStagePolicy::new(PolicyConfig::from_env())),
        )
    }

    /// Swap in a different stage policy.
    pub fn with_policy(mut self, policy: Arc<dyn StagePolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Merge `analysis` into `call`, finalize the call, and recompute the
    /// patient's risk score.
    ///
    /// Fails before mutating anything: empty transcripts, already
    /// finalized calls, calls belonging to another patient, and key
    /// moments stamped past the call's end are all rejected up front.
    pub fn aggregate(
        &self,
        patient: &mut Patient,
        call: &mut Call,
        analysis: CallAnalysis,
    ) -> Result<AggregationOutcome, AnalysisError> {
        if analysis.transcript.trim().is_empty() {
            return Err(AnalysisError::EmptyTranscript);
        }
        if call.finalized {
            return Err(AnalysisError::CallAlreadyFinalized(call.id));
        }
        if call.patient_id != patient.id {
            return Err(AnalysisError::PatientMismatch {
                expected: patient.id,
                found: call.patient_id,
            });
        }
        for moment in &analysis.key_moments {
            if moment.timestamp_secs > call.duration_secs {
                return Err(AnalysisError::MomentAfterCallEnd {
                    timestamp_secs: moment.timestamp_secs,
                    duration_secs: call.duration_secs,
                });
            }
        }

        // Barrier codes union into the identified set; repeats across
        // analyses do not duplicate.
        let escalated = analysis.barriers.iter().any(|b| {
            b.code == BarrierCode::Escalation && b.severity == BarrierSeverity::High
        });
        for barrier in &analysis.barriers {
            call.barriers_identified.insert(barrier.code.clone());
        }
        debug!(
            call_id = %call.id,
            barriers = call.barriers_identified.len(),
            "Merged barrier set"
        );

        // Cross-call churn-risk signal consumed by the stage policy.
        if escalated {
            patient.consecutive_escalations += 1;
        } else {
            patient.consecutive_escalations = 0;
        }

        let stage_requests = self.policy.evaluate(patient, call, &analysis);

        // Named program enrollments land in the set and the action log.
        for rec in &analysis.recommendations {
            if !rec.implies_enrollment {
                continue;
            }
            if let Some(program) = &rec.program {
                if call.programs_enrolled.insert(program.clone()) {
                    call.record_action(
                        format!("Enrolled in {}", program),
                        crate::models::ActionStatus::Completed,
                    );
                }
            }
        }

        call.key_moments.extend(analysis.key_moments);
        call.follow_ups.extend(analysis.follow_ups);
        call.ai_recommendations.extend(analysis.recommendations);
        call.call_summary = Some(analysis.call_summary);
        call.finalized = true;

        let risk_score = self.weights.risk_score(&analysis.enrichment);
        patient.sdoh_risk_score = risk_score;
        patient.updated_at = chrono::Utc::now();

        info!(
            patient_id = %patient.id,
            call_id = %call.id,
            risk_score,
            stage_requests = stage_requests.len(),
            "Call analysis aggregated"
        );

        Ok(AggregationOutcome {
            risk_score,
            stage_requests,
        })
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(
            ScoringWeights::default(),
            Arc::new(DefaultStagePolicy::default()),
        )
    }
}
