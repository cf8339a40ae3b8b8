//! Integration tests for call-analysis aggregation
//!
//! Scenarios covered:
//! 1. Barrier union across two calls for the same patient
//! 2. Re-aggregating a finalized call fails and changes nothing
//! 3. Empty transcripts are rejected up front
//! 4. Key moments past the call end are rejected
//! 5. Enrollment recommendations advance the pipeline via the state machine
//! 6. An escalation run flags the patient at risk
//! 7. Risk score follows configured weights

use call_analysis::*;
use engagement_pipeline::{Patient, PipelineStage, StateMachine};
use std::sync::Arc;

fn enrichment() -> EnrichmentSnapshot {
    EnrichmentSnapshot {
        rural: false,
        transportation_score: 0.4,
        health_literacy_score: 0.2,
        pharmacy_distance_miles: 5.0,
        insurance_covered: true,
    }
}

fn barrier(code: BarrierCode, severity: BarrierSeverity) -> Barrier {
    Barrier {
        code,
        description: "identified during call".into(),
        severity,
    }
}

fn analysis(barriers: Vec<Barrier>, recommendations: Vec<Recommendation>) -> CallAnalysis {
    CallAnalysis {
        transcript: "operator: hello. patient: hi.".into(),
        enrichment: enrichment(),
        barriers,
        recommendations,
        key_moments: vec![],
        follow_ups: vec![],
        call_summary: "Discussed transportation options.".into(),
    }
}

#[test]
fn barrier_union_across_calls_has_no_duplicates() {
    let aggregator = Aggregator::default();
    let mut patient = Patient::new("MRN-2001");

    let mut first = Call::new(patient.id, 420);
    aggregator
        .aggregate(
            &mut patient,
            &mut first,
            analysis(
                vec![
                    barrier(BarrierCode::Transportation, BarrierSeverity::High),
                    barrier(BarrierCode::Cost, BarrierSeverity::Medium),
                ],
                vec![],
            ),
        )
        .unwrap();

    let mut second = Call::new(patient.id, 380);
    aggregator
        .aggregate(
            &mut patient,
            &mut second,
            analysis(
                vec![
                    barrier(BarrierCode::Transportation, BarrierSeverity::Medium),
                    barrier(BarrierCode::Scheduling, BarrierSeverity::Low),
                ],
                vec![],
            ),
        )
        .unwrap();

    // Combined history across the patient's calls holds each code once.
    let combined: std::collections::BTreeSet<_> = first
        .barriers_identified
        .union(&second.barriers_identified)
        .cloned()
        .collect();
    assert_eq!(combined.len(), 3);
    assert!(combined.contains(&BarrierCode::Transportation));
    assert!(combined.contains(&BarrierCode::Cost));
    assert!(combined.contains(&BarrierCode::Scheduling));
}

#[test]
fn second_aggregation_of_finalized_call_fails_unchanged() {
    let aggregator = Aggregator::default();
    let mut patient = Patient::new("MRN-2002");
    let mut call = Call::new(patient.id, 300);

    aggregator
        .aggregate(
            &mut patient,
            &mut call,
            analysis(vec![barrier(BarrierCode::Cost, BarrierSeverity::High)], vec![]),
        )
        .unwrap();
    assert!(call.finalized);

    let before = serde_json::to_value(&call).unwrap();
    let err = aggregator
        .aggregate(
            &mut patient,
            &mut call,
            analysis(vec![barrier(BarrierCode::Insurance, BarrierSeverity::High)], vec![]),
        )
        .unwrap_err();

    assert!(matches!(err, AnalysisError::CallAlreadyFinalized(id) if id == call.id));
    assert_eq!(serde_json::to_value(&call).unwrap(), before);
}

#[test]
fn empty_transcript_is_rejected() {
    let aggregator = Aggregator::default();
    let mut patient = Patient::new("MRN-2003");
    let mut call = Call::new(patient.id, 300);

    let mut bad = analysis(vec![], vec![]);
    bad.transcript = "   ".into();

    let err = aggregator.aggregate(&mut patient, &mut call, bad).unwrap_err();
    assert!(matches!(err, AnalysisError::EmptyTranscript));
    assert!(!call.finalized);
}

#[test]
fn moment_past_call_end_is_rejected() {
    let aggregator = Aggregator::default();
    let mut patient = Patient::new("MRN-2004");
    let mut call = Call::new(patient.id, 120);

    let mut bad = analysis(vec![], vec![]);
    bad.key_moments.push(KeyMoment {
        moment_type: KeyMomentType::Escalation,
        timestamp_secs: 180,
        description: "raised voice".into(),
        speaker: Some(Speaker::Patient),
        sentiment: Some(Sentiment::Negative),
        keywords: vec![],
    });

    let err = aggregator.aggregate(&mut patient, &mut call, bad).unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::MomentAfterCallEnd {
            timestamp_secs: 180,
            duration_secs: 120,
        }
    ));
    assert!(!call.finalized);
    assert!(call.key_moments.is_empty());
}

#[test]
fn call_for_other_patient_is_rejected() {
    let aggregator = Aggregator::default();
    let mut patient = Patient::new("MRN-2005");
    let other = Patient::new("MRN-2006");
    let mut call = Call::new(other.id, 300);

    let err = aggregator
        .aggregate(&mut patient, &mut call, analysis(vec![], vec![]))
        .unwrap_err();
    assert!(matches!(err, AnalysisError::PatientMismatch { .. }));
}

#[test]
fn enrollment_recommendation_advances_pipeline() {
    let aggregator = Aggregator::default();
    let machine = StateMachine::new();
    let mut patient = Patient::new("MRN-2007");
    let mut call = Call::new(patient.id, 600);

    let outcome = aggregator
        .aggregate(
            &mut patient,
            &mut call,
            analysis(
                vec![],
                vec![Recommendation {
                    action: "Enroll in rideshare benefit".into(),
                    priority: RecommendationPriority::High,
                    rationale: "no reliable transport to clinic".into(),
                    estimated_savings: Some(85.0),
                    implies_enrollment: true,
                    program: Some("rideshare-benefit".into()),
                }],
            ),
        )
        .unwrap();

    assert_eq!(outcome.stage_requests.len(), 1);
    for result in machine.apply_requests(&mut patient, &outcome.stage_requests) {
        result.unwrap();
    }
    assert_eq!(patient.status, PipelineStage::Start);

    assert!(call.programs_enrolled.contains("rideshare-benefit"));
    assert!(call
        .actions_taken
        .iter()
        .any(|a| a.description.contains("rideshare-benefit")));
}

#[test]
fn escalation_run_flags_at_risk() {
    let aggregator = Aggregator::default();
    let machine = StateMachine::new();
    let mut patient = Patient::new("MRN-2008");
    machine
        .transition(&mut patient, PipelineStage::Start, "enrolled")
        .unwrap();

    let mut at_risk_requested = false;
    for _ in 0..3 {
        let mut call = Call::new(patient.id, 300);
        let outcome = aggregator
            .aggregate(
                &mut patient,
                &mut call,
                analysis(
                    vec![barrier(BarrierCode::Escalation, BarrierSeverity::High)],
                    vec![],
                ),
            )
            .unwrap();
        at_risk_requested = outcome
            .stage_requests
            .iter()
            .any(|r| r.target == PipelineStage::AtRisk);
        if at_risk_requested {
            for result in machine.apply_requests(&mut patient, &outcome.stage_requests) {
                result.unwrap();
            }
        }
    }

    assert!(at_risk_requested, "third escalated call should flag at-risk");
    assert_eq!(patient.status, PipelineStage::AtRisk);
    assert_eq!(patient.consecutive_escalations, 3);
}

#[test]
fn calm_call_resets_escalation_run() {
    let aggregator = Aggregator::default();
    let mut patient = Patient::new("MRN-2009");

    let mut call = Call::new(patient.id, 300);
    aggregator
        .aggregate(
            &mut patient,
            &mut call,
            analysis(
                vec![barrier(BarrierCode::Escalation, BarrierSeverity::High)],
                vec![],
            ),
        )
        .unwrap();
    assert_eq!(patient.consecutive_escalations, 1);

    let mut calm = Call::new(patient.id, 300);
    aggregator
        .aggregate(&mut patient, &mut calm, analysis(vec![], vec![]))
        .unwrap();
    assert_eq!(patient.consecutive_escalations, 0);
}

#[test]
fn risk_score_follows_configured_weights() {
    let weights = ScoringWeights {
        transportation: 1.0,
        health_literacy: 0.0,
        pharmacy_distance: 0.0,
        rural: 0.0,
        uninsured: 0.0,
        pharmacy_distance_cap_miles: 25.0,
    };
    let aggregator = Aggregator::new(
        weights,
        Arc::new(DefaultStagePolicy::new(PolicyConfig::default())),
    );
    let mut patient = Patient::new("MRN-2010");
    let mut call = Call::new(patient.id, 300);

    let outcome = aggregator
        .aggregate(&mut patient, &mut call, analysis(vec![], vec![]))
        .unwrap();

    assert!((outcome.risk_score - 0.4).abs() < 1e-9);
    assert!((patient.sdoh_risk_score - 0.4).abs() < 1e-9);
}
