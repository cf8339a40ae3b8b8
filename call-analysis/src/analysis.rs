use crate::models::{BarrierCode, FollowUp, KeyMoment};
use serde::{Deserialize, Serialize};

/// Severity of an identified barrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarrierSeverity {
    High,
    Medium,
    Low,
}

/// Barrier to care identified by the analysis collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Barrier {
    pub code: BarrierCode,
    pub description: String,
    pub severity: BarrierSeverity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationPriority {
    High,
    Medium,
    Low,
}

/// Suggested action produced by call analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: String,
    pub priority: RecommendationPriority,
    pub rationale: String,
    pub estimated_savings: Option<f64>,
    /// Whether acting on this recommendation enrolls the patient in a
    /// program (the signal the stage policy watches for).
    pub implies_enrollment: bool,
    /// Program the enrollment targets, when the analysis names one.
    pub program: Option<String>,
}

/// Snapshot of enrichment data gathered alongside the transcript.
///
/// Sub-scores are normalized to `0.0..=1.0` where higher means higher
/// risk; `pharmacy_distance_miles` is raw distance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentSnapshot {
    pub rural: bool,
    pub transportation_score: f64,
    pub health_literacy_score: f64,
    pub pharmacy_distance_miles: f64,
    pub insurance_covered: bool,
}

/// One call's worth of derived analysis, produced by an external
/// collaborator and consumed exactly once by the aggregator. Not itself
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallAnalysis {
    pub transcript: String,
    pub enrichment: EnrichmentSnapshot,
    pub barriers: Vec<Barrier>,
    pub recommendations: Vec<Recommendation>,
    pub key_moments: Vec<KeyMoment>,
    pub follow_ups: Vec<FollowUp>,
    pub call_summary: String,
}
