use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Patient's position in the engagement pipeline.
///
/// The derived `Ord` follows the forward path
/// `Awareness < Start < Treatment < Established` and is used for progress
/// display only. `AtRisk` and `Churned` are branch stages; ordering against
/// them carries no meaning. Transition legality is decided by the state
/// machine's rule table, never by comparing ordinals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Awareness,
    Start,
    Treatment,
    Established,
    AtRisk,
    Churned,
}

impl PipelineStage {
    /// Stages a patient can occupy while actively engaged.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            PipelineStage::Awareness
                | PipelineStage::Start
                | PipelineStage::Treatment
                | PipelineStage::Established
        )
    }

    /// The next stage on the forward path, if any.
    pub fn next_forward(&self) -> Option<PipelineStage> {
        match self {
            PipelineStage::Awareness => Some(PipelineStage::Start),
            PipelineStage::Start => Some(PipelineStage::Treatment),
            PipelineStage::Treatment => Some(PipelineStage::Established),
            _ => None,
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Awareness => "awareness",
            PipelineStage::Start => "start",
            PipelineStage::Treatment => "treatment",
            PipelineStage::Established => "established",
            PipelineStage::AtRisk => "at_risk",
            PipelineStage::Churned => "churned",
        };
        write!(f, "{}", name)
    }
}

/// An applied stage transition, kept in the patient's history for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageTransition {
    pub id: Uuid,
    pub from: PipelineStage,
    pub to: PipelineStage,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

/// A proposed stage change, produced by upstream analysis and validated by
/// the state machine. Plain data so producers stay decoupled from the rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageTransitionRequest {
    pub patient_id: Uuid,
    pub target: PipelineStage,
    pub reason: String,
}

/// Patient record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub mrn: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub phone: Option<String>,
    pub preferred_language: Option<String>,
    pub insurance_plan: Option<String>,
    pub insurance_member_id: Option<String>,
    pub rural: bool,
    /// Composite social-determinants-of-health risk, 0.0 (lowest) to 1.0.
    pub sdoh_risk_score: f64,
    /// Run length of consecutive analyzed calls flagging a high-severity
    /// escalation barrier. Maintained by call analysis; resets to zero on
    /// the first calm call.
    pub consecutive_escalations: u32,
    /// Current pipeline stage. Changed only through the state machine.
    pub status: PipelineStage,
    /// Append-only transition history.
    pub stage_history: Vec<StageTransition>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    pub fn new(mrn: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            mrn: mrn.into(),
            first_name: String::new(),
            last_name: String::new(),
            date_of_birth: None,
            phone: None,
            preferred_language: None,
            insurance_plan: None,
            insurance_member_id: None,
            rural: false,
            sdoh_risk_score: 0.0,
            consecutive_escalations: 0,
            status: PipelineStage::Awareness,
            stage_history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Last active stage the patient held before their current status.
    ///
    /// Used to recover a patient out of `AtRisk` to where they were. Walks
    /// the history backwards looking for the most recent active `from`
    /// stage.
    pub fn prior_active_stage(&self) -> Option<PipelineStage> {
        self.stage_history
            .iter()
            .rev()
            .find(|t| t.from.is_active())
            .map(|t| t.from)
    }
}
