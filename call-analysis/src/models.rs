use crate::analysis::Recommendation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// Coded obstacle to care identified during a call.
///
/// Stored in ordered sets so repeated findings across analyses union
/// without duplication.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarrierCode {
    Transportation,
    Cost,
    Insurance,
    HealthLiteracy,
    PharmacyAccess,
    Scheduling,
    LanguageAccess,
    Escalation,
    Other(String),
}

impl fmt::Display for BarrierCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BarrierCode::Transportation => write!(f, "transportation"),
            BarrierCode::Cost => write!(f, "cost"),
            BarrierCode::Insurance => write!(f, "insurance"),
            BarrierCode::HealthLiteracy => write!(f, "health_literacy"),
            BarrierCode::PharmacyAccess => write!(f, "pharmacy_access"),
            BarrierCode::Scheduling => write!(f, "scheduling"),
            BarrierCode::LanguageAccess => write!(f, "language_access"),
            BarrierCode::Escalation => write!(f, "escalation"),
            BarrierCode::Other(code) => write!(f, "other:{}", code),
        }
    }
}

/// Classification of a key moment within a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyMomentType {
    Important,
    Question,
    Resolution,
    Escalation,
    SentimentChange,
    Keyword,
}

/// Who was speaking when a key moment occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Patient,
    Agent,
}

/// Sentiment attached to a key moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

/// Timestamped, classified event of interest within a call transcript.
///
/// Created by the analysis collaborator as calls are transcribed; never
/// mutated afterwards. The timestamp is seconds from call start and must
/// not exceed the call's recorded duration (checked when attached).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyMoment {
    pub moment_type: KeyMomentType,
    pub timestamp_secs: u32,
    pub description: String,
    pub speaker: Option<Speaker>,
    pub sentiment: Option<Sentiment>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Follow-up activity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowUpType {
    Call,
    Email,
    Task,
    Appointment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowUpPriority {
    High,
    Medium,
    Low,
}

/// Follow-up work item attached to a call at analysis time.
///
/// The only mutation after creation is completion; follow-ups are never
/// deleted, only superseded by newer ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUp {
    pub id: Uuid,
    pub follow_up_type: FollowUpType,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub assignee: Option<String>,
    pub priority: Option<FollowUpPriority>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl FollowUp {
    pub fn new(follow_up_type: FollowUpType, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            follow_up_type,
            description: description.into(),
            due_date: None,
            assignee: None,
            priority: None,
            completed_at: None,
        }
    }

    pub fn mark_completed(&mut self) {
        if self.completed_at.is_none() {
            self.completed_at = Some(Utc::now());
        }
    }
}

/// Status of an entry in a call's action log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Completed,
    Pending,
    Failed,
}

/// Entry in a call's append-only action log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionEntry {
    pub description: String,
    pub status: ActionStatus,
    pub timestamp: DateTime<Utc>,
}

/// Outreach call record.
///
/// Belongs to exactly one patient by id. Mutated only by the aggregator;
/// once finalized, identified barriers, recommendations, and the summary
/// are immutable — new findings go on new calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Call {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub duration_secs: u32,
    pub barriers_identified: BTreeSet<BarrierCode>,
    pub programs_enrolled: BTreeSet<String>,
    pub actions_taken: Vec<ActionEntry>,
    pub ai_recommendations: Vec<Recommendation>,
    pub call_summary: Option<String>,
    pub key_moments: Vec<KeyMoment>,
    pub follow_ups: Vec<FollowUp>,
    pub finalized: bool,
}

impl Call {
    pub fn new(patient_id: Uuid, duration_secs: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient_id,
            started_at: Utc::now(),
            duration_secs,
            barriers_identified: BTreeSet::new(),
            programs_enrolled: BTreeSet::new(),
            actions_taken: Vec::new(),
            ai_recommendations: Vec::new(),
            call_summary: None,
            key_moments: Vec::new(),
            follow_ups: Vec::new(),
            finalized: false,
        }
    }

    /// Append an entry to the action log. The log is append-only; entries
    /// are never edited or removed.
    pub fn record_action(&mut self, description: impl Into<String>, status: ActionStatus) {
        self.actions_taken.push(ActionEntry {
            description: description.into(),
            status,
            timestamp: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn barrier_codes_dedup_in_set() {
        let mut set = BTreeSet::new();
        set.insert(BarrierCode::Transportation);
        set.insert(BarrierCode::Transportation);
        set.insert(BarrierCode::Other("housing".into()));
        set.insert(BarrierCode::Other("housing".into()));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn follow_up_completion_is_sticky() {
        let mut fu = FollowUp::new(FollowUpType::Call, "check prescription pickup");
        fu.mark_completed();
        let first = fu.completed_at;
        fu.mark_completed();
        assert_eq!(fu.completed_at, first);
    }
}
