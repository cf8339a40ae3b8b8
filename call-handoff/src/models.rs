use call_analysis::{ActionEntry, ActionStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Who controls a live call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlState {
    /// The automated conversational agent is driving the call.
    AgentControlled,
    /// A takeover has been claimed; the agent is announcing the transfer.
    Transitioning,
    /// A human operator is driving the call.
    HumanControlled,
}

impl fmt::Display for ControlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControlState::AgentControlled => "agent_controlled",
            ControlState::Transitioning => "transitioning",
            ControlState::HumanControlled => "human_controlled",
        };
        write!(f, "{}", name)
    }
}

/// Record of a completed live-call takeover.
///
/// Append-only; once recorded it is part of the call's immutable action
/// log. Cancelled takeover attempts never produce one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandoffEvent {
    pub id: Uuid,
    pub call_id: Uuid,
    pub operator_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub notes: Option<String>,
}

impl HandoffEvent {
    pub fn new(call_id: Uuid, operator_id: Uuid, notes: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            call_id,
            operator_id,
            occurred_at: Utc::now(),
            notes,
        }
    }
}

impl From<&HandoffEvent> for ActionEntry {
    fn from(event: &HandoffEvent) -> Self {
        let description = match &event.notes {
            Some(notes) => format!(
                "Call handed off to operator {}: {}",
                event.operator_id, notes
            ),
            None => format!("Call handed off to operator {}", event.operator_id),
        };
        ActionEntry {
            description,
            status: ActionStatus::Completed,
            timestamp: event.occurred_at,
        }
    }
}

/// Control record for one live call, kept in the coordinator's registry.
///
/// Conversation history stays on the call entity; only the control flag
/// and the handoff audit trail live here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveCallControl {
    pub call_id: Uuid,
    pub state: ControlState,
    /// Token of the takeover attempt currently holding `Transitioning`.
    /// Set when a claim is made, cleared on commit, cancel, or revert, so
    /// an attempt can only complete the claim it made itself.
    #[serde(skip)]
    pub claim: Option<Uuid>,
    pub events: Vec<HandoffEvent>,
    pub registered_at: DateTime<Utc>,
}

impl LiveCallControl {
    pub fn new(call_id: Uuid) -> Self {
        Self {
            call_id,
            state: ControlState::AgentControlled,
            claim: None,
            events: Vec::new(),
            registered_at: Utc::now(),
        }
    }
}
