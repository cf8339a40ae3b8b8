use crate::{
    announcer::TransitionAnnouncer,
    error::HandoffError,
    models::{ControlState, HandoffEvent, LiveCallControl},
};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Coordinates agent-to-operator takeovers for live calls.
///
/// The registry maps call ids to control records. A takeover runs in three
/// steps:
///
/// 1. **Claim**: atomically flip the call from `AgentControlled` to
///    `Transitioning` under the registry entry guard, stamping the record
///    with this attempt's claim token. Concurrent requests for the same
///    call see `Transitioning` and fail with `TakeoverInProgress`;
///    nothing races.
/// 2. **Announce**: await the [`TransitionAnnouncer`] so the remote party
///    hears the transfer before the operator joins. No registry lock is
///    held across this await. Failure reverts the claim.
/// 3. **Commit**: flip to `HumanControlled` and append the
///    [`HandoffEvent`]. Commit and revert only act while the record still
///    carries their own claim token, so a takeover that was cancelled
///    mid-announcement can neither record an event nor disturb a later
///    attempt's claim.
pub struct HandoffCoordinator {
    calls: DashMap<Uuid, LiveCallControl>,
    announcer: Arc<dyn TransitionAnnouncer>,
}

impl HandoffCoordinator {
    pub fn new(announcer: Arc<dyn TransitionAnnouncer>) -> Self {
        Self {
            calls: DashMap::new(),
            announcer,
        }
    }

    /// Enter a call into the registry under agent control. Re-registering
    /// a known call keeps its existing record.
    pub fn register_call(&self, call_id: Uuid) {
        self.calls
            .entry(call_id)
            .or_insert_with(|| LiveCallControl::new(call_id));
    }

    /// Take control of a live call for a human operator.
    pub async fn request_takeover(
        &self,
        call_id: Uuid,
        operator_id: Uuid,
        notes: Option<String>,
    ) -> Result<HandoffEvent, HandoffError> {
        let token = self.claim(call_id)?;

        // Announce before the human joins; a silent voice change confuses
        // the remote party. The claim above keeps competing takeovers out
        // while this awaits.
        if let Err(e) = self.announcer.announce(call_id, operator_id).await {
            warn!(call_id = %call_id, error = %e, "Takeover announcement failed, reverting");
            self.revert_claim(call_id, token);
            return Err(HandoffError::AnnouncementFailed(e.to_string()));
        }

        self.commit(call_id, operator_id, notes, token)
    }

    /// Abort a takeover that is still `Transitioning`. The call returns to
    /// agent control and no event is recorded; only completed takeovers
    /// are audited.
    pub fn cancel_takeover(&self, call_id: Uuid) -> Result<(), HandoffError> {
        let mut entry = self
            .calls
            .get_mut(&call_id)
            .ok_or(HandoffError::CallNotFound(call_id))?;
        match entry.state {
            ControlState::Transitioning => {
                entry.state = ControlState::AgentControlled;
                entry.claim = None;
                info!(call_id = %call_id, "Takeover cancelled, call back under agent control");
                Ok(())
            }
            _ => Err(HandoffError::NotTransitioning(call_id)),
        }
    }

    /// Current control state of a call.
    pub fn control_state(&self, call_id: Uuid) -> Result<ControlState, HandoffError> {
        self.calls
            .get(&call_id)
            .map(|entry| entry.state)
            .ok_or(HandoffError::CallNotFound(call_id))
    }

    /// Snapshot of the completed handoffs recorded for a call.
    pub fn events(&self, call_id: Uuid) -> Result<Vec<HandoffEvent>, HandoffError> {
        self.calls
            .get(&call_id)
            .map(|entry| entry.events.clone())
            .ok_or(HandoffError::CallNotFound(call_id))
    }

    // Atomic AgentControlled -> Transitioning flip, returning the token
    // that identifies this attempt's claim. The entry guard is the mutual
    // exclusion; it is never held across an await.
    fn claim(&self, call_id: Uuid) -> Result<Uuid, HandoffError> {
        let mut entry = self
            .calls
            .get_mut(&call_id)
            .ok_or(HandoffError::CallNotFound(call_id))?;
        match entry.state {
            ControlState::AgentControlled => {
                let token = Uuid::new_v4();
                entry.state = ControlState::Transitioning;
                entry.claim = Some(token);
                Ok(token)
            }
            ControlState::Transitioning => Err(HandoffError::TakeoverInProgress(call_id)),
            ControlState::HumanControlled => {
                Err(HandoffError::CallAlreadyHumanControlled(call_id))
            }
        }
    }

    // Reverts only this attempt's own claim; a claim made by a later
    // takeover after a cancellation is left alone.
    fn revert_claim(&self, call_id: Uuid, token: Uuid) {
        if let Some(mut entry) = self.calls.get_mut(&call_id) {
            if entry.state == ControlState::Transitioning && entry.claim == Some(token) {
                entry.state = ControlState::AgentControlled;
                entry.claim = None;
            }
        }
    }

    fn commit(
        &self,
        call_id: Uuid,
        operator_id: Uuid,
        notes: Option<String>,
        token: Uuid,
    ) -> Result<HandoffEvent, HandoffError> {
        let mut entry = self
            .calls
            .get_mut(&call_id)
            .ok_or(HandoffError::CallNotFound(call_id))?;

        // A cancellation may have won while the announcement was awaited,
        // and another takeover may already hold a fresh claim. Commit only
        // the claim this attempt made itself.
        if entry.state != ControlState::Transitioning || entry.claim != Some(token) {
            return Err(HandoffError::NotTransitioning(call_id));
        }

        let event = HandoffEvent::new(call_id, operator_id, notes);
        entry.events.push(event.clone());
        entry.state = ControlState::HumanControlled;
        entry.claim = None;

        info!(
            call_id = %call_id,
            operator_id = %operator_id,
            event_id = %event.id,
            "Call handed off to human operator"
        );

        Ok(event)
    }
}
