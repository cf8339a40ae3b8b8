use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

/// Seam to the telephony side: instructs the automated agent to announce
/// the takeover to the remote party.
///
/// The coordinator awaits this before moving a call to human control, so
/// the remote party is never surprised by a silent voice change. Returning
/// `Ok` means the announcement completed or is confirmed dispatched; any
/// error aborts the takeover.
#[async_trait]
pub trait TransitionAnnouncer: Send + Sync {
    async fn announce(&self, call_id: Uuid, operator_id: Uuid) -> anyhow::Result<()>;
}

/// Default announcer that only logs the announcement.
///
/// Stands in for a real telephony integration in tests and development.
pub struct LoggingAnnouncer;

#[async_trait]
impl TransitionAnnouncer for LoggingAnnouncer {
    async fn announce(&self, call_id: Uuid, operator_id: Uuid) -> anyhow::Result<()> {
        info!(
            call_id = %call_id,
            operator_id = %operator_id,
            "Announcing operator takeover to remote party"
        );
        Ok(())
    }
}
