//! Live-call handoff protocol for CareReach Engine
//!
//! Every live outreach call starts under automated-agent control. A human
//! operator may take over mid-session; this module coordinates that
//! transfer:
//!
//! - Per-call control states: `AgentControlled -> Transitioning ->
//!   HumanControlled`, with cancellation back to `AgentControlled`
//! - Takeover requests for the same call are serialized; the loser of a
//!   race fails with `TakeoverInProgress` instead of double-claiming
//! - The automated agent announces the transition to the remote party
//!   before control passes; a failed announcement aborts the takeover
//! - Completed takeovers append an immutable `HandoffEvent`; cancelled
//!   attempts leave no record
//! - The call's conversation history is never reset, only the control
//!   flag changes
//!
//! # Example
//!
//! ```rust
//! use call_handoff::{HandoffCoordinator, LoggingAnnouncer};
//! use std::sync::Arc;
//! use uuid::Uuid;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), call_handoff::HandoffError> {
//! let coordinator = HandoffCoordinator::new(Arc::new(LoggingAnnouncer));
//! let call_id = Uuid::new_v4();
//! coordinator.register_call(call_id);
//!
//! let event = coordinator
//!     .request_takeover(call_id, Uuid::new_v4(), Some("patient asked for a person".into()))
//!     .await?;
//! assert_eq!(event.call_id, call_id);
//! # Ok(())
//! # }
//! ```

pub mod announcer;
pub mod coordinator;
pub mod error;
pub mod models;

pub use announcer::*;
pub use coordinator::*;
pub use error::*;
pub use models::*;
