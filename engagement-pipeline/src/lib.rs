//! Patient engagement lifecycle for CareReach Engine
//!
//! This module models a patient's position in the outreach pipeline and the
//! rules for moving between positions:
//! - Six engagement stages from first awareness through treatment churn
//! - Explicit transition rules (forward progress, risk branching, recovery)
//! - Append-only stage history for audit
//! - Transition requests as plain data, so upstream analysis can propose
//!   stage changes without applying them
//!
//! # Core Concepts
//!
//! - **Pipeline stage**: A patient's engagement position. The stage order is
//!   only used for progress display; legality of a move comes from the
//!   transition rule table, never from the ordinal.
//! - **Stage history**: Every applied transition is recorded with its reason
//!   and never rewritten.
//! - **Transition request**: "Move patient P to stage S because R" — produced
//!   by callers (e.g. call analysis) and validated here.
//!
//! # Example
//!
//! ```rust
//! use engagement_pipeline::{Patient, PipelineStage, StateMachine};
//!
//! let machine = StateMachine::new();
//! let mut patient = Patient::new("MRN-1001");
//!
//! machine.transition(&mut patient, PipelineStage::Start, "enrolled in transport program")?;
//! assert_eq!(patient.status, PipelineStage::Start);
//! assert_eq!(patient.stage_history.len(), 1);
//! # Ok::<(), engagement_pipeline::PipelineError>(())
//! ```

pub mod error;
pub mod models;
pub mod state_machine;

pub use error::*;
pub use models::*;
pub use state_machine::*;
