//! Call analysis aggregation for CareReach Engine
//!
//! Each outreach call produces a structured analysis from an upstream
//! transcription/analysis collaborator: barriers to care, recommendations,
//! key moments, follow-ups, and a summary. This module merges that analysis
//! into the patient's call record:
//!
//! - Barrier codes union into the call's identified set (no duplicates)
//! - Recommendations and the summary finalize the call; a finalized call is
//!   immutable and rejects further aggregation
//! - A pluggable stage policy turns analysis signals into pipeline
//!   stage-transition requests, which are returned to the caller rather
//!   than applied directly
//! - The patient's SDOH risk score is recomputed from the enrichment
//!   snapshot under configurable weights
//! - Key moments are ordered into a deterministic timeline for display
//!
//! # Example
//!
//! ```rust,no_run
//! use call_analysis::{Aggregator, Call, CallAnalysis};
//! use engagement_pipeline::Patient;
//!
//! # fn example(analysis: CallAnalysis) -> Result<(), call_analysis::AnalysisError> {
//! let aggregator = Aggregator::default();
//! let mut patient = Patient::new("MRN-1001");
//! let mut call = Call::new(patient.id, 600);
//!
//! let outcome = aggregator.aggregate(&mut patient, &mut call, analysis)?;
//! for _request in &outcome.stage_requests {
//!     // apply through engagement_pipeline::StateMachine
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod analysis;
pub mod error;
pub mod models;
pub mod policy;
pub mod scoring;
pub mod timeline;

pub use aggregator::*;
pub use analysis::*;
pub use error::*;
pub use models::*;
pub use policy::*;
pub use scoring::*;
pub use timeline::*;
