//! Round transition management.
//!
//! Phases follow the round number; each round gets a plan, its exchanges
//! are evaluated against six signals, and the outcome says whether the
//! discussion should keep exploring.

pub mod manager;
pub mod plan;
pub mod record;
pub mod transition;

pub use manager::{RoundOutcome, RoundTransitionManager};
pub use plan::{RoundPhase, RoundPlan};
pub use record::{Exchange, RoundHistory, RoundMetrics, RoundRecord};
pub use transition::{
    DepthRequirement, RoundAssessment, RoundInput, RoundPolicy, TransitionEvaluation,
    TransitionReason,
};
