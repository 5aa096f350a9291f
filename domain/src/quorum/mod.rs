//! Continuation consensus.
//!
//! After each iteration a diverse sample of models votes on whether the
//! discussion should go on. Votes are combined by confidence weighting and
//! checked against [`StopPolicy`].
//!
//! ```text
//! select_voters ─▶ ConsensusVote::parse (per model) ─▶ ContinuationTally ─▶ StopPolicy::evaluate
//! ```

pub mod tally;
pub mod vote;
pub mod voters;

pub use tally::{ContinuationTally, StopPolicy, StopReason};
pub use vote::ConsensusVote;
pub use voters::{DEFAULT_VOTER_LIMIT, select_voters};
