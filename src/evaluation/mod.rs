//! Delayed-validation evaluation.
//!
//! - **EvaluationSession**: one strategy + one quarantine; scores each
//!   forecast when its horizon elapses
//! - **LogScoreTracker**: lifetime and rolling mean log scores
//! - **TickSnapshot**: per-tick reporting view
//!
//! Scores are average log-likelihoods, a proper scoring rule: in expectation
//! only the true predictive distribution maximizes them.

mod score_tracker;
mod session;
mod snapshot;

pub use score_tracker::LogScoreTracker;
pub use session::{EvaluationSession, SessionConfig, SessionState};
pub use snapshot::TickSnapshot;
