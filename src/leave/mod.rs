//! Leave & coverage engine: request lifecycle, balance ledger, conflict
//! detection and substitute ranking.

pub mod binder;
pub mod clock;
pub mod conflict;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod ranker;
pub mod sources;
pub mod state;
pub mod store;
pub mod units;

pub use engine::{EngineSettings, LeaveEngine, NewLeaveRequest, ReviewDecision, SubstituteChoice};
pub use error::LeaveError;
