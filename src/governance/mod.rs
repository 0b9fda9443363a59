//! Governance core
//!
//! Signer validation, the cut-proposal voting engine, the relinquish vote,
//! and the gate that serializes calls over them.

pub mod clock;
pub mod engine;
pub mod events;
pub mod gate;
pub mod relinquish;
pub mod signers;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::VotingEngine;
pub use events::{EventLog, EventRecord, GovernanceEvent};
pub use gate::CutGate;
pub use relinquish::{RelinquishStatus, RelinquishVotingEngine};
pub use signers::SignerRegistry;
