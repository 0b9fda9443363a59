//! CutGate - multi-signer governance for upgradeable facet registries
//!
//! Signers propose registry cuts and vote on them. A proposal that gathers
//! the threshold before its deadline is handed to the cut executor exactly
//! once; one that misses its deadline fails the next time it is touched.
//! A separate threshold vote permanently relinquishes cut control.

pub mod config;
pub mod error;
pub mod governance;
pub mod identity;
pub mod models;
pub mod proposal;
pub mod registry;
pub mod routes;
pub mod state;

pub use error::{AppError, ExecutorError, GovernanceError};
pub use governance::{Clock, CutGate, GovernanceEvent, ManualClock, SystemClock};
pub use identity::{Address, Selector};
pub use proposal::{ChangeSet, FacetCut, FacetCutAction, InitCall, Proposal, ProposalId, ProposalStatus};
pub use registry::{CutExecutor, FacetRegistry};
