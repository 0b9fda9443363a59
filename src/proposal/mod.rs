//! Proposal module
//!
//! Registry change proposals, their change sets, and the store that owns them.

mod changes;
mod models;
mod store;

pub use changes::*;
pub use models::*;
pub use store::ProposalStore;
