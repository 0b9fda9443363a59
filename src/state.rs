//! Application state management
//!
//! The governance gate sits behind a single lock: mutating calls take the
//! write half so they run one at a time, queries share the read half.

use crate::config::GovernanceConfig;
use crate::error::GovernanceError;
use crate::governance::{Clock, CutGate, SystemClock};
use crate::registry::FacetRegistry;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Gate as deployed by the service
pub type Gate = CutGate<FacetRegistry, Arc<dyn Clock>>;

/// Application state shared across all handlers
pub struct AppState {
    pub gate: RwLock<Gate>,
}

impl AppState {
    /// Build the gate from configuration with the system clock
    pub fn new(config: &GovernanceConfig) -> Result<Self, GovernanceError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &GovernanceConfig, clock: Arc<dyn Clock>) -> Result<Self, GovernanceError> {
        let gate = CutGate::new(
            config.signers.clone(),
            config.vote_threshold,
            config.admin,
            config.proposal_expiration(),
            FacetRegistry::new(),
            clock,
        )?;
        Ok(Self {
            gate: RwLock::new(gate),
        })
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;
