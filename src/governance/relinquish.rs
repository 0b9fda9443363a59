//! Relinquish vote
//!
//! Threshold vote, independent of any proposal, that permanently gives up
//! cut control. There is no payload and no deadline.

use crate::error::GovernanceError;
use crate::governance::events::GovernanceEvent;
use crate::governance::signers::SignerRegistry;
use crate::identity::Address;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Snapshot of the relinquish vote
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelinquishStatus {
    pub relinquished: bool,
    pub vote_count: usize,
    pub threshold: usize,
    pub voters: Vec<Address>,
}

pub struct RelinquishVotingEngine {
    signers: Arc<SignerRegistry>,
    voters: BTreeSet<Address>,
    relinquished: bool,
}

impl RelinquishVotingEngine {
    pub fn new(signers: Arc<SignerRegistry>) -> Self {
        Self {
            signers,
            voters: BTreeSet::new(),
            relinquished: false,
        }
    }

    /// Register a vote. Returns true if this vote relinquished control.
    pub fn vote_to_relinquish_cut_control(
        &mut self,
        signer: Address,
        outbox: &mut Vec<GovernanceEvent>,
    ) -> Result<bool, GovernanceError> {
        if self.relinquished {
            return Err(GovernanceError::CutControlRelinquished);
        }
        self.signers.ensure_signer(&signer)?;
        if self.voters.contains(&signer) {
            return Err(GovernanceError::AlreadyVoted { signer });
        }

        self.voters.insert(signer);
        outbox.push(GovernanceEvent::RelinquishVoteRegistered { signer });
        debug!(
            "Relinquish vote {} of {} from {}",
            self.voters.len(),
            self.signers.threshold(),
            signer
        );

        if self.voters.len() >= self.signers.threshold() {
            self.relinquished = true;
            outbox.push(GovernanceEvent::ControlRelinquished);
            warn!("Cut control relinquished by {} signer(s)", self.voters.len());
            return Ok(true);
        }
        Ok(false)
    }

    pub fn get_relinquish_vote_status(&self, signer: &Address) -> bool {
        self.voters.contains(signer)
    }

    pub fn is_relinquished(&self) -> bool {
        self.relinquished
    }

    pub fn vote_count(&self) -> usize {
        self.voters.len()
    }

    pub fn status(&self) -> RelinquishStatus {
        RelinquishStatus {
            relinquished: self.relinquished,
            vote_count: self.voters.len(),
            threshold: self.signers.threshold(),
            voters: self.voters.iter().copied().collect(),
        }
    }
}
