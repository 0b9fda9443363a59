//! Proposal storage
//!
//! Keyed collection of proposals. Owned exclusively by the voting engine;
//! callers serialize access to it, so the store itself needs no locking.

use crate::error::GovernanceError;
use crate::identity::Address;
use crate::proposal::{ChangeSet, Proposal, ProposalId, ProposalStatus};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

/// Proposal store with a monotonic id counter
#[derive(Debug)]
pub struct ProposalStore {
    proposals: BTreeMap<ProposalId, Proposal>,
    next_id: u64,
    expiration: Duration,
}

impl ProposalStore {
    pub fn new(expiration: Duration) -> Self {
        Self {
            proposals: BTreeMap::new(),
            next_id: 1,
            expiration,
        }
    }

    /// Fixed window between creation and expiry
    pub fn expiration(&self) -> Duration {
        self.expiration
    }

    /// Create a new pending proposal with an empty vote ledger. Fails,
    /// consuming no id, if the deadline is not representable.
    pub fn create(
        &mut self,
        proposer: Address,
        change_set: ChangeSet,
        now: DateTime<Utc>,
    ) -> Result<ProposalId, GovernanceError> {
        let expires_at = now
            .checked_add_signed(self.expiration)
            .ok_or(GovernanceError::ExpirationOutOfRange)?;
        let id = ProposalId(self.next_id);
        self.next_id += 1;
        let proposal = Proposal::new(id, proposer, change_set, now, expires_at);
        self.proposals.insert(id, proposal);
        Ok(id)
    }

    /// Undo a `create` whose enclosing call failed. Only the most recent,
    /// still-untouched proposal can be abandoned.
    pub(crate) fn abandon(&mut self, id: ProposalId) {
        let is_latest = id.0 + 1 == self.next_id;
        let untouched = self
            .proposals
            .get(&id)
            .map_or(false, |p| p.status == ProposalStatus::Pending && p.vote_count() == 0);
        if is_latest && untouched {
            self.proposals.remove(&id);
            self.next_id -= 1;
        }
    }

    /// Get a proposal by ID
    pub fn get(&self, id: ProposalId) -> Result<&Proposal, GovernanceError> {
        self.proposals.get(&id).ok_or(GovernanceError::ProposalNotFound)
    }

    /// Add a voter. Returns the new vote count.
    pub fn record_vote(&mut self, id: ProposalId, signer: Address) -> Result<usize, GovernanceError> {
        let proposal = self
            .proposals
            .get_mut(&id)
            .ok_or(GovernanceError::ProposalNotFound)?;
        if !proposal.insert_voter(signer) {
            return Err(GovernanceError::AlreadyVoted { signer });
        }
        Ok(proposal.vote_count())
    }

    /// One-way status transition out of Pending
    pub fn set_status(
        &mut self,
        id: ProposalId,
        status: ProposalStatus,
        now: DateTime<Utc>,
    ) -> Result<(), GovernanceError> {
        let proposal = self
            .proposals
            .get_mut(&id)
            .ok_or(GovernanceError::ProposalNotFound)?;
        if proposal.status.is_terminal() || !status.is_terminal() {
            return Err(GovernanceError::InvalidStateTransition {
                id,
                from: proposal.status,
                to: status,
            });
        }
        proposal.status = status;
        proposal.resolved_at = Some(now);
        Ok(())
    }

    /// List proposals in id order, optionally filtered by stored status
    pub fn list(&self, status: Option<ProposalStatus>) -> Vec<&Proposal> {
        self.proposals
            .values()
            .filter(|p| status.map_or(true, |s| p.status == s))
            .collect()
    }

    /// Pending proposals whose deadline has passed at `now`
    pub fn expired_pending(&self, now: DateTime<Utc>) -> Vec<ProposalId> {
        self.proposals
            .values()
            .filter(|p| p.status == ProposalStatus::Pending && p.is_expired_at(now))
            .map(|p| p.id)
            .collect()
    }

    /// Get proposal count
    pub fn count(&self) -> usize {
        self.proposals.len()
    }
}
