//! Voting engine
//!
//! Drives the per-proposal state machine:
//!
//! ```text
//! Pending --[vote reaches threshold before expiry]--> Executed
//! Pending --[any vote call at or after expiresAt]---> Failed
//! ```
//!
//! Every call either commits all of its effects or none of them. The single
//! exception is expiry: a vote that observes an elapsed deadline commits the
//! Failed transition and its notification, then reports `ProposalExpired`.

use crate::error::GovernanceError;
use crate::governance::events::GovernanceEvent;
use crate::governance::signers::SignerRegistry;
use crate::identity::Address;
use crate::proposal::{ChangeSet, Proposal, ProposalId, ProposalStatus, ProposalStore};
use crate::registry::CutExecutor;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub struct VotingEngine<E: CutExecutor> {
    signers: Arc<SignerRegistry>,
    store: ProposalStore,
    executor: E,
    /// Cleared permanently once control is relinquished
    authority: bool,
}

impl<E: CutExecutor> VotingEngine<E> {
    pub fn new(signers: Arc<SignerRegistry>, executor: E, expiration: Duration) -> Self {
        Self {
            signers,
            store: ProposalStore::new(expiration),
            executor,
            authority: true,
        }
    }

    pub fn has_authority(&self) -> bool {
        self.authority
    }

    /// Permanently strip cut authority. Idempotent.
    pub fn revoke_authority(&mut self) {
        if self.authority {
            warn!("Cut authority revoked; proposals can no longer be created or executed");
        }
        self.authority = false;
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn store(&self) -> &ProposalStore {
        &self.store
    }

    pub fn proposal_expiration(&self) -> Duration {
        self.store.expiration()
    }

    fn ensure_authority(&self) -> Result<(), GovernanceError> {
        if self.authority {
            Ok(())
        } else {
            Err(GovernanceError::CutControlRelinquished)
        }
    }

    /// Proposal creation checks, in order: authority, then signer.
    fn authorize(&self, signer: &Address) -> Result<(), GovernanceError> {
        self.ensure_authority()?;
        self.signers.ensure_signer(signer)
    }

    /// Create a proposal carrying the proposer's vote. With a threshold of
    /// one the proposal is executed before this returns.
    pub fn propose_cut(
        &mut self,
        signer: Address,
        change_set: ChangeSet,
        now: DateTime<Utc>,
        outbox: &mut Vec<GovernanceEvent>,
    ) -> Result<ProposalId, GovernanceError> {
        if let Err(e) = self.authorize(&signer) {
            debug!("Rejected proposal from {}: {}", signer, e);
            return Err(e);
        }

        let summary = change_set.summary();
        let description = change_set.description();
        let id = self.store.create(signer, change_set, now)?;

        let mut staged = vec![GovernanceEvent::NewProposal {
            proposal_id: id,
            proposer: signer,
            summary,
        }];
        if let Err(e) = self.register_vote(id, signer, now, &mut staged) {
            self.store.abandon(id);
            return Err(e);
        }

        info!("Created proposal {} by {}: {}", id, signer, description);
        outbox.append(&mut staged);
        Ok(id)
    }

    /// Cast `signer`'s vote on `id`.
    ///
    /// Checks, first failure wins: signer, existence, Pending, deadline
    /// (commits Failed), authority, duplicate vote. Expiry is still
    /// materialized after control has been relinquished.
    pub fn vote_on_cut(
        &mut self,
        signer: Address,
        id: ProposalId,
        now: DateTime<Utc>,
        outbox: &mut Vec<GovernanceEvent>,
    ) -> Result<ProposalStatus, GovernanceError> {
        self.signers.ensure_signer(&signer)?;

        let proposal = self.store.get(id)?;
        if proposal.status != ProposalStatus::Pending {
            return Err(GovernanceError::ProposalAlreadyResolved {
                id,
                status: proposal.status,
            });
        }
        if proposal.is_expired_at(now) {
            self.store.set_status(id, ProposalStatus::Failed, now)?;
            outbox.push(GovernanceEvent::ProposalFailed { proposal_id: id });
            warn!("Proposal {} expired; marked failed on vote by {}", id, signer);
            return Err(GovernanceError::ProposalExpired(id));
        }
        self.ensure_authority()?;
        if proposal.has_voted(&signer) {
            return Err(GovernanceError::AlreadyVoted { signer });
        }

        let mut staged = Vec::new();
        let status = self.register_vote(id, signer, now, &mut staged)?;
        outbox.append(&mut staged);
        Ok(status)
    }

    /// Record a validated vote and execute when the threshold is met.
    ///
    /// The executor runs before any state changes so that its failure
    /// leaves the proposal exactly as it was.
    fn register_vote(
        &mut self,
        id: ProposalId,
        signer: Address,
        now: DateTime<Utc>,
        staged: &mut Vec<GovernanceEvent>,
    ) -> Result<ProposalStatus, GovernanceError> {
        let proposal = self.store.get(id)?;
        let reaches_threshold = proposal.vote_count() + 1 >= self.signers.threshold();

        if reaches_threshold {
            if let Err(source) = self.executor.apply_registry_change(&proposal.change_set) {
                error!("Cut executor rejected proposal {}: {}", id, source);
                return Err(GovernanceError::ExecutionFailed { id, source });
            }
        }

        let count = self.store.record_vote(id, signer)?;
        staged.push(GovernanceEvent::VoteRegistered {
            proposal_id: id,
            signer,
        });
        debug!("Vote {} of {} on proposal {} from {}", count, self.signers.threshold(), id, signer);

        if reaches_threshold {
            self.store.set_status(id, ProposalStatus::Executed, now)?;
            staged.push(GovernanceEvent::ProposalExecuted { proposal_id: id });
            info!("Proposal {} executed with {} vote(s)", id, count);
            return Ok(ProposalStatus::Executed);
        }
        Ok(ProposalStatus::Pending)
    }

    /// Materialize Failed for every Pending proposal past its deadline.
    pub fn sweep_expired(&mut self, now: DateTime<Utc>, outbox: &mut Vec<GovernanceEvent>) -> Vec<ProposalId> {
        let expired = self.store.expired_pending(now);
        for id in &expired {
            // Ids come from the store and are Pending, so this cannot fail
            if self.store.set_status(*id, ProposalStatus::Failed, now).is_ok() {
                outbox.push(GovernanceEvent::ProposalFailed { proposal_id: *id });
            }
        }
        if !expired.is_empty() {
            info!("Swept {} expired proposal(s)", expired.len());
        }
        expired
    }

    pub fn get_proposal(&self, id: ProposalId) -> Result<&Proposal, GovernanceError> {
        self.store.get(id)
    }

    /// False for unknown ids and non-signers alike
    pub fn get_vote_status(&self, id: ProposalId, signer: &Address) -> bool {
        self.store.get(id).map_or(false, |p| p.has_voted(signer))
    }
}
