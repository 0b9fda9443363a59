//! Governance gate
//!
//! Owns the signer registry, both voting engines, the clock and the event
//! log. Each mutating method is one transaction: it reads the clock once,
//! runs the engine call, and commits whatever notifications the engine staged.

use crate::error::GovernanceError;
use crate::governance::clock::Clock;
use crate::governance::engine::VotingEngine;
use crate::governance::events::{EventLog, EventRecord, GovernanceEvent};
use crate::governance::relinquish::{RelinquishStatus, RelinquishVotingEngine};
use crate::governance::signers::SignerRegistry;
use crate::identity::Address;
use crate::proposal::{ChangeSet, Proposal, ProposalId, ProposalStatus};
use crate::registry::CutExecutor;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

pub struct CutGate<E: CutExecutor, C: Clock> {
    signers: Arc<SignerRegistry>,
    voting: VotingEngine<E>,
    relinquish: RelinquishVotingEngine,
    clock: C,
    events: EventLog,
}

impl<E: CutExecutor, C: Clock> CutGate<E, C> {
    /// Deployment-time constructor. Fails without creating anything if the
    /// signer list, threshold or admin is invalid.
    pub fn new(
        signers: Vec<Address>,
        threshold: usize,
        admin: Address,
        expiration: Duration,
        executor: E,
        clock: C,
    ) -> Result<Self, GovernanceError> {
        let signers = Arc::new(SignerRegistry::new(signers, threshold, admin)?);
        Ok(Self {
            voting: VotingEngine::new(Arc::clone(&signers), executor, expiration),
            relinquish: RelinquishVotingEngine::new(Arc::clone(&signers)),
            signers,
            clock,
            events: EventLog::new(),
        })
    }

    fn commit<T>(&mut self, staged: Vec<GovernanceEvent>, at: DateTime<Utc>, result: T) -> T {
        self.events.publish(staged, at);
        result
    }

    pub fn propose_cut(&mut self, signer: Address, change_set: ChangeSet) -> Result<ProposalId, GovernanceError> {
        let now = self.clock.now();
        let mut staged = Vec::new();
        let result = self.voting.propose_cut(signer, change_set, now, &mut staged);
        self.commit(staged, now, result)
    }

    pub fn vote_on_cut(&mut self, signer: Address, id: ProposalId) -> Result<ProposalStatus, GovernanceError> {
        let now = self.clock.now();
        let mut staged = Vec::new();
        // Staged events survive an error only for expiry
        let result = self.voting.vote_on_cut(signer, id, now, &mut staged);
        self.commit(staged, now, result)
    }

    /// Vote using an id as received from a caller. A malformed id behaves
    /// exactly like an unknown one, after the signer check.
    pub fn vote_on_cut_str(&mut self, signer: Address, raw_id: &str) -> Result<ProposalStatus, GovernanceError> {
        match raw_id.parse::<ProposalId>() {
            Ok(id) => self.vote_on_cut(signer, id),
            Err(_) => {
                self.signers.ensure_signer(&signer)?;
                Err(GovernanceError::ProposalNotFound)
            }
        }
    }

    pub fn vote_to_relinquish_cut_control(&mut self, signer: Address) -> Result<bool, GovernanceError> {
        let now = self.clock.now();
        let mut staged = Vec::new();
        let result = self.relinquish.vote_to_relinquish_cut_control(signer, &mut staged);
        if let Ok(true) = result {
            self.voting.revoke_authority();
        }
        self.commit(staged, now, result)
    }

    /// Fail every Pending proposal whose deadline has passed
    pub fn sweep_expired(&mut self) -> Vec<ProposalId> {
        let now = self.clock.now();
        let mut staged = Vec::new();
        let swept = self.voting.sweep_expired(now, &mut staged);
        self.commit(staged, now, swept)
    }

    pub fn get_proposal(&self, id: ProposalId) -> Result<&Proposal, GovernanceError> {
        self.voting.get_proposal(id)
    }

    pub fn list_proposals(&self, status: Option<ProposalStatus>) -> Vec<&Proposal> {
        self.voting.store().list(status)
    }

    pub fn get_vote_status(&self, id: ProposalId, signer: &Address) -> bool {
        self.voting.get_vote_status(id, signer)
    }

    pub fn get_relinquish_vote_status(&self, signer: &Address) -> bool {
        self.relinquish.get_relinquish_vote_status(signer)
    }

    pub fn relinquish_status(&self) -> RelinquishStatus {
        self.relinquish.status()
    }

    pub fn is_relinquished(&self) -> bool {
        self.relinquish.is_relinquished()
    }

    pub fn vote_threshold(&self) -> usize {
        self.signers.threshold()
    }

    /// The fixed window between a proposal's creation and its deadline
    pub fn proposal_expiration(&self) -> Duration {
        self.voting.proposal_expiration()
    }

    pub fn signers(&self) -> &SignerRegistry {
        &self.signers
    }

    pub fn is_signer(&self, identity: &Address) -> bool {
        self.signers.is_signer(identity)
    }

    pub fn executor(&self) -> &E {
        self.voting.executor()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn events_since(&self, after: u64) -> &[EventRecord] {
        self.events.since(after)
    }
}
