//! Proposal data models
//!
//! Defines the structure of a registry change proposal and its lifecycle state.

use crate::identity::Address;
use crate::proposal::ChangeSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Monotonic proposal identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProposalId(pub u64);

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProposalId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(ProposalId)
    }
}

/// Proposal status in the governance workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    /// Collecting votes
    #[default]
    Pending,
    /// Threshold reached and the change set applied
    Executed,
    /// Deadline passed before the threshold was reached
    Failed,
}

impl ProposalStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProposalStatus::Pending)
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProposalStatus::Pending => "pending",
            ProposalStatus::Executed => "executed",
            ProposalStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

impl FromStr for ProposalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(ProposalStatus::Pending),
            "executed" => Ok(ProposalStatus::Executed),
            "failed" => Ok(ProposalStatus::Failed),
            other => Err(format!("Unknown proposal status '{}'", other)),
        }
    }
}

/// A proposed registry change and its vote ledger. Only the store builds
/// one, so `vote_count` always matches `voters`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: ProposalId,
    pub proposer: Address,
    pub change_set: ChangeSet,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub status: ProposalStatus,
    /// Signers that voted for this proposal
    voters: BTreeSet<Address>,
    /// Always equal to `voters.len()`
    vote_count: usize,
    /// When the status left Pending
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Proposal {
    pub(crate) fn new(
        id: ProposalId,
        proposer: Address,
        change_set: ChangeSet,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            proposer,
            change_set,
            created_at,
            expires_at,
            status: ProposalStatus::Pending,
            voters: BTreeSet::new(),
            vote_count: 0,
            resolved_at: None,
        }
    }

    pub fn voters(&self) -> impl Iterator<Item = &Address> {
        self.voters.iter()
    }

    pub fn vote_count(&self) -> usize {
        self.vote_count
    }

    pub fn has_voted(&self, signer: &Address) -> bool {
        self.voters.contains(signer)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Status as observed at `now`, counting an elapsed deadline as failure
    /// even if no call has materialized it yet.
    pub fn effective_status(&self, now: DateTime<Utc>) -> ProposalStatus {
        if self.status == ProposalStatus::Pending && self.is_expired_at(now) {
            ProposalStatus::Failed
        } else {
            self.status
        }
    }

    /// Returns false if the signer was already present.
    pub(crate) fn insert_voter(&mut self, signer: Address) -> bool {
        let inserted = self.voters.insert(signer);
        self.vote_count = self.voters.len();
        inserted
    }
}
