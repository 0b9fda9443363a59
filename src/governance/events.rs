//! Governance notifications
//!
//! Engines stage notifications in an outbox while a call runs; the gate
//! commits them to the event log once the call's state changes are final.

use crate::identity::Address;
use crate::proposal::{ChangeSetSummary, ProposalId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Observable notifications
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GovernanceEvent {
    #[serde(rename_all = "camelCase")]
    NewProposal {
        proposal_id: ProposalId,
        proposer: Address,
        summary: ChangeSetSummary,
    },
    #[serde(rename_all = "camelCase")]
    VoteRegistered {
        proposal_id: ProposalId,
        signer: Address,
    },
    #[serde(rename_all = "camelCase")]
    ProposalExecuted { proposal_id: ProposalId },
    #[serde(rename_all = "camelCase")]
    ProposalFailed { proposal_id: ProposalId },
    #[serde(rename_all = "camelCase")]
    RelinquishVoteRegistered { signer: Address },
    ControlRelinquished,
}

impl GovernanceEvent {
    pub fn name(&self) -> &'static str {
        match self {
            GovernanceEvent::NewProposal { .. } => "NewProposal",
            GovernanceEvent::VoteRegistered { .. } => "VoteRegistered",
            GovernanceEvent::ProposalExecuted { .. } => "ProposalExecuted",
            GovernanceEvent::ProposalFailed { .. } => "ProposalFailed",
            GovernanceEvent::RelinquishVoteRegistered { .. } => "RelinquishVoteRegistered",
            GovernanceEvent::ControlRelinquished => "ControlRelinquished",
        }
    }
}

/// Committed notification
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: Uuid,
    pub sequence: u64,
    pub recorded_at: DateTime<Utc>,
    pub event: GovernanceEvent,
}

/// Append-only notification stream
#[derive(Debug, Default)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit staged notifications in order
    pub fn publish(&mut self, staged: Vec<GovernanceEvent>, at: DateTime<Utc>) {
        for event in staged {
            let sequence = self.records.len() as u64 + 1;
            info!(sequence, event = event.name(), "{:?}", event);
            self.records.push(EventRecord {
                id: Uuid::new_v4(),
                sequence,
                recorded_at: at,
                event,
            });
        }
    }

    /// Records with a sequence number greater than `after`
    pub fn since(&self, after: u64) -> &[EventRecord] {
        let start = (after as usize).min(self.records.len());
        &self.records[start..]
    }

    pub fn events(&self) -> impl Iterator<Item = &GovernanceEvent> {
        self.records.iter().map(|r| &r.event)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
