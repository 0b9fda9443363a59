//! Data models and DTOs (Data Transfer Objects)
//!
//! Request/response structures used by the API.

use crate::governance::RelinquishStatus;
use crate::identity::Address;
use crate::proposal::{ChangeSet, Proposal, ProposalStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Generic success response
#[derive(Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub data: Option<T>,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

// =============================================================================
// REQUESTS
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposeCutRequest {
    pub signer: Address,
    pub change_set: ChangeSet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub signer: Address,
}

#[derive(Debug, Deserialize)]
pub struct ProposalListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    #[serde(default)]
    pub since: u64,
}

// =============================================================================
// RESPONSES
// =============================================================================

/// Stored proposal plus the status it has at read time
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalView {
    #[serde(flatten)]
    pub proposal: Proposal,
    pub effective_status: ProposalStatus,
}

impl ProposalView {
    pub fn new(proposal: &Proposal, now: DateTime<Utc>) -> Self {
        Self {
            proposal: proposal.clone(),
            effective_status: proposal.effective_status(now),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalResponse {
    pub proposal: ProposalView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalListResponse {
    pub proposals: Vec<ProposalView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteStatusResponse {
    pub signer: Address,
    pub voted: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepResponse {
    pub failed: Vec<crate::proposal::ProposalId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelinquishResponse {
    pub relinquish: RelinquishStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GovernanceInfoResponse {
    pub signers: Vec<Address>,
    pub admin: Address,
    pub vote_threshold: usize,
    pub proposal_expiration_secs: i64,
    pub relinquish: RelinquishStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsResponse {
    pub events: Vec<crate::governance::EventRecord>,
}
