//! Error handling module
//!
//! Governance errors raised by the gate, collaborator errors raised by the
//! cut executor, and the HTTP-facing `AppError` that wraps them.

use crate::identity::{Address, Selector};
use crate::proposal::{ProposalId, ProposalStatus};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Failure reported by the cut executor collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    #[error("Cut for facet {facet} has no selectors")]
    EmptySelectors { facet: Address },

    #[error("Cannot add/replace selectors using the null facet address")]
    NullFacet,

    #[error("Remove cut must use the null facet address, got {0}")]
    RemoveFacetNotNull(Address),

    #[error("Selector {0} is already bound")]
    SelectorExists(Selector),

    #[error("Selector {0} is not bound")]
    SelectorMissing(Selector),

    #[error("Selector {selector} is already bound to facet {facet}")]
    ReplaceWithSameFacet { selector: Selector, facet: Address },

    #[error("Init target is null but calldata is not empty")]
    InitCalldataWithoutTarget,

    #[error("Registry rejected change: {0}")]
    Rejected(String),
}

/// Every way a governance call can be refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    // Construction
    #[error("Signer list is empty")]
    EmptySignerList,

    #[error("Invalid vote threshold {threshold} for {signers} signer(s)")]
    InvalidVoteThreshold { threshold: usize, signers: usize },

    #[error("Duplicate signer {0}")]
    DuplicateSigner(Address),

    #[error("Null address is not allowed")]
    NullAddress,

    #[error("Proposal expiration window is out of range")]
    ExpirationOutOfRange,

    // Authorization
    #[error("{0} is not a signer")]
    NotASigner(Address),

    // Lookup
    #[error("Proposal not found")]
    ProposalNotFound,

    // State conflicts
    #[error("{signer} already voted")]
    AlreadyVoted { signer: Address },

    #[error("Proposal {id} is already {status}")]
    ProposalAlreadyResolved { id: ProposalId, status: ProposalStatus },

    #[error("Proposal {id} cannot move from {from} to {to}")]
    InvalidStateTransition {
        id: ProposalId,
        from: ProposalStatus,
        to: ProposalStatus,
    },

    #[error("Cut control has been relinquished")]
    CutControlRelinquished,

    // Temporal. The Failed transition is committed before this is returned.
    #[error("Proposal {0} expired")]
    ProposalExpired(ProposalId),

    // Collaborator. Nothing from the triggering call is committed.
    #[error("Execution of proposal {id} failed: {source}")]
    ExecutionFailed {
        id: ProposalId,
        #[source]
        source: ExecutorError,
    },
}

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Governance(#[from] GovernanceError),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

fn governance_status(err: &GovernanceError) -> (StatusCode, &'static str) {
    match err {
        GovernanceError::EmptySignerList
        | GovernanceError::InvalidVoteThreshold { .. }
        | GovernanceError::DuplicateSigner(_)
        | GovernanceError::NullAddress
        | GovernanceError::ExpirationOutOfRange => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
        GovernanceError::NotASigner(_) => (StatusCode::FORBIDDEN, "NOT_A_SIGNER"),
        GovernanceError::ProposalNotFound => (StatusCode::NOT_FOUND, "PROPOSAL_NOT_FOUND"),
        GovernanceError::AlreadyVoted { .. } => (StatusCode::CONFLICT, "ALREADY_VOTED"),
        GovernanceError::ProposalAlreadyResolved { .. } => {
            (StatusCode::CONFLICT, "PROPOSAL_ALREADY_RESOLVED")
        }
        GovernanceError::InvalidStateTransition { .. } => {
            (StatusCode::CONFLICT, "INVALID_STATE_TRANSITION")
        }
        GovernanceError::CutControlRelinquished => (StatusCode::CONFLICT, "CONTROL_RELINQUISHED"),
        GovernanceError::ProposalExpired(_) => (StatusCode::GONE, "PROPOSAL_EXPIRED"),
        GovernanceError::ExecutionFailed { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, "EXECUTION_FAILED")
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match &self {
            AppError::Governance(e) => {
                let (status, code) = governance_status(e);
                if let GovernanceError::ExecutionFailed { source, .. } = e {
                    error!("Cut execution failed: {}", source);
                    (status, code, e.to_string(), Some(source.to_string()))
                } else {
                    (status, code, e.to_string(), None)
                }
            }
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                msg.clone(),
                None,
            ),
        };

        let body = Json(ErrorResponse {
            success: false,
            message,
            error: details,
            code: Some(error_code.to_string()),
        });

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, AppError>;

/// Helper function to create a bad request error
pub fn bad_request(msg: impl Into<String>) -> AppError {
    AppError::BadRequest(msg.into())
}
