//! Proposal Routes
//!
//! Propose, vote on, and inspect registry cut proposals.

use crate::error::{bad_request, ApiResult, GovernanceError};
use crate::identity::Address;
use crate::models::{
    ProposalListQuery, ProposalListResponse, ProposalResponse, ProposalView, ProposeCutRequest,
    SuccessResponse, SweepResponse, VoteRequest, VoteStatusResponse,
};
use crate::proposal::{ProposalId, ProposalStatus};
use crate::state::SharedState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

fn parse_signer(raw: &str) -> ApiResult<Address> {
    raw.parse()
        .map_err(|e| bad_request(format!("Invalid signer address '{}': {}", raw, e)))
}

/// Create a new proposal
pub async fn propose_cut(
    State(state): State<SharedState>,
    Json(req): Json<ProposeCutRequest>,
) -> ApiResult<(StatusCode, Json<SuccessResponse<ProposalResponse>>)> {
    let mut gate = state.gate.write().await;
    let id = gate.propose_cut(req.signer, req.change_set)?;
    let proposal = ProposalView::new(gate.get_proposal(id)?, gate.now());

    let message = if proposal.proposal.status == ProposalStatus::Executed {
        "Proposal created and executed"
    } else {
        "Proposal created"
    };

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::with_data(message, ProposalResponse { proposal })),
    ))
}

/// List proposals
pub async fn list_proposals(
    State(state): State<SharedState>,
    Query(query): Query<ProposalListQuery>,
) -> ApiResult<Json<SuccessResponse<ProposalListResponse>>> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<ProposalStatus>)
        .transpose()
        .map_err(|e| bad_request(e))?;

    let gate = state.gate.read().await;
    let now = gate.now();
    let proposals: Vec<ProposalView> = gate
        .list_proposals(status)
        .into_iter()
        .map(|p| ProposalView::new(p, now))
        .collect();

    Ok(Json(SuccessResponse::with_data(
        format!("Found {} proposals", proposals.len()),
        ProposalListResponse { proposals },
    )))
}

/// Get a proposal by ID
pub async fn get_proposal(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SuccessResponse<ProposalResponse>>> {
    let id: ProposalId = id.parse().map_err(|_| GovernanceError::ProposalNotFound)?;
    let gate = state.gate.read().await;
    let proposal = ProposalView::new(gate.get_proposal(id)?, gate.now());

    Ok(Json(SuccessResponse::with_data("Proposal retrieved", ProposalResponse { proposal })))
}

/// Vote on a proposal
pub async fn vote_on_cut(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(req): Json<VoteRequest>,
) -> ApiResult<Json<SuccessResponse<ProposalResponse>>> {
    let mut gate = state.gate.write().await;
    let status = gate.vote_on_cut_str(req.signer, &id)?;

    // The id parsed, or the vote above would have failed
    let id: ProposalId = id.parse().map_err(|_| GovernanceError::ProposalNotFound)?;
    let proposal = ProposalView::new(gate.get_proposal(id)?, gate.now());

    let message = match status {
        ProposalStatus::Executed => "Vote registered; proposal executed",
        _ => "Vote registered",
    };
    Ok(Json(SuccessResponse::with_data(message, ProposalResponse { proposal })))
}

/// Whether a signer has voted on a proposal
pub async fn get_vote_status(
    State(state): State<SharedState>,
    Path((id, signer)): Path<(String, String)>,
) -> ApiResult<Json<SuccessResponse<VoteStatusResponse>>> {
    let signer = parse_signer(&signer)?;
    let gate = state.gate.read().await;
    let voted = match id.parse::<ProposalId>() {
        Ok(id) => gate.get_vote_status(id, &signer),
        Err(_) => false,
    };

    Ok(Json(SuccessResponse::with_data(
        "Vote status retrieved",
        VoteStatusResponse { signer, voted },
    )))
}

/// Fail every pending proposal past its deadline
pub async fn sweep_expired(
    State(state): State<SharedState>,
) -> ApiResult<Json<SuccessResponse<SweepResponse>>> {
    let mut gate = state.gate.write().await;
    let failed = gate.sweep_expired();

    Ok(Json(SuccessResponse::with_data(
        format!("Marked {} expired proposals as failed", failed.len()),
        SweepResponse { failed },
    )))
}
