//! Relinquish Routes
//!
//! The one-way vote that gives up cut control.

use crate::error::{bad_request, ApiResult};
use crate::identity::Address;
use crate::models::{RelinquishResponse, SuccessResponse, VoteRequest, VoteStatusResponse};
use crate::state::SharedState;
use axum::{
    extract::{Path, State},
    Json,
};

/// Current relinquish tally
pub async fn relinquish_status(
    State(state): State<SharedState>,
) -> ApiResult<Json<SuccessResponse<RelinquishResponse>>> {
    let gate = state.gate.read().await;
    Ok(Json(SuccessResponse::with_data(
        "Relinquish status retrieved",
        RelinquishResponse {
            relinquish: gate.relinquish_status(),
        },
    )))
}

/// Vote to relinquish cut control
pub async fn vote_to_relinquish(
    State(state): State<SharedState>,
    Json(req): Json<VoteRequest>,
) -> ApiResult<Json<SuccessResponse<RelinquishResponse>>> {
    let mut gate = state.gate.write().await;
    let relinquished = gate.vote_to_relinquish_cut_control(req.signer)?;

    let message = if relinquished {
        "Vote registered; control relinquished"
    } else {
        "Vote registered"
    };
    Ok(Json(SuccessResponse::with_data(
        message,
        RelinquishResponse {
            relinquish: gate.relinquish_status(),
        },
    )))
}

/// Whether a signer has voted to relinquish
pub async fn get_relinquish_vote_status(
    State(state): State<SharedState>,
    Path(signer): Path<String>,
) -> ApiResult<Json<SuccessResponse<VoteStatusResponse>>> {
    let signer: Address = signer
        .parse()
        .map_err(|e| bad_request(format!("Invalid signer address '{}': {}", signer, e)))?;
    let gate = state.gate.read().await;

    Ok(Json(SuccessResponse::with_data(
        "Relinquish vote status retrieved",
        VoteStatusResponse {
            signer,
            voted: gate.get_relinquish_vote_status(&signer),
        },
    )))
}
