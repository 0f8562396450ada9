use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_derive_error::ErrorResponse;
use common::ledger::{LedgerError, VerificationFailure};
use db::{contract, DbErr, EntityTrait};
use derive_more::{Display, Error, From};
use serde::Serialize;

use super::ContractsState;

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum VerifyError {
    DatabaseError(DbErr),

    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "contract not found")]
    ContractNotFound,

    #[status(StatusCode::CONFLICT)]
    #[display(fmt = "contract was not anchored yet")]
    NotAnchored,

    #[status(StatusCode::BAD_GATEWAY)]
    #[display(fmt = "ledger is unavailable: {}", _0)]
    LedgerUnavailable(LedgerError),
}

/// Verification report in the field layout integrity clients consume.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct VerifyResponse {
    /// Whether the current contract data still hashes to the digest
    /// recorded on the ledger.
    is_valid: bool,

    /// Digest recomputed from the stored contract data.
    current_hash: String,

    /// Digest read back from the anchoring transaction.
    blockchain_hash: Option<String>,

    /// Digest stored at completion time.
    original_hash: String,

    anchor_tx: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<VerificationFailure>,
}

/// Recompute the contract digest and compare it with the ledger record.
pub(super) async fn verify(
    Path(id): Path<i64>,
    State((db, ledger)): State<ContractsState>,
) -> Result<Json<VerifyResponse>, VerifyError> {
    let contract = contract::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or(VerifyError::ContractNotFound)?;

    let (Some(anchor_tx), Some(original_hash)) =
        (contract.anchor_tx.clone(), contract.content_hash.clone())
    else {
        return Err(VerifyError::NotAnchored);
    };

    let current_hash = contract.content().digest();

    let verification = ledger.verify_digest(&anchor_tx, &current_hash).await?;

    Ok(Json(VerifyResponse {
        is_valid: verification.matches,
        current_hash,
        blockchain_hash: verification.blockchain_hash,
        original_hash,
        anchor_tx,
        error: verification.error,
    }))
}
