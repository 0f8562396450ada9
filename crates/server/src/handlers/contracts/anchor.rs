use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_derive_error::ErrorResponse;
use common::ledger::LedgerError;
use db::{contract, DbErr, EntityTrait};
use derive_more::{Display, Error, From};

use super::{anchor_contract, AnchorFailure, ContractData, ContractsState};

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum AnchorError {
    DatabaseError(DbErr),

    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "contract not found")]
    ContractNotFound,

    #[status(StatusCode::CONFLICT)]
    #[display(fmt = "contract was not signed by both parties yet")]
    NotSigned,

    #[status(StatusCode::BAD_GATEWAY)]
    #[display(fmt = "anchoring failed, retry later: {}", _0)]
    AnchoringFailed(LedgerError),
}

/// Retry anchoring for a signed contract.
///
/// Calling this on an already completed contract returns the stored
/// record unchanged, so a client that lost the original response can
/// safely repeat the call.
pub(super) async fn anchor(
    Path(id): Path<i64>,
    State((db, ledger)): State<ContractsState>,
) -> Result<Json<ContractData>, AnchorError> {
    let contract = contract::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or(AnchorError::ContractNotFound)?;

    match contract.status {
        contract::Status::Signed => {}
        contract::Status::Completed => return Ok(Json(ContractData::from(contract))),
        contract::Status::Draft | contract::Status::Sent => return Err(AnchorError::NotSigned),
    }

    match anchor_contract(&db, ledger.as_ref(), contract).await {
        Ok(contract) => Ok(Json(ContractData::from(contract))),
        Err(AnchorFailure::Ledger(err)) => Err(AnchorError::AnchoringFailed(err)),
        Err(AnchorFailure::Database(err)) => Err(AnchorError::DatabaseError(err)),
        Err(AnchorFailure::NotSigned) => Err(AnchorError::NotSigned),
        Err(AnchorFailure::Vanished) => Err(AnchorError::ContractNotFound),
    }
}
