use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_derive_error::ErrorResponse;
use common::ledger::LedgerError;
use db::{
    contract, ActiveModelTrait, ActiveValue, DbErr, EntityTrait, TransactionErrorExt,
    TransactionTrait,
};
use derive_more::{Display, Error, From};
use serde::Deserialize;
use validator::Validate;

use super::{anchor_contract, AnchorFailure, ContractData, ContractsState};
use crate::validation::ValidatedJson;

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum WorkerSignError {
    DatabaseError(DbErr),

    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "contract not found")]
    ContractNotFound,

    #[status(StatusCode::CONFLICT)]
    #[display(fmt = "contract was not sent by the employer yet")]
    NotSentYet,

    #[status(StatusCode::CONFLICT)]
    #[display(fmt = "contract was already signed by the worker")]
    AlreadySigned,

    // The signature is kept; anchoring can be retried separately.
    #[status(StatusCode::BAD_GATEWAY)]
    #[display(fmt = "contract was signed but anchoring failed, retry later: {}", _0)]
    AnchoringFailed(LedgerError),
}

#[derive(Deserialize, Validate)]
pub(super) struct WorkerSignRequest {
    /// Signature image as a data URL.
    #[validate(length(min = 1))]
    signature: String,
}

/// Record the worker signature and anchor the completed contract.
///
/// The signature is committed before anchoring starts. When the ledger
/// submission fails, the contract stays in the signed state and the
/// response tells the caller to retry the anchoring step.
pub(super) async fn worker_sign(
    Path(id): Path<i64>,
    State((db, ledger)): State<ContractsState>,
    ValidatedJson(request): ValidatedJson<WorkerSignRequest>,
) -> Result<Json<ContractData>, WorkerSignError> {
    let contract = db
        .transaction::<_, _, WorkerSignError>(|txn| {
            Box::pin(async move {
                let contract = contract::Entity::find_by_id(id)
                    .one(txn)
                    .await?
                    .ok_or(WorkerSignError::ContractNotFound)?;

                match contract.status {
                    contract::Status::Sent => {}
                    contract::Status::Draft => return Err(WorkerSignError::NotSentYet),
                    contract::Status::Signed | contract::Status::Completed => {
                        return Err(WorkerSignError::AlreadySigned)
                    }
                }

                let updated = contract::ActiveModel {
                    id: ActiveValue::Unchanged(contract.id),
                    worker_sign: ActiveValue::Set(Some(request.signature)),
                    signed_at: ActiveValue::Set(Some(db::now())),
                    status: ActiveValue::Set(contract::Status::Signed),
                    ..Default::default()
                }
                .update(txn)
                .await?;

                Ok(updated)
            })
        })
        .await
        .into_raw_result()?;

    match anchor_contract(&db, ledger.as_ref(), contract).await {
        Ok(contract) => Ok(Json(ContractData::from(contract))),
        Err(AnchorFailure::Ledger(err)) => Err(WorkerSignError::AnchoringFailed(err)),
        Err(AnchorFailure::Database(err)) => Err(WorkerSignError::DatabaseError(err)),
        Err(AnchorFailure::NotSigned) => Err(WorkerSignError::AlreadySigned),
        Err(AnchorFailure::Vanished) => Err(WorkerSignError::ContractNotFound),
    }
}
