use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_derive_error::ErrorResponse;
use db::{
    contract, ActiveModelTrait, ActiveValue, DbErr, EntityTrait, TransactionErrorExt,
    TransactionTrait,
};
use derive_more::{Display, Error, From};
use serde::Deserialize;
use validator::Validate;

use super::{ContractData, ContractsState};
use crate::validation::ValidatedJson;

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum EmployerSignError {
    DatabaseError(DbErr),

    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "contract not found")]
    ContractNotFound,

    #[status(StatusCode::CONFLICT)]
    #[display(fmt = "contract was already signed by the employer")]
    AlreadySigned,
}

#[derive(Deserialize, Validate)]
pub(super) struct EmployerSignRequest {
    /// Signature image as a data URL.
    #[validate(length(min = 1))]
    signature: String,
}

/// Record the employer signature and send the contract to the worker.
pub(super) async fn employer_sign(
    Path(id): Path<i64>,
    State((db, _)): State<ContractsState>,
    ValidatedJson(request): ValidatedJson<EmployerSignRequest>,
) -> Result<Json<ContractData>, EmployerSignError> {
    db.transaction(|txn| {
        Box::pin(async move {
            let contract = contract::Entity::find_by_id(id)
                .one(txn)
                .await?
                .ok_or(EmployerSignError::ContractNotFound)?;

            if contract.status != contract::Status::Draft {
                return Err(EmployerSignError::AlreadySigned);
            }

            let updated = contract::ActiveModel {
                id: ActiveValue::Unchanged(contract.id),
                employer_sign: ActiveValue::Set(Some(request.signature)),
                status: ActiveValue::Set(contract::Status::Sent),
                ..Default::default()
            }
            .update(txn)
            .await?;

            Ok(Json(ContractData::from(updated)))
        })
    })
    .await
    .into_raw_result()
}
