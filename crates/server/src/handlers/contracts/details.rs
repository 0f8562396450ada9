use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_derive_error::ErrorResponse;
use db::{contract, DbErr, EntityTrait};
use derive_more::{Display, Error, From};

use super::{ContractData, ContractsState};

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum ContractDetailsError {
    DatabaseError(DbErr),

    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "contract not found")]
    ContractNotFound,
}

pub(super) async fn details(
    Path(id): Path<i64>,
    State((db, _)): State<ContractsState>,
) -> Result<Json<ContractData>, ContractDetailsError> {
    let contract = contract::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or(ContractDetailsError::ContractNotFound)?;

    Ok(Json(ContractData::from(contract)))
}
