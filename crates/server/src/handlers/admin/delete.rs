use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension,
};
use axum_derive_error::ErrorResponse;
use db::{contract, DatabaseConnection, DbErr, EntityTrait, ModelTrait};
use derive_more::{Display, Error, From};

use crate::auth::CurrentUser;

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum ContractDeleteError {
    DatabaseError(DbErr),

    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "contract not found")]
    ContractNotFound,

    #[status(StatusCode::FORBIDDEN)]
    #[display(fmt = "contract belongs to another company")]
    ForeignContract,

    // Anything past the draft state carries at least one signature and
    // is retained as evidence.
    #[status(StatusCode::CONFLICT)]
    #[display(fmt = "only draft contracts can be deleted")]
    NotADraft,
}

pub(super) async fn delete(
    Path(id): Path<i64>,
    State(db): State<Arc<DatabaseConnection>>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<StatusCode, ContractDeleteError> {
    let contract = contract::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or(ContractDeleteError::ContractNotFound)?;

    if contract.company_id != current_user.company_id {
        return Err(ContractDeleteError::ForeignContract);
    }

    if contract.status != contract::Status::Draft {
        return Err(ContractDeleteError::NotADraft);
    }

    contract.delete(&*db).await?;

    Ok(StatusCode::NO_CONTENT)
}
