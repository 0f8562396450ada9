use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use axum_derive_error::ErrorResponse;
use db::{
    company, token, user, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QuerySelect, SelectExt, TransactionErrorExt, TransactionTrait,
};
use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::ValidatedJson;

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum SignupError {
    DatabaseError(DbErr),

    HashingError(bcrypt::BcryptError),

    #[status(StatusCode::CONFLICT)]
    #[display(fmt = "a user with the provided email already exists")]
    DuplicateEmail,

    #[status(StatusCode::CONFLICT)]
    #[display(fmt = "a company with the provided business number already exists")]
    DuplicateBusinessNumber,
}

#[derive(Deserialize, Validate)]
pub(super) struct SignupRequest {
    #[validate(length(min = 1, max = 128))]
    company_name: String,

    #[validate(length(min = 1, max = 64))]
    ceo_name: String,

    #[validate(length(min = 1, max = 32))]
    business_number: String,

    #[validate(length(min = 1, max = 256))]
    address: String,

    #[validate(length(min = 1, max = 32))]
    phone: String,

    #[validate(email)]
    email: String,

    #[validate(length(min = 8, max = 128))]
    password: String,
}

#[derive(Serialize)]
pub(super) struct SignupResponse {
    token: String,
}

/// Register a company along with its first admin account.
pub(super) async fn signup(
    State(db): State<Arc<DatabaseConnection>>,
    ValidatedJson(request): ValidatedJson<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), SignupError> {
    let password = bcrypt::hash(&request.password, bcrypt::DEFAULT_COST)?;

    db.transaction(|txn| {
        Box::pin(async move {
            let email_taken = user::Entity::find()
                .select_only()
                .filter(user::Column::Email.eq(&request.email))
                .exists(txn)
                .await?;

            if email_taken {
                return Err(SignupError::DuplicateEmail);
            }

            let number_taken = company::Entity::find()
                .select_only()
                .filter(company::Column::BusinessNumber.eq(&request.business_number))
                .exists(txn)
                .await?;

            if number_taken {
                return Err(SignupError::DuplicateBusinessNumber);
            }

            let company = company::Entity::insert(company::ActiveModel {
                name: ActiveValue::Set(request.company_name),
                ceo_name: ActiveValue::Set(request.ceo_name),
                business_number: ActiveValue::Set(request.business_number),
                address: ActiveValue::Set(request.address),
                phone: ActiveValue::Set(request.phone),
                status: ActiveValue::Set(company::Status::Active),
                created_at: ActiveValue::Set(db::now()),
                ..Default::default()
            })
            .exec_with_returning(txn)
            .await?;

            let user = user::Entity::insert(user::ActiveModel {
                company_id: ActiveValue::Set(company.id),
                email: ActiveValue::Set(request.email),
                password: ActiveValue::Set(password),
                role: ActiveValue::Set(user::Role::CompanyAdmin),
                created_at: ActiveValue::Set(db::now()),
                ..Default::default()
            })
            .exec_with_returning(txn)
            .await?;

            let (active_model, token) = token::generate_token(user.id);

            token::Entity::insert(active_model)
                .exec_without_returning(txn)
                .await?;

            Ok((StatusCode::CREATED, Json(SignupResponse { token })))
        })
    })
    .await
    .into_raw_result()
}
