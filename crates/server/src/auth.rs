use std::sync::Arc;

use axum::{
    extract::State,
    headers::{authorization::Bearer, Authorization},
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
    TypedHeader,
};
use axum_derive_error::ErrorResponse;
use db::{
    company, token, user, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QuerySelect, TransactionErrorExt, TransactionTrait,
};
use derive_more::{Display, Error, From};

/// Identity attached to a request after token authentication.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct CurrentUser {
    pub user_id: i64,
    pub company_id: i64,
    pub role: user::Role,
}

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum AuthenticationError {
    DatabaseError(DbErr),

    #[status(StatusCode::FORBIDDEN)]
    #[display(fmt = "invalid authentication token was provided")]
    InvalidAuthenticationToken,

    #[status(StatusCode::FORBIDDEN)]
    #[display(fmt = "super admin role is required to access")]
    SuperAdminRequired,

    #[status(StatusCode::FORBIDDEN)]
    #[display(fmt = "company is suspended")]
    CompanySuspended,
}

pub(super) async fn require_authentication<
    const REQUIRE_SUPER_ADMIN: bool,
    const REQUIRE_ACTIVE_COMPANY: bool,
    B,
>(
    State(db): State<Arc<DatabaseConnection>>,
    TypedHeader(authorization): TypedHeader<Authorization<Bearer>>,
    mut req: Request<B>,
    next: Next<B>,
) -> Result<Response, AuthenticationError> {
    let current_user = db
        .transaction::<_, _, AuthenticationError>(|txn| {
            Box::pin(async move {
                let bearer = authorization.token();

                let user_id: i64 = token::Entity::find()
                    .select_only()
                    .column(token::Column::UserId)
                    .filter(token::Column::Token.eq(bearer))
                    .into_tuple()
                    .one(txn)
                    .await?
                    .ok_or(AuthenticationError::InvalidAuthenticationToken)?;

                let (company_id, role): (i64, user::Role) = user::Entity::find_by_id(user_id)
                    .select_only()
                    .columns([user::Column::CompanyId, user::Column::Role])
                    .into_tuple()
                    .one(txn)
                    .await?
                    .ok_or(AuthenticationError::InvalidAuthenticationToken)?;

                if REQUIRE_SUPER_ADMIN && role != user::Role::SuperAdmin {
                    return Err(AuthenticationError::SuperAdminRequired);
                }

                // Suspension locks company admins out of changes while
                // super admins stay unaffected.
                if REQUIRE_ACTIVE_COMPANY && role == user::Role::CompanyAdmin {
                    let status: Option<company::Status> = company::Entity::find_by_id(company_id)
                        .select_only()
                        .column(company::Column::Status)
                        .into_tuple()
                        .one(txn)
                        .await?;

                    if status != Some(company::Status::Active) {
                        return Err(AuthenticationError::CompanySuspended);
                    }
                }

                Ok(CurrentUser {
                    user_id,
                    company_id,
                    role,
                })
            })
        })
        .await
        .into_raw_result()?;

    req.extensions_mut().insert(current_user);

    Ok(next.run(req).await)
}
