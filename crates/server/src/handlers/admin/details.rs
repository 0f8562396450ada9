use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use axum_derive_error::ErrorResponse;
use db::{contract, DatabaseConnection, DbErr, EntityTrait};
use derive_more::{Display, Error, From};

use crate::{auth::CurrentUser, handlers::contracts::ContractData};

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum ContractDetailsError {
    DatabaseError(DbErr),

    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "contract not found")]
    ContractNotFound,

    #[status(StatusCode::FORBIDDEN)]
    #[display(fmt = "contract belongs to another company")]
    ForeignContract,
}

pub(super) async fn details(
    Path(id): Path<i64>,
    State(db): State<Arc<DatabaseConnection>>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<Json<ContractData>, ContractDetailsError> {
    let contract = contract::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or(ContractDetailsError::ContractNotFound)?;

    if contract.company_id != current_user.company_id {
        return Err(ContractDetailsError::ForeignContract);
    }

    Ok(Json(ContractData::from(contract)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::testing::{
        create_company_admin, create_contract, create_database, ResponseBodyExt,
    };

    use assert_json::assert_json;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use common::ledger::MockLedger;
    use db::contract;
    use tower::ServiceExt;

    fn details_request(token: &str, id: i64) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(format!("/admin/contracts/{id}"))
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn successful() {
        let db = Arc::new(create_database().await);

        let (company, token) = create_company_admin(&db).await;
        let contract = create_contract(&db, company.id, contract::Status::Draft).await;

        let response = crate::app_router(db, Arc::new(MockLedger::funded()))
            .oneshot(details_request(&token, contract.id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        assert_json!(response.json().await, {
            "id": contract.id,
            "company_id": company.id,
        });
    }

    #[tokio::test]
    async fn rejects_foreign_contract() {
        let db = Arc::new(create_database().await);

        let (_, token) = create_company_admin(&db).await;
        let (other_company, _) = create_company_admin(&db).await;

        let foreign = create_contract(&db, other_company.id, contract::Status::Draft).await;

        let response = crate::app_router(db, Arc::new(MockLedger::funded()))
            .oneshot(details_request(&token, foreign.id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
