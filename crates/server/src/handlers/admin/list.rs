use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use axum_derive_error::ErrorResponse;
use db::{
    contract, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};

use crate::{auth::CurrentUser, handlers::contracts::ContractData, pagination::Pagination};

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum ContractListError {
    DatabaseError(DbErr),
}

#[derive(Deserialize)]
pub(super) struct ContractFilter {
    #[serde(default)]
    status: Option<contract::Status>,

    #[serde(default)]
    contract_type: Option<contract::Kind>,

    /// Substring match against worker names.
    #[serde(default)]
    search: Option<String>,
}

#[derive(Serialize)]
pub(super) struct ContractListResponse {
    contracts: Vec<ContractData>,
    total: u64,
    page: u64,
}

pub(super) async fn list(
    State(db): State<Arc<DatabaseConnection>>,
    Extension(current_user): Extension<CurrentUser>,
    Query(pagination): Query<Pagination>,
    Query(filter): Query<ContractFilter>,
) -> Result<Json<ContractListResponse>, ContractListError> {
    let mut query = contract::Entity::find()
        .filter(contract::Column::CompanyId.eq(current_user.company_id));

    if let Some(status) = filter.status {
        query = query.filter(contract::Column::Status.eq(status));
    }

    if let Some(contract_type) = filter.contract_type {
        query = query.filter(contract::Column::ContractType.eq(contract_type));
    }

    if let Some(search) = &filter.search {
        query = query.filter(contract::Column::WorkerName.contains(search));
    }

    let total = query.clone().count(&*db).await?;

    let contracts = query
        .order_by_desc(contract::Column::CreatedAt)
        .limit(pagination.limit())
        .offset(pagination.offset())
        .all(&*db)
        .await?
        .into_iter()
        .map(ContractData::from)
        .collect();

    Ok(Json(ContractListResponse {
        contracts,
        total,
        page: pagination.page(),
    }))
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

    fn list_request(token: &str, query: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(format!("/admin/contracts{query}"))
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn scoped_to_own_company() {
        let db = Arc::new(create_database().await);

        let (company, token) = create_company_admin(&db).await;
        let (other_company, _) = create_company_admin(&db).await;

        let mine = create_contract(&db, company.id, contract::Status::Draft).await;
        create_contract(&db, other_company.id, contract::Status::Draft).await;

        let response = crate::app_router(db, Arc::new(MockLedger::funded()))
            .oneshot(list_request(&token, ""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        assert_json!(response.json().await, {
            "total": 1,
            "page": 1,
            "contracts": [{ "id": mine.id }],
        });
    }

    #[tokio::test]
    async fn filters_by_status() {
        let db = Arc::new(create_database().await);

        let (company, token) = create_company_admin(&db).await;

        create_contract(&db, company.id, contract::Status::Draft).await;
        let sent = create_contract(&db, company.id, contract::Status::Sent).await;

        let response = crate::app_router(db, Arc::new(MockLedger::funded()))
            .oneshot(list_request(&token, "?status=SENT"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        assert_json!(response.json().await, {
            "total": 1,
            "contracts": [{ "id": sent.id, "status": "SENT" }],
        });
    }

    #[tokio::test]
    async fn searches_by_worker_name() {
        let db = Arc::new(create_database().await);

        let (company, token) = create_company_admin(&db).await;

        create_contract(&db, company.id, contract::Status::Draft).await;

        let response = crate::app_router(db, Arc::new(MockLedger::funded()))
            .oneshot(list_request(&token, "?search=%EA%B8%B8%EB%8F%99"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        assert_json!(response.json().await, { "total": 1 });
    }

    #[tokio::test]
    async fn requires_authentication() {
        let db = create_database().await;

        let response = crate::app_router(Arc::new(db), Arc::new(MockLedger::funded()))
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/admin/contracts")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_ne!(response.status(), StatusCode::OK);
    }
}
