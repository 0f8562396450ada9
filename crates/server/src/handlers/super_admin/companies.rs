use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Query, State},
    Json,
};
use axum_derive_error::ErrorResponse;
use common::canonical::format_timestamp;
use db::{
    company, contract, user, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};

use crate::pagination::Pagination;

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum CompanyListError {
    DatabaseError(DbErr),
}

#[derive(Deserialize)]
pub(super) struct CompanyFilter {
    /// Substring match against company names.
    #[serde(default)]
    search: Option<String>,

    #[serde(default)]
    status: Option<company::Status>,
}

#[derive(Serialize)]
pub(super) struct CompanyOverview {
    id: i64,
    name: String,
    ceo_name: String,
    business_number: String,
    address: String,
    phone: String,
    status: company::Status,
    created_at: String,
    users: i64,
    contracts: i64,
}

#[derive(Serialize)]
pub(super) struct CompanyListResponse {
    companies: Vec<CompanyOverview>,
    total: u64,
    page: u64,
}

pub(super) async fn companies(
    State(db): State<Arc<DatabaseConnection>>,
    Query(pagination): Query<Pagination>,
    Query(filter): Query<CompanyFilter>,
) -> Result<Json<CompanyListResponse>, CompanyListError> {
    let mut query = company::Entity::find();

    if let Some(search) = &filter.search {
        query = query.filter(company::Column::Name.contains(search));
    }

    if let Some(status) = filter.status {
        query = query.filter(company::Column::Status.eq(status));
    }

    let total = query.clone().count(&*db).await?;

    let companies = query
        .order_by_desc(company::Column::CreatedAt)
        .limit(pagination.limit())
        .offset(pagination.offset())
        .all(&*db)
        .await?;

    let ids: Vec<i64> = companies.iter().map(|company| company.id).collect();

    let user_counts: HashMap<i64, i64> = user::Entity::find()
        .select_only()
        .column(user::Column::CompanyId)
        .column_as(user::Column::Id.count(), "count")
        .filter(user::Column::CompanyId.is_in(ids.clone()))
        .group_by(user::Column::CompanyId)
        .into_tuple::<(i64, i64)>()
        .all(&*db)
        .await?
        .into_iter()
        .collect();

    let contract_counts: HashMap<i64, i64> = contract::Entity::find()
        .select_only()
        .column(contract::Column::CompanyId)
        .column_as(contract::Column::Id.count(), "count")
        .filter(contract::Column::CompanyId.is_in(ids))
        .group_by(contract::Column::CompanyId)
        .into_tuple::<(i64, i64)>()
        .all(&*db)
        .await?
        .into_iter()
        .collect();

    let companies = companies
        .into_iter()
        .map(|company| CompanyOverview {
            users: user_counts.get(&company.id).copied().unwrap_or(0),
            contracts: contract_counts.get(&company.id).copied().unwrap_or(0),
            id: company.id,
            name: company.name,
            ceo_name: company.ceo_name,
            business_number: company.business_number,
            address: company.address,
            phone: company.phone,
            status: company.status,
            created_at: format_timestamp(company.created_at.assume_utc()),
        })
        .collect();

    Ok(Json(CompanyListResponse {
        companies,
        total,
        page: pagination.page(),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::testing::{
        create_company_admin, create_contract, create_database, create_user, ResponseBodyExt,
    };

    use assert_json::assert_json;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use common::ledger::MockLedger;
    use db::{contract, user};
    use tower::ServiceExt;

    fn companies_request(token: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri("/superAdmin/companies")
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn lists_companies_with_counts() {
        let db = Arc::new(create_database().await);

        let (company, _) = create_company_admin(&db).await;
        let (_, super_token) = create_user(&db, company.id, user::Role::SuperAdmin).await;

        create_contract(&db, company.id, contract::Status::Draft).await;
        create_contract(&db, company.id, contract::Status::Completed).await;

        let response = crate::app_router(db, Arc::new(MockLedger::funded()))
            .oneshot(companies_request(&super_token))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        assert_json!(response.json().await, {
            "total": 1,
            "companies": [{
                "id": company.id,
                "name": "한빛카페",
                "users": 2,
                "contracts": 2,
            }],
        });
    }

    #[tokio::test]
    async fn rejects_company_admin() {
        let db = Arc::new(create_database().await);

        let (_, admin_token) = create_company_admin(&db).await;

        let response = crate::app_router(db, Arc::new(MockLedger::funded()))
            .oneshot(companies_request(&admin_token))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
