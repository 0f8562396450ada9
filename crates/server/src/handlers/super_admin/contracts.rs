use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use axum_derive_error::ErrorResponse;
use db::{
    company, contract, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};

use crate::{handlers::contracts::ContractData, pagination::Pagination};

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum ContractListError {
    DatabaseError(DbErr),
}

#[derive(Deserialize)]
pub(super) struct ContractFilter {
    #[serde(default)]
    company_id: Option<i64>,

    #[serde(default)]
    status: Option<contract::Status>,

    /// Substring match against worker names.
    #[serde(default)]
    search: Option<String>,
}

#[derive(Serialize)]
pub(super) struct ContractOverview {
    #[serde(flatten)]
    contract: ContractData,
    company_name: Option<String>,
}

#[derive(Serialize)]
pub(super) struct ContractListResponse {
    contracts: Vec<ContractOverview>,
    total: u64,
    page: u64,
}

/// List contracts across every company on the platform.
pub(super) async fn contracts(
    State(db): State<Arc<DatabaseConnection>>,
    Query(pagination): Query<Pagination>,
    Query(filter): Query<ContractFilter>,
) -> Result<Json<ContractListResponse>, ContractListError> {
    let mut query = contract::Entity::find();

    if let Some(company_id) = filter.company_id {
        query = query.filter(contract::Column::CompanyId.eq(company_id));
    }

    if let Some(status) = filter.status {
        query = query.filter(contract::Column::Status.eq(status));
    }

    if let Some(search) = &filter.search {
        query = query.filter(contract::Column::WorkerName.contains(search));
    }

    let total = query.clone().count(&*db).await?;

    let contracts = query
        .order_by_desc(contract::Column::CreatedAt)
        .limit(pagination.limit())
        .offset(pagination.offset())
        .find_also_related(company::Entity)
        .all(&*db)
        .await?
        .into_iter()
        .map(|(contract, company)| ContractOverview {
            contract: ContractData::from(contract),
            company_name: company.map(|company| company.name),
        })
        .collect();

    Ok(Json(ContractListResponse {
        contracts,
        total,
        page: pagination.page(),
    }))
}
