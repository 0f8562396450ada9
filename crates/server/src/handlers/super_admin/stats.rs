use std::sync::Arc;

use axum::{extract::State, Json};
use axum_derive_error::ErrorResponse;
use db::{
    company, contract, user, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QuerySelect,
};
use derive_more::{Display, Error, From};
use serde::Serialize;

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum StatsError {
    DatabaseError(DbErr),
}

#[derive(Default, Serialize)]
pub(super) struct StatusBreakdown {
    draft: i64,
    sent: i64,
    signed: i64,
    completed: i64,
}

#[derive(Serialize)]
pub(super) struct StatsResponse {
    companies: u64,
    users: u64,
    contracts: u64,
    by_status: StatusBreakdown,
}

/// Platform-wide totals across every company.
pub(super) async fn stats(
    State(db): State<Arc<DatabaseConnection>>,
) -> Result<Json<StatsResponse>, StatsError> {
    let companies = company::Entity::find().count(&*db).await?;
    let users = user::Entity::find().count(&*db).await?;
    let contracts = contract::Entity::find().count(&*db).await?;

    let status_counts: Vec<(contract::Status, i64)> = contract::Entity::find()
        .select_only()
        .column(contract::Column::Status)
        .column_as(contract::Column::Id.count(), "count")
        .group_by(contract::Column::Status)
        .into_tuple()
        .all(&*db)
        .await?;

    let mut by_status = StatusBreakdown::default();

    for (status, count) in status_counts {
        match status {
            contract::Status::Draft => by_status.draft = count,
            contract::Status::Sent => by_status.sent = count,
            contract::Status::Signed => by_status.signed = count,
            contract::Status::Completed => by_status.completed = count,
        }
    }

    Ok(Json(StatsResponse {
        companies,
        users,
        contracts,
        by_status,
    }))
}
