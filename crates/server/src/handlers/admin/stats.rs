use std::{collections::BTreeMap, sync::Arc};

use axum::{extract::State, Extension, Json};
use axum_derive_error::ErrorResponse;
use db::{
    contract, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PrimitiveDateTime, QueryFilter,
    QueryOrder, QuerySelect,
};
use derive_more::{Display, Error, From};
use serde::Serialize;
use time::{Duration, OffsetDateTime};

use crate::{auth::CurrentUser, handlers::contracts::ContractData};

/// How far back the monthly creation counts reach.
const MONTHLY_WINDOW: Duration = Duration::days(183);

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
pub(super) struct MonthlyCount {
    /// Month in `YYYY-MM` form.
    month: String,
    count: i64,
}

#[derive(Serialize)]
pub(super) struct StatsResponse {
    total: i64,
    by_status: StatusBreakdown,
    recent: Vec<ContractData>,
    monthly: Vec<MonthlyCount>,
}

/// Dashboard statistics over the caller's company contracts.
pub(super) async fn stats(
    State(db): State<Arc<DatabaseConnection>>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<Json<StatsResponse>, StatsError> {
    let scope = contract::Column::CompanyId.eq(current_user.company_id);

    let status_counts: Vec<(contract::Status, i64)> = contract::Entity::find()
        .select_only()
        .column(contract::Column::Status)
        .column_as(contract::Column::Id.count(), "count")
        .filter(scope.clone())
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

    let total = by_status.draft + by_status.sent + by_status.signed + by_status.completed;

    let recent = contract::Entity::find()
        .filter(scope.clone())
        .order_by_desc(contract::Column::CreatedAt)
        .limit(5)
        .all(&*db)
        .await?
        .into_iter()
        .map(ContractData::from)
        .collect();

    let cutoff = OffsetDateTime::now_utc() - MONTHLY_WINDOW;
    let cutoff = PrimitiveDateTime::new(cutoff.date(), cutoff.time());

    // Month bucketing happens here instead of in SQL to keep the query
    // portable across the production and test database backends.
    let created: Vec<PrimitiveDateTime> = contract::Entity::find()
        .select_only()
        .column(contract::Column::CreatedAt)
        .filter(scope)
        .filter(contract::Column::CreatedAt.gte(cutoff))
        .into_tuple()
        .all(&*db)
        .await?;

    let mut buckets = BTreeMap::new();

    for timestamp in created {
        *buckets
            .entry(format!(
                "{:04}-{:02}",
                timestamp.year(),
                timestamp.month() as u8
            ))
            .or_insert(0) += 1;
    }

    let monthly = buckets
        .into_iter()
        .map(|(month, count)| MonthlyCount { month, count })
        .collect();

    Ok(Json(StatsResponse {
        total,
        by_status,
        recent,
        monthly,
    }))
}
