/// Contract creation route.
mod create;

/// Contract details route.
mod details;

/// Employer signing route.
mod employer_sign;

/// Worker signing route.
mod worker_sign;

/// Anchoring retry route.
mod anchor;

/// Contract verification route.
mod verify;

use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use common::{
    canonical::{format_timestamp, TIMESTAMP_FORMAT},
    ledger::{Anchor, LedgerError},
};
use db::{
    contract, sea_query::Expr, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PrimitiveDateTime, QueryFilter,
};
use serde::Serialize;

pub(crate) type ContractsState = (Arc<DatabaseConnection>, Arc<dyn Anchor>);

/// Create a router with contract lifecycle routes.
///
/// Only creation requires authentication. Details, signing and
/// verification are reachable through a shared link, so a worker
/// without an account can read and sign the contract sent to them.
pub(crate) fn routes(database: Arc<DatabaseConnection>, ledger: Arc<dyn Anchor>) -> Router {
    let authenticated = Router::new()
        .route("/", post(create::create))
        .route_layer(from_fn_with_state(
            database.clone(),
            crate::auth::require_authentication::<false, true, _>,
        ));

    Router::new()
        .merge(authenticated)
        .route("/:id", get(details::details))
        .route("/:id/employerSign", post(employer_sign::employer_sign))
        .route("/:id/workerSign", post(worker_sign::worker_sign))
        .route("/:id/anchor", post(anchor::anchor))
        .route("/:id/verify", get(verify::verify))
        .with_state((database, ledger))
}

/// Contract representation shared by every contract-returning route.
#[derive(Serialize)]
pub(crate) struct ContractData {
    pub id: i64,
    pub company_id: i64,
    pub contract_type: contract::Kind,
    pub employer_name: String,
    pub employer_ceo: String,
    pub employer_address: String,
    pub employer_phone: String,
    pub worker_name: String,
    pub worker_birth: String,
    pub worker_phone: String,
    pub worker_address: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub work_days: Vec<String>,
    pub work_start: String,
    pub work_end: String,
    pub break_minutes: i32,
    pub hourly_wage: i64,
    pub pay_day: i16,
    pub special_terms: Option<String>,
    pub employer_sign: Option<String>,
    pub worker_sign: Option<String>,
    pub status: contract::Status,
    pub content_hash: Option<String>,
    pub anchor_tx: Option<String>,
    pub signed_at: Option<String>,
    pub created_at: String,
}

impl From<contract::Model> for ContractData {
    fn from(model: contract::Model) -> Self {
        let work_days = model.work_day_list();

        Self {
            id: model.id,
            company_id: model.company_id,
            contract_type: model.contract_type,
            employer_name: model.employer_name,
            employer_ceo: model.employer_ceo,
            employer_address: model.employer_address,
            employer_phone: model.employer_phone,
            worker_name: model.worker_name,
            worker_birth: model.worker_birth,
            worker_phone: model.worker_phone,
            worker_address: model.worker_address,
            start_date: format_timestamp(model.start_date.assume_utc()),
            end_date: model.end_date.map(|date| format_timestamp(date.assume_utc())),
            work_days,
            work_start: model.work_start,
            work_end: model.work_end,
            break_minutes: model.break_minutes,
            hourly_wage: model.hourly_wage,
            pay_day: model.pay_day,
            special_terms: model.special_terms,
            employer_sign: model.employer_sign,
            worker_sign: model.worker_sign,
            status: model.status,
            content_hash: model.content_hash,
            anchor_tx: model.anchor_tx,
            signed_at: model.signed_at.map(|date| format_timestamp(date.assume_utc())),
            created_at: format_timestamp(model.created_at.assume_utc()),
        }
    }
}

/// Parse a request timestamp in the canonical millisecond layout.
pub(super) fn parse_timestamp(value: &str) -> Result<PrimitiveDateTime, time::error::Parse> {
    PrimitiveDateTime::parse(value, &TIMESTAMP_FORMAT)
}

pub(super) enum AnchorFailure {
    Database(DbErr),
    Ledger(LedgerError),
    NotSigned,
    Vanished,
}

/// Anchor a signed contract's digest to the ledger and complete it.
///
/// The completion update is conditional on the row still being in the
/// signed state, so a concurrent anchoring attempt that already
/// completed the contract leaves this one a no-op instead of
/// overwriting the recorded transaction.
pub(super) async fn anchor_contract(
    db: &DatabaseConnection,
    ledger: &dyn Anchor,
    contract: contract::Model,
) -> Result<contract::Model, AnchorFailure> {
    if contract.status != contract::Status::Signed {
        return Err(AnchorFailure::NotSigned);
    }

    let digest = contract.content().digest();

    let signature = ledger
        .record_digest(&digest)
        .await
        .map_err(AnchorFailure::Ledger)?;

    contract::Entity::update_many()
        .col_expr(
            contract::Column::Status,
            Expr::value(contract::Status::Completed),
        )
        .col_expr(contract::Column::ContentHash, Expr::value(Some(digest)))
        .col_expr(
            contract::Column::AnchorTx,
            Expr::value(Some(signature.clone())),
        )
        .filter(contract::Column::Id.eq(contract.id))
        .filter(contract::Column::Status.eq(contract::Status::Signed))
        .exec(db)
        .await
        .map_err(AnchorFailure::Database)?;

    tracing::info!(contract = contract.id, %signature, "contract anchored");

    contract::Entity::find_by_id(contract.id)
        .one(db)
        .await
        .map_err(AnchorFailure::Database)?
        .ok_or(AnchorFailure::Vanished)
}
