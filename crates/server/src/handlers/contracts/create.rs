use axum::{extract::State, http::StatusCode, Extension, Json};
use axum_derive_error::ErrorResponse;
use db::{contract, ActiveValue, DbErr, EntityTrait};
use derive_more::{Display, Error, From};
use serde::Deserialize;
use validator::Validate;

use super::{parse_timestamp, ContractData, ContractsState};
use crate::{auth::CurrentUser, validation::ValidatedJson};

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum CreateContractError {
    DatabaseError(DbErr),

    #[status(StatusCode::UNPROCESSABLE_ENTITY)]
    #[display(fmt = "timestamps must use the YYYY-MM-DDTHH:MM:SS.mmmZ layout")]
    InvalidTimestamp(time::error::Parse),
}

#[derive(Deserialize, Validate)]
pub(super) struct CreateContractRequest {
    contract_type: contract::Kind,

    #[validate(length(min = 1, max = 128))]
    employer_name: String,

    #[validate(length(min = 1, max = 64))]
    employer_ceo: String,

    #[validate(length(min = 1, max = 256))]
    employer_address: String,

    #[validate(length(min = 1, max = 32))]
    employer_phone: String,

    #[validate(length(min = 1, max = 64))]
    worker_name: String,

    #[validate(length(min = 1, max = 16))]
    worker_birth: String,

    #[validate(length(min = 1, max = 32))]
    worker_phone: String,

    #[validate(length(min = 1, max = 256))]
    worker_address: String,

    start_date: String,

    #[serde(default)]
    end_date: Option<String>,

    #[validate(length(min = 1, max = 7))]
    work_days: Vec<String>,

    #[validate(length(min = 1, max = 8))]
    work_start: String,

    #[validate(length(min = 1, max = 8))]
    work_end: String,

    #[validate(range(min = 0, max = 1440))]
    break_minutes: i32,

    #[validate(range(min = 1))]
    hourly_wage: i64,

    #[validate(range(min = 1, max = 31))]
    pay_day: i16,

    #[serde(default)]
    #[validate(length(max = 4096))]
    special_terms: Option<String>,
}

/// Create a draft contract owned by the caller's company.
pub(super) async fn create(
    State((db, _)): State<ContractsState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(request): ValidatedJson<CreateContractRequest>,
) -> Result<(StatusCode, Json<ContractData>), CreateContractError> {
    let start_date = parse_timestamp(&request.start_date)?;
    let end_date = request
        .end_date
        .as_deref()
        .map(parse_timestamp)
        .transpose()?;

    let contract = contract::Entity::insert(contract::ActiveModel {
        company_id: ActiveValue::Set(current_user.company_id),
        contract_type: ActiveValue::Set(request.contract_type),
        employer_name: ActiveValue::Set(request.employer_name),
        employer_ceo: ActiveValue::Set(request.employer_ceo),
        employer_address: ActiveValue::Set(request.employer_address),
        employer_phone: ActiveValue::Set(request.employer_phone),
        worker_name: ActiveValue::Set(request.worker_name),
        worker_birth: ActiveValue::Set(request.worker_birth),
        worker_phone: ActiveValue::Set(request.worker_phone),
        worker_address: ActiveValue::Set(request.worker_address),
        start_date: ActiveValue::Set(start_date),
        end_date: ActiveValue::Set(end_date),
        work_days: ActiveValue::Set(contract::encode_work_days(&request.work_days)),
        work_start: ActiveValue::Set(request.work_start),
        work_end: ActiveValue::Set(request.work_end),
        break_minutes: ActiveValue::Set(request.break_minutes),
        hourly_wage: ActiveValue::Set(request.hourly_wage),
        pay_day: ActiveValue::Set(request.pay_day),
        special_terms: ActiveValue::Set(request.special_terms),
        employer_sign: ActiveValue::Set(None),
        worker_sign: ActiveValue::Set(None),
        status: ActiveValue::Set(contract::Status::Draft),
        content_hash: ActiveValue::Set(None),
        anchor_tx: ActiveValue::Set(None),
        signed_at: ActiveValue::Set(None),
        created_at: ActiveValue::Set(db::now()),
        ..Default::default()
    })
    .exec_with_returning(&*db)
    .await?;

    Ok((StatusCode::CREATED, Json(ContractData::from(contract))))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::testing::{create_company_admin, create_database, RequestBodyExt, ResponseBodyExt};

    use assert_json::assert_json;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use common::ledger::MockLedger;
    use serde_json::json;
    use tower::ServiceExt;

    fn contract_body() -> serde_json::Value {
        json!({
            "contract_type": "PARTTIME",
            "employer_name": "한빛카페",
            "employer_ceo": "김사장",
            "employer_address": "서울시 마포구",
            "employer_phone": "02-123-4567",
            "worker_name": "홍길동",
            "worker_birth": "1999-03-05",
            "worker_phone": "010-1234-5678",
            "worker_address": "서울시 서대문구",
            "start_date": "2024-01-01T00:00:00.000Z",
            "work_days": ["월", "화", "수"],
            "work_start": "09:00",
            "work_end": "18:00",
            "break_minutes": 60,
            "hourly_wage": 10320,
            "pay_day": 25
        })
    }

    fn create_request(token: Option<&str>, body: serde_json::Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/contracts")
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }

        builder.body(Body::from_json(body)).unwrap()
    }

    #[tokio::test]
    async fn successful() {
        let db = Arc::new(create_database().await);

        let (company, token) = create_company_admin(&db).await;

        let response = crate::app_router(db, Arc::new(MockLedger::funded()))
            .oneshot(create_request(Some(&token), contract_body()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);

        assert_json!(response.json().await, {
            "company_id": company.id,
            "status": "DRAFT",
            "worker_name": "홍길동",
            "start_date": "2024-01-01T00:00:00.000Z",
            "content_hash": null,
            "anchor_tx": null,
        });
    }

    #[tokio::test]
    async fn requires_authentication() {
        let db = create_database().await;

        let response = crate::app_router(Arc::new(db), Arc::new(MockLedger::funded()))
            .oneshot(create_request(None, contract_body()))
            .await
            .unwrap();

        assert_ne!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn rejects_invalid_pay_day() {
        let db = Arc::new(create_database().await);

        let (_, token) = create_company_admin(&db).await;

        let mut body = contract_body();
        body["pay_day"] = json!(32);

        let response = crate::app_router(db, Arc::new(MockLedger::funded()))
            .oneshot(create_request(Some(&token), body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn rejects_malformed_start_date() {
        let db = Arc::new(create_database().await);

        let (_, token) = create_company_admin(&db).await;

        let mut body = contract_body();
        body["start_date"] = json!("01/01/2024");

        let response = crate::app_router(db, Arc::new(MockLedger::funded()))
            .oneshot(create_request(Some(&token), body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn rejects_empty_work_days() {
        let db = Arc::new(create_database().await);

        let (_, token) = create_company_admin(&db).await;

        let mut body = contract_body();
        body["work_days"] = json!([]);

        let response = crate::app_router(db, Arc::new(MockLedger::funded()))
            .oneshot(create_request(Some(&token), body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
