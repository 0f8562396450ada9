use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension, Json};
use axum_derive_error::ErrorResponse;
use db::{company, user, DatabaseConnection, DbErr, EntityTrait};
use derive_more::{Display, Error, From};
use serde::Serialize;

use crate::auth::CurrentUser;

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum MeError {
    DatabaseError(DbErr),

    // The account disappearing between authentication and this lookup
    // means its company was deleted concurrently.
    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "account not found")]
    AccountNotFound,
}

#[derive(Serialize)]
pub(super) struct CompanyInfo {
    id: i64,
    name: String,
    ceo_name: String,
    business_number: String,
    status: company::Status,
}

#[derive(Serialize)]
pub(super) struct MeResponse {
    id: i64,
    email: String,
    role: user::Role,
    company: CompanyInfo,
}

pub(super) async fn me(
    State(db): State<Arc<DatabaseConnection>>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<Json<MeResponse>, MeError> {
    let (user, company) = user::Entity::find_by_id(current_user.user_id)
        .find_also_related(company::Entity)
        .one(&*db)
        .await?
        .ok_or(MeError::AccountNotFound)?;

    let company = company.ok_or(MeError::AccountNotFound)?;

    Ok(Json(MeResponse {
        id: user.id,
        email: user.email,
        role: user.role,
        company: CompanyInfo {
            id: company.id,
            name: company.name,
            ceo_name: company.ceo_name,
            business_number: company.business_number,
            status: company.status,
        },
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::testing::{create_company_admin, create_database, ResponseBodyExt};

    use assert_json::assert_json;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use common::ledger::MockLedger;
    use tower::ServiceExt;

    #[tokio::test]
    async fn successful() {
        let db = Arc::new(create_database().await);

        let (company, token) = create_company_admin(&db).await;

        let response = crate::app_router(db, Arc::new(MockLedger::funded()))
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/auth/me")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        assert_json!(response.json().await, {
            "role": "COMPANY_ADMIN",
            "company": {
                "id": company.id,
                "name": "한빛카페",
                "status": "ACTIVE",
            },
        });
    }

    #[tokio::test]
    async fn requires_token() {
        let db = create_database().await;

        let response = crate::app_router(Arc::new(db), Arc::new(MockLedger::funded()))
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/auth/me")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_ne!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn rejects_unknown_token() {
        let db = create_database().await;

        let response = crate::app_router(Arc::new(db), Arc::new(MockLedger::funded()))
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/auth/me")
                    .header("Authorization", format!("Bearer {}", "x".repeat(64)))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
