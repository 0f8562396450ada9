use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use axum_derive_error::ErrorResponse;
use db::{token, user, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum LoginError {
    DatabaseError(DbErr),

    HashingError(bcrypt::BcryptError),

    // A single error for both unknown emails and wrong passwords,
    // so responses do not reveal which emails are registered.
    #[status(StatusCode::UNAUTHORIZED)]
    #[display(fmt = "invalid email or password")]
    InvalidCredentials,
}

#[derive(Deserialize)]
pub(super) struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
pub(super) struct LoginResponse {
    token: String,
}

pub(super) async fn login(
    State(db): State<Arc<DatabaseConnection>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, LoginError> {
    let user = user::Entity::find()
        .filter(user::Column::Email.eq(&request.email))
        .one(&*db)
        .await?
        .ok_or(LoginError::InvalidCredentials)?;

    if !bcrypt::verify(&request.password, &user.password)? {
        return Err(LoginError::InvalidCredentials);
    }

    let (active_model, token) = token::generate_token(user.id);

    token::Entity::insert(active_model)
        .exec_without_returning(&*db)
        .await?;

    Ok(Json(LoginResponse { token }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::testing::{
        create_company_admin, create_database, RequestBodyExt, ResponseBodyExt, TEST_PASSWORD,
    };

    use assert_json::{assert_json, validators};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use common::ledger::MockLedger;
    use db::{token::TOKEN_LENGTH, user, EntityTrait};
    use serde_json::json;
    use tower::ServiceExt;

    fn login_request(email: &str, password: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/auth/login")
            .header("Content-Type", "application/json")
            .body(Body::from_json(json!({
                "email": email,
                "password": password,
            })))
            .unwrap()
    }

    #[tokio::test]
    async fn successful() {
        let db = Arc::new(create_database().await);

        create_company_admin(&db).await;

        let user = user::Entity::find()
            .one(&*db)
            .await
            .unwrap()
            .expect("admin user exists");

        let response = crate::app_router(db, Arc::new(MockLedger::funded()))
            .oneshot(login_request(&user.email, TEST_PASSWORD))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        assert_json!(response.json().await, {
            "token": validators::string(|val| {
                (val.len() == TOKEN_LENGTH)
                    .then_some(())
                    .ok_or(String::from("invalid length"))
            })
        });
    }

    #[tokio::test]
    async fn wrong_password() {
        let db = Arc::new(create_database().await);

        create_company_admin(&db).await;

        let user = user::Entity::find()
            .one(&*db)
            .await
            .unwrap()
            .expect("admin user exists");

        let response = crate::app_router(db, Arc::new(MockLedger::funded()))
            .oneshot(login_request(&user.email, "not the password"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_email() {
        let db = create_database().await;

        let response = crate::app_router(Arc::new(db), Arc::new(MockLedger::funded()))
            .oneshot(login_request("nobody@example.com", TEST_PASSWORD))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
