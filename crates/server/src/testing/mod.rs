use std::error::Error;

use axum::async_trait;
use db::{
    company, contract, token, user, ActiveValue, Database, DatabaseConnection, EntityTrait,
};
use hyper::body::{self, Bytes, HttpBody};
use migration::MigratorTrait;
use rand::{
    distributions::{Alphanumeric, DistString},
    thread_rng,
};
use serde::Serialize;

pub(crate) const TEST_PASSWORD: &str = "password123";

pub(crate) async fn create_database() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("unable to create test database");

    migration::Migrator::up(&db, None)
        .await
        .expect("unable to run migrations");

    db
}

pub(crate) async fn create_company(db: &DatabaseConnection) -> company::Model {
    company::Entity::insert(company::ActiveModel {
        name: ActiveValue::Set(String::from("한빛카페")),
        ceo_name: ActiveValue::Set(String::from("김사장")),
        business_number: ActiveValue::Set(Alphanumeric.sample_string(&mut thread_rng(), 10)),
        address: ActiveValue::Set(String::from("서울시 마포구")),
        phone: ActiveValue::Set(String::from("02-123-4567")),
        status: ActiveValue::Set(company::Status::Active),
        created_at: ActiveValue::Set(db::now()),
        ..Default::default()
    })
    .exec_with_returning(db)
    .await
    .expect("unable to create company")
}

/// Insert a user with a fresh authentication token.
pub(crate) async fn create_user(
    db: &DatabaseConnection,
    company_id: i64,
    role: user::Role,
) -> (user::Model, String) {
    let email = format!(
        "{}@example.com",
        Alphanumeric.sample_string(&mut thread_rng(), 8).to_lowercase()
    );

    let user = user::Entity::insert(user::ActiveModel {
        company_id: ActiveValue::Set(company_id),
        email: ActiveValue::Set(email),
        password: ActiveValue::Set(
            bcrypt::hash(TEST_PASSWORD, 4).expect("unable to hash password"),
        ),
        role: ActiveValue::Set(role),
        created_at: ActiveValue::Set(db::now()),
        ..Default::default()
    })
    .exec_with_returning(db)
    .await
    .expect("unable to create user");

    let (active_model, token) = token::generate_token(user.id);

    token::Entity::insert(active_model)
        .exec_without_returning(db)
        .await
        .expect("unable to create token");

    (user, token)
}

pub(crate) async fn create_company_admin(db: &DatabaseConnection) -> (company::Model, String) {
    let company = create_company(db).await;
    let (_, token) = create_user(db, company.id, user::Role::CompanyAdmin).await;

    (company, token)
}

/// Insert a contract already moved to the requested status, with the
/// signature fields that status implies.
pub(crate) async fn create_contract(
    db: &DatabaseConnection,
    company_id: i64,
    status: contract::Status,
) -> contract::Model {
    let signed = matches!(status, contract::Status::Signed | contract::Status::Completed);
    let sent = signed || status == contract::Status::Sent;

    contract::Entity::insert(contract::ActiveModel {
        company_id: ActiveValue::Set(company_id),
        contract_type: ActiveValue::Set(contract::Kind::Parttime),
        employer_name: ActiveValue::Set(String::from("한빛카페")),
        employer_ceo: ActiveValue::Set(String::from("김사장")),
        employer_address: ActiveValue::Set(String::from("서울시 마포구")),
        employer_phone: ActiveValue::Set(String::from("02-123-4567")),
        worker_name: ActiveValue::Set(String::from("홍길동")),
        worker_birth: ActiveValue::Set(String::from("1999-03-05")),
        worker_phone: ActiveValue::Set(String::from("010-1234-5678")),
        worker_address: ActiveValue::Set(String::from("서울시 서대문구")),
        start_date: ActiveValue::Set(db::now()),
        end_date: ActiveValue::Set(None),
        work_days: ActiveValue::Set(contract::encode_work_days(&[
            String::from("월"),
            String::from("화"),
            String::from("수"),
        ])),
        work_start: ActiveValue::Set(String::from("09:00")),
        work_end: ActiveValue::Set(String::from("18:00")),
        break_minutes: ActiveValue::Set(60),
        hourly_wage: ActiveValue::Set(10320),
        pay_day: ActiveValue::Set(25),
        special_terms: ActiveValue::Set(None),
        employer_sign: ActiveValue::Set(
            sent.then(|| String::from("data:image/png;base64,AAAA")),
        ),
        worker_sign: ActiveValue::Set(
            signed.then(|| String::from("data:image/png;base64,BBBB")),
        ),
        status: ActiveValue::Set(status),
        content_hash: ActiveValue::Set(None),
        anchor_tx: ActiveValue::Set(None),
        signed_at: ActiveValue::Set(signed.then(db::now)),
        created_at: ActiveValue::Set(db::now()),
        ..Default::default()
    })
    .exec_with_returning(db)
    .await
    .expect("unable to create contract")
}

pub(crate) trait RequestBodyExt: Sized {
    fn from_json<B: Serialize>(val: B) -> Self;
}

impl<T> RequestBodyExt for T
where
    T: HttpBody + From<Vec<u8>>,
{
    fn from_json<B: Serialize>(val: B) -> Self {
        T::from(serde_json::to_vec(&val).expect("unable to serialize"))
    }
}

#[async_trait(?Send)]
pub(crate) trait ResponseBodyExt {
    async fn bytes(self) -> Bytes;

    async fn text(self) -> String;

    async fn json(self) -> serde_json::Value;
}

#[async_trait(?Send)]
impl<T> ResponseBodyExt for T
where
    T: HttpBody,
    T::Error: Error,
{
    async fn bytes(self) -> Bytes {
        body::to_bytes(self)
            .await
            .expect("unable to convert to bytes")
    }

    async fn text(self) -> String {
        String::from_utf8(self.bytes().await.to_vec()).expect("unable to convert to text")
    }

    async fn json(self) -> serde_json::Value {
        serde_json::from_slice(&self.bytes().await).expect("unable to convert to json")
    }
}
