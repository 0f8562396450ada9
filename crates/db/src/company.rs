//! Registered employer company.
//!
//! A company is the tenant boundary of the service: its admins manage
//! only the contracts attached to their own company, and a suspended
//! company keeps its data readable while being locked out of changes.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Company model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "companies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Registered company name.
    pub name: String,

    /// Name of the company's chief executive.
    pub ceo_name: String,

    /// Government-issued business registration number.
    pub business_number: String,

    pub address: String,
    pub phone: String,

    pub status: Status,
    pub created_at: TimeDateTime,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    #[sea_orm(string_value = "SUSPENDED")]
    Suspended,
}

/// Company model relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user::Entity")]
    Users,

    #[sea_orm(has_many = "super::contract::Entity")]
    Contracts,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::contract::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contracts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
