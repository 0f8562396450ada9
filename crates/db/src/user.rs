//! Registered user account.
//!
//! Every user belongs to exactly one company and carries a role that
//! decides which parts of the management API are available. Passwords
//! are stored as bcrypt hashes, never as plain text.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Company this user belongs to.
    pub company_id: i64,

    pub email: String,

    /// Bcrypt hash of the user's password.
    pub password: String,

    pub role: Role,
    pub created_at: TimeDateTime,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Manages the contracts of their own company.
    #[sea_orm(string_value = "COMPANY_ADMIN")]
    CompanyAdmin,

    /// Manages every company on the platform.
    #[sea_orm(string_value = "SUPER_ADMIN")]
    SuperAdmin,
}

/// User model relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::company::Entity",
        from = "Column::CompanyId",
        to = "super::company::Column::Id"
    )]
    Company,

    #[sea_orm(has_many = "super::token::Entity")]
    Tokens,
}

impl Related<super::company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl Related<super::token::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tokens.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
