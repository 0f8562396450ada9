//! Labor contract record.
//!
//! A contract moves through four states: it is created as a draft,
//! marked as sent once the employer signs it, marked as signed once the
//! worker signs it, and completed when its digest is anchored to the
//! public ledger. `content_hash` and `anchor_tx` are only populated on
//! completion.

use common::canonical::ContractContent;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Contract model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "contracts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Company that issued this contract.
    pub company_id: i64,

    pub contract_type: Kind,

    pub employer_name: String,
    pub employer_ceo: String,
    pub employer_address: String,
    pub employer_phone: String,

    pub worker_name: String,
    pub worker_birth: String,
    pub worker_phone: String,
    pub worker_address: String,

    pub start_date: TimeDateTime,
    pub end_date: Option<TimeDateTime>,

    /// Working weekdays as a JSON array of strings.
    pub work_days: String,
    pub work_start: String,
    pub work_end: String,
    pub break_minutes: i32,

    pub hourly_wage: i64,
    pub pay_day: i16,

    pub special_terms: Option<String>,

    /// Employer signature image as a data URL.
    pub employer_sign: Option<String>,

    /// Worker signature image as a data URL.
    pub worker_sign: Option<String>,

    pub status: Status,

    /// Digest anchored to the ledger, lowercase hex.
    pub content_hash: Option<String>,

    /// Ledger transaction the digest was anchored in.
    pub anchor_tx: Option<String>,

    pub signed_at: Option<TimeDateTime>,
    pub created_at: TimeDateTime,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Kind {
    #[sea_orm(string_value = "REGULAR")]
    Regular,
    #[sea_orm(string_value = "PARTTIME")]
    Parttime,
    #[sea_orm(string_value = "DAILY")]
    Daily,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Regular => "REGULAR",
            Self::Parttime => "PARTTIME",
            Self::Daily => "DAILY",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    #[sea_orm(string_value = "SENT")]
    Sent,
    #[sea_orm(string_value = "SIGNED")]
    Signed,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
}

/// Contract model relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::company::Entity",
        from = "Column::CompanyId",
        to = "super::company::Column::Id"
    )]
    Company,
}

impl Related<super::company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Encode working weekdays into their stored JSON form.
pub fn encode_work_days(days: &[String]) -> String {
    serde_json::Value::from(days.to_vec()).to_string()
}

impl Model {
    /// Decode the stored working weekdays.
    pub fn work_day_list(&self) -> Vec<String> {
        serde_json::from_str(&self.work_days).unwrap_or_default()
    }

    /// The hashable field set of this contract.
    pub fn content(&self) -> ContractContent {
        ContractContent {
            contract_type: self.contract_type.as_str().to_owned(),
            employer_name: self.employer_name.clone(),
            employer_ceo: self.employer_ceo.clone(),
            employer_address: self.employer_address.clone(),
            employer_phone: self.employer_phone.clone(),
            worker_name: self.worker_name.clone(),
            worker_birth: self.worker_birth.clone(),
            worker_phone: self.worker_phone.clone(),
            worker_address: self.worker_address.clone(),
            start_date: self.start_date.assume_utc(),
            end_date: self.end_date.map(|date| date.assume_utc()),
            work_days: self.work_day_list(),
            work_start: self.work_start.clone(),
            work_end: self.work_end.clone(),
            break_minutes: self.break_minutes,
            hourly_wage: self.hourly_wage,
            pay_day: self.pay_day,
            special_terms: self.special_terms.clone(),
            employer_sign: self.employer_sign.clone(),
            worker_sign: self.worker_sign.clone(),
            signed_at: self.signed_at.map(|date| date.assume_utc()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::encode_work_days;

    #[test]
    fn work_days_roundtrip() {
        let days = vec![String::from("월"), String::from("화")];

        let encoded = encode_work_days(&days);
        let decoded: Vec<String> = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded, days);
    }
}
