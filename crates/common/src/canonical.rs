//! Canonical contract serialization and hashing.
//!
//! The digest anchored to the public ledger is computed over a fixed,
//! explicitly enumerated set of contract fields. To make the digest
//! reproducible across writes and later verifications, the fields are
//! emitted as a JSON object whose keys appear in a hard-coded order equal
//! to their lexicographic order, never in struct-declaration or map
//! iteration order. Absent optional fields serialize as explicit `null`,
//! and timestamps always use [`TIMESTAMP_FORMAT`].

use std::fmt::Write;

use serde_json::Value;
use sha2::{Digest, Sha256};
use time::{format_description::FormatItem, macros::format_description, OffsetDateTime};

/// Fixed-precision timestamp layout shared by the anchoring and
/// verification paths. Millisecond precision is always emitted, even
/// when the subsecond part is zero.
pub const TIMESTAMP_FORMAT: &[FormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z");

/// The exact field set covered by the anchored digest.
///
/// Administrative metadata (record identifier, status, creation timestamp)
/// is deliberately absent so that bookkeeping changes never disturb the
/// anchored hash. Signature payloads are carried in their stored data-URL
/// string form without any normalization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractContent {
    pub contract_type: String,
    pub employer_name: String,
    pub employer_ceo: String,
    pub employer_address: String,
    pub employer_phone: String,
    pub worker_name: String,
    pub worker_birth: String,
    pub worker_phone: String,
    pub worker_address: String,
    pub start_date: OffsetDateTime,
    pub end_date: Option<OffsetDateTime>,
    /// Working weekdays, order-preserving.
    pub work_days: Vec<String>,
    pub work_start: String,
    pub work_end: String,
    pub break_minutes: i32,
    pub hourly_wage: i64,
    pub pay_day: i16,
    pub special_terms: Option<String>,
    pub employer_sign: Option<String>,
    pub worker_sign: Option<String>,
    pub signed_at: Option<OffsetDateTime>,
}

impl ContractContent {
    /// Serialize the field set to its canonical byte representation.
    ///
    /// The pair list below is the single source of truth for both key
    /// order and field coverage; `verify` recomputes hashes through this
    /// very function, so any edit here invalidates previously anchored
    /// contracts.
    pub fn canonical_json(&self) -> String {
        let pairs: [(&str, Value); 21] = [
            ("breakTime", Value::from(self.break_minutes)),
            ("contractType", Value::from(self.contract_type.as_str())),
            ("employerAddress", Value::from(self.employer_address.as_str())),
            ("employerCeo", Value::from(self.employer_ceo.as_str())),
            ("employerName", Value::from(self.employer_name.as_str())),
            ("employerPhone", Value::from(self.employer_phone.as_str())),
            ("employerSign", nullable_text(self.employer_sign.as_deref())),
            ("endDate", nullable_timestamp(self.end_date)),
            ("hourlyWage", Value::from(self.hourly_wage)),
            ("payDay", Value::from(self.pay_day)),
            ("signedAt", nullable_timestamp(self.signed_at)),
            ("specialTerms", nullable_text(self.special_terms.as_deref())),
            ("startDate", Value::from(format_timestamp(self.start_date))),
            ("workDays", Value::from(self.work_days.clone())),
            ("workEnd", Value::from(self.work_end.as_str())),
            ("workStart", Value::from(self.work_start.as_str())),
            ("workerAddress", Value::from(self.worker_address.as_str())),
            ("workerBirth", Value::from(self.worker_birth.as_str())),
            ("workerName", Value::from(self.worker_name.as_str())),
            ("workerPhone", Value::from(self.worker_phone.as_str())),
            ("workerSign", nullable_text(self.worker_sign.as_deref())),
        ];

        let mut out = String::with_capacity(1024);
        out.push('{');

        for (i, (key, value)) in pairs.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }

            // Writing into a String is infallible, and `Value`'s `Display`
            // emits compact JSON with proper string escaping.
            let _ = write!(out, "{}:{value}", Value::from(*key));
        }

        out.push('}');
        out
    }

    /// Compute the anchored digest: SHA-256 over the canonical bytes,
    /// encoded as lowercase hex.
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(self.canonical_json().as_bytes()))
    }
}

/// Format a timestamp with fixed millisecond precision in UTC.
pub fn format_timestamp(timestamp: OffsetDateTime) -> String {
    timestamp
        .to_offset(time::UtcOffset::UTC)
        .format(&TIMESTAMP_FORMAT)
        .expect("timestamp format description only uses infallible components")
}

fn nullable_text(value: Option<&str>) -> Value {
    value.map(Value::from).unwrap_or(Value::Null)
}

fn nullable_timestamp(value: Option<OffsetDateTime>) -> Value {
    value
        .map(|timestamp| Value::from(format_timestamp(timestamp)))
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::ContractContent;

    fn sample() -> ContractContent {
        ContractContent {
            contract_type: String::from("PARTTIME"),
            employer_name: String::from("한빛카페"),
            employer_ceo: String::from("김사장"),
            employer_address: String::from("서울시 마포구"),
            employer_phone: String::from("02-123-4567"),
            worker_name: String::from("홍길동"),
            worker_birth: String::from("1999-03-05"),
            worker_phone: String::from("010-1234-5678"),
            worker_address: String::from("서울시 서대문구"),
            start_date: datetime!(2024-01-01 00:00:00 UTC),
            end_date: None,
            work_days: vec![
                String::from("월"),
                String::from("화"),
                String::from("수"),
            ],
            work_start: String::from("09:00"),
            work_end: String::from("18:00"),
            break_minutes: 60,
            hourly_wage: 10320,
            pay_day: 25,
            special_terms: None,
            employer_sign: Some(String::from("data:image/png;base64,AAAA")),
            worker_sign: Some(String::from("data:image/png;base64,BBBB")),
            signed_at: Some(datetime!(2024-01-02 12:30:45.5 UTC)),
        }
    }

    #[test]
    fn deterministic() {
        assert_eq!(sample().digest(), sample().digest());
    }

    #[test]
    fn digest_is_lowercase_hex() {
        let digest = sample().digest();

        assert_eq!(digest.len(), 64);
        assert!(digest
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn sensitive_to_every_included_field() {
        let base = sample().digest();

        let mut changed = sample();
        changed.hourly_wage = 12000;
        assert_ne!(changed.digest(), base);

        let mut changed = sample();
        changed.worker_address = String::from("부산시 해운대구");
        assert_ne!(changed.digest(), base);

        let mut changed = sample();
        changed.work_days.pop();
        assert_ne!(changed.digest(), base);

        let mut changed = sample();
        changed.end_date = Some(datetime!(2025-01-01 00:00:00 UTC));
        assert_ne!(changed.digest(), base);
    }

    #[test]
    fn keys_emitted_in_sorted_order() {
        let json = sample().canonical_json();

        let mut positions = vec![];
        for key in [
            "breakTime",
            "contractType",
            "employerAddress",
            "employerCeo",
            "employerName",
            "employerPhone",
            "employerSign",
            "endDate",
            "hourlyWage",
            "payDay",
            "signedAt",
            "specialTerms",
            "startDate",
            "workDays",
            "workEnd",
            "workStart",
            "workerAddress",
            "workerBirth",
            "workerName",
            "workerPhone",
            "workerSign",
        ] {
            positions.push(
                json.find(&format!("\"{key}\":"))
                    .unwrap_or_else(|| panic!("missing key {key}")),
            );
        }

        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn absent_optionals_serialize_as_null() {
        let json = sample().canonical_json();

        assert!(json.contains("\"endDate\":null"));
        assert!(json.contains("\"specialTerms\":null"));
    }

    #[test]
    fn timestamps_use_fixed_precision() {
        let json = sample().canonical_json();

        assert!(json.contains("\"startDate\":\"2024-01-01T00:00:00.000Z\""));
        assert!(json.contains("\"signedAt\":\"2024-01-02T12:30:45.500Z\""));
    }

    #[test]
    fn json_roundtrips_as_valid_json() {
        let parsed: serde_json::Value =
            serde_json::from_str(&sample().canonical_json()).expect("canonical form parses");

        assert_eq!(parsed["hourlyWage"], 10320);
        assert_eq!(parsed["workerName"], "홍길동");
        assert_eq!(parsed["workDays"][0], "월");
    }
}
