//! Read-back verification
//!
//! "Persisted" means the CRM's stored record contains every field the
//! booking considers mandatory, verified by re-reading the record after a
//! write. The check is the single source of truth for the writer's repair
//! loop.

use bookline_domain::RequiredField;
use serde_json::Value;

use super::fields::{pick_i64, pick_str, record_object};

/// Which conditional fields the meeting requires on the stored record.
#[derive(Debug, Clone, Copy)]
pub struct VerifyExpectation {
    /// In-person meetings must carry a location relationship.
    pub require_location: bool,
    /// Set when a contact was supplied on the payload.
    pub require_contact: bool,
}

impl VerifyExpectation {
    /// Every field this expectation checks, used when a read-back cannot be
    /// obtained at all.
    pub fn all_fields(&self) -> Vec<RequiredField> {
        let mut fields = vec![
            RequiredField::Owner,
            RequiredField::StartTime,
            RequiredField::EndTime,
            RequiredField::StartDate,
            RequiredField::EndDate,
            RequiredField::EventType,
        ];
        if self.require_location {
            fields.push(RequiredField::Location);
        }
        if self.require_contact {
            fields.push(RequiredField::Contact);
        }
        fields
    }
}

/// Compute which required fields are absent from a read-back body.
pub fn missing_fields(readback: &Value, expect: &VerifyExpectation) -> Vec<RequiredField> {
    let record = record_object(readback);
    let mut missing = Vec::new();

    if pick_i64(record, &["user_id", "user", "owner_id", "owner"]).is_none() {
        missing.push(RequiredField::Owner);
    }
    if pick_str(record, &["start_time"]).is_none() {
        missing.push(RequiredField::StartTime);
    }
    if pick_str(record, &["end_time"]).is_none() {
        missing.push(RequiredField::EndTime);
    }
    if pick_str(record, &["start_date"]).is_none() {
        missing.push(RequiredField::StartDate);
    }
    if pick_str(record, &["end_date"]).is_none() {
        missing.push(RequiredField::EndDate);
    }
    if pick_i64(record, &["event_type_id", "event_type"]).is_none() {
        missing.push(RequiredField::EventType);
    }
    if expect.require_location && pick_i64(record, &["location_id", "location"]).is_none() {
        missing.push(RequiredField::Location);
    }
    if expect.require_contact && pick_i64(record, &["contact_id", "contact"]).is_none() {
        missing.push(RequiredField::Contact);
    }

    missing
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const EXPECT_CONTACT: VerifyExpectation =
        VerifyExpectation { require_location: false, require_contact: true };

    fn complete_record() -> Value {
        json!({
            "id": 99,
            "user_id": 12,
            "start_date": "2025-06-01",
            "start_time": "10:30:00",
            "end_date": "2025-06-01",
            "end_time": "11:00:00",
            "event_type_id": 5,
            "contact_id": 34,
        })
    }

    #[test]
    fn complete_record_has_no_missing_fields() {
        assert!(missing_fields(&complete_record(), &EXPECT_CONTACT).is_empty());
    }

    #[test]
    fn detects_dropped_start_time() {
        let mut record = complete_record();
        record.as_object_mut().unwrap().remove("start_time");
        assert_eq!(missing_fields(&record, &EXPECT_CONTACT), vec![RequiredField::StartTime]);
    }

    #[test]
    fn nested_owner_object_counts() {
        let mut record = complete_record();
        let map = record.as_object_mut().unwrap();
        map.remove("user_id");
        map.insert("user".into(), json!({"id": "12"}));
        assert!(missing_fields(&record, &EXPECT_CONTACT).is_empty());
    }

    #[test]
    fn location_checked_only_when_required() {
        let record = complete_record();
        let expect = VerifyExpectation { require_location: true, require_contact: true };
        assert_eq!(missing_fields(&record, &expect), vec![RequiredField::Location]);
        assert!(missing_fields(&record, &EXPECT_CONTACT).is_empty());
    }

    #[test]
    fn enveloped_readback_is_unwrapped() {
        let wrapped = json!({"event": complete_record()});
        assert!(missing_fields(&wrapped, &EXPECT_CONTACT).is_empty());
    }
}
