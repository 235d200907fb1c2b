//! Canonical appointment payload
//!
//! One payload shape feeds every protocol step: create, PATCH repair, PUT
//! replace, and the alternate-envelope recreates. Relationship IDs are
//! always JSON numbers — some deployments silently drop relationship fields
//! sent as numeric strings.

use bookline_domain::{Envelope, Result, TimeFormat};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::scheduling::timezone::normalize;

/// Everything the CRM needs to store a complete appointment, in instant
/// form. Wall-clock rendering happens at payload build time via the
/// timezone normalizer.
#[derive(Debug, Clone)]
pub struct CanonicalAppointment {
    pub name: String,
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    /// IANA zone the CRM's own user renders times in.
    pub timezone: String,
    pub user_id: Option<i64>,
    pub contact_id: Option<i64>,
    pub event_type_id: i64,
    /// Only set for in-person meetings with a configured CRM location.
    pub location_id: Option<i64>,
}

impl CanonicalAppointment {
    /// Render the canonical payload with the given time granularity.
    pub fn payload(&self, format: TimeFormat) -> Result<Value> {
        let start = normalize(self.starts_at, &self.timezone)?;
        let end = normalize(self.ends_at, &self.timezone)?;
        let (start_time, end_time) = match format {
            TimeFormat::HourMinuteSecond => (start.time_hms, end.time_hms),
            TimeFormat::HourMinute => (start.time_hm, end.time_hm),
        };

        let mut payload = json!({
            "name": self.name,
            "description": self.description,
            "start_date": start.date,
            "start_time": start_time,
            "end_date": end.date,
            "end_time": end_time,
            "event_type_id": self.event_type_id,
        });
        // Optional relationships are omitted entirely rather than sent null.
        if let Some(map) = payload.as_object_mut() {
            if let Some(user_id) = self.user_id {
                map.insert("user_id".into(), json!(user_id));
            }
            if let Some(contact_id) = self.contact_id {
                map.insert("contact_id".into(), json!(contact_id));
            }
            if let Some(location_id) = self.location_id {
                map.insert("location_id".into(), json!(location_id));
            }
        }
        Ok(payload)
    }

    /// Render the payload wrapped in a deployment-specific envelope.
    pub fn enveloped(&self, format: TimeFormat, envelope: Envelope) -> Result<Value> {
        let payload = self.payload(format)?;
        Ok(match envelope {
            Envelope::Bare => payload,
            Envelope::Event => json!({ "event": payload }),
            Envelope::Data => json!({ "data": payload }),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn appointment() -> CanonicalAppointment {
        CanonicalAppointment {
            name: "Intake call".into(),
            description: "Initial consultation".into(),
            starts_at: Utc.with_ymd_and_hms(2025, 6, 1, 14, 30, 0).single().unwrap(),
            ends_at: Utc.with_ymd_and_hms(2025, 6, 1, 15, 0, 0).single().unwrap(),
            timezone: "America/New_York".into(),
            user_id: Some(12),
            contact_id: Some(34),
            event_type_id: 5,
            location_id: None,
        }
    }

    #[test]
    fn renders_local_wall_clock_fields() {
        let payload = appointment().payload(TimeFormat::HourMinuteSecond).unwrap();
        assert_eq!(payload["start_date"], "2025-06-01");
        assert_eq!(payload["start_time"], "10:30:00");
        assert_eq!(payload["end_time"], "11:00:00");
    }

    #[test]
    fn hour_minute_fallback_drops_seconds() {
        let payload = appointment().payload(TimeFormat::HourMinute).unwrap();
        assert_eq!(payload["start_time"], "10:30");
    }

    #[test]
    fn relationship_ids_are_numbers_never_strings() {
        let payload = appointment().payload(TimeFormat::HourMinuteSecond).unwrap();
        assert!(payload["user_id"].is_number());
        assert!(payload["contact_id"].is_number());
        assert!(payload["event_type_id"].is_number());
        // Unset location is omitted, not null.
        assert!(payload.get("location_id").is_none());
    }

    #[test]
    fn envelopes_wrap_the_same_payload() {
        let appt = appointment();
        let event = appt.enveloped(TimeFormat::HourMinuteSecond, Envelope::Event).unwrap();
        let data = appt.enveloped(TimeFormat::HourMinuteSecond, Envelope::Data).unwrap();
        assert_eq!(event["event"]["name"], "Intake call");
        assert_eq!(data["data"]["name"], "Intake call");
    }
}
