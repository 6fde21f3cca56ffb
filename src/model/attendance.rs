use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::utils::shift::hours_between;

/// One user's attendance for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": "1",
    "userId": 1,
    "userName": "admin",
    "date": "2024-01-01",
    "checkIn": "2024-01-01T09:00:00Z",
    "checkOut": "2024-01-01T17:30:00Z"
}))]
pub struct AttendanceRecord {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub user_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out: Option<String>,
}

impl AttendanceRecord {
    /// Checked in and not yet checked out.
    pub fn is_open(&self) -> bool {
        self.check_in.is_some() && self.check_out.is_none()
    }

    /// Length of a closed shift, when both ends are RFC 3339 timestamps.
    pub fn worked_hours(&self) -> Option<f64> {
        let check_in = self.check_in.as_deref()?;
        let check_out = DateTime::parse_from_rfc3339(self.check_out.as_deref()?).ok()?;
        hours_between(check_in, check_out.to_utc())
    }
}

// Older data files wrote ids as bare numbers.
fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}
