use chrono::{DateTime, Utc};

/// Hours from an RFC 3339 `start` to `end`, rounded to one decimal.
/// Returns `None` when `start` is not a timestamp (e.g. a bare "09:00") or
/// lies after `end`.
pub fn hours_between(start: &str, end: DateTime<Utc>) -> Option<f64> {
    let start = DateTime::parse_from_rfc3339(start).ok()?.to_utc();
    if end < start {
        return None;
    }
    let seconds = (end - start).num_seconds() as f64;
    Some((seconds / 3600.0 * 10.0).round() / 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_one_decimal() {
        let end = DateTime::parse_from_rfc3339("2024-01-01T11:20:00Z").unwrap().to_utc();
        assert_eq!(hours_between("2024-01-01T09:00:00Z", end), Some(2.3));
    }

    #[test]
    fn honours_offsets() {
        let end = DateTime::parse_from_rfc3339("2024-01-01T10:00:00Z").unwrap().to_utc();
        assert_eq!(hours_between("2024-01-01T09:00:00+01:00", end), Some(2.0));
    }

    #[test]
    fn end_before_start_is_not_time_worked() {
        let end = DateTime::parse_from_rfc3339("2024-01-01T09:00:00Z").unwrap().to_utc();
        assert_eq!(hours_between("2024-01-01T11:00:00Z", end), None);
        assert_eq!(hours_between("2024-01-01T09:00:00Z", end), Some(0.0));
    }

    #[test]
    fn rejects_non_timestamps() {
        assert_eq!(hours_between("09:00", Utc::now()), None);
    }
}
