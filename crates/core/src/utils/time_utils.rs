use chrono::{DateTime, SecondsFormat, Utc};

/// Current instant as an RFC 3339 UTC string with millisecond precision,
/// e.g. `2024-05-01T08:30:00.000Z`.
pub fn now_iso() -> String {
    to_iso(Utc::now())
}

pub fn to_iso(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Timestamp for a record refresh that never precedes `created_at`.
///
/// Imported records may carry creation times from a clock that ran ahead;
/// in that case the creation time itself is reused.
pub fn refreshed_timestamp(created_at: &str) -> String {
    let now = Utc::now();
    match DateTime::parse_from_rfc3339(created_at) {
        Ok(created) if created.with_timezone(&Utc) > now => created_at.to_string(),
        _ => to_iso(now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn now_iso_is_rfc3339_utc() {
        let ts = now_iso();
        assert!(ts.ends_with('Z'));
        assert!(DateTime::parse_from_rfc3339(&ts).is_ok());
    }

    #[test]
    fn refreshed_timestamp_never_precedes_creation() {
        let future = to_iso(Utc::now() + Duration::days(1));
        assert_eq!(refreshed_timestamp(&future), future);

        let past = "2020-01-01T00:00:00.000Z";
        let refreshed = refreshed_timestamp(past);
        assert!(refreshed.as_str() > past);
    }

    #[test]
    fn refreshed_timestamp_tolerates_unparseable_creation() {
        let refreshed = refreshed_timestamp("yesterday");
        assert!(DateTime::parse_from_rfc3339(&refreshed).is_ok());
    }
}
