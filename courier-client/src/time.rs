//! Wire-timestamp conversion.

use chrono::{DateTime, TimeZone, Utc};

/// Convert a wire unix timestamp to a UTC datetime.
///
/// The wire uses `0` for "unset"; that maps to `None`.
pub(crate) fn timestamp_to_datetime(ts: i32) -> Option<DateTime<Utc>> {
    if ts == 0 {
        return None;
    }
    Utc.timestamp_opt(i64::from(ts), 0).single()
}

/// Like [`timestamp_to_datetime`], for optional wire fields.
pub(crate) fn optional_timestamp(ts: Option<i32>) -> Option<DateTime<Utc>> {
    ts.and_then(timestamp_to_datetime)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_unset() {
        assert_eq!(timestamp_to_datetime(0), None);
    }

    #[test]
    fn epoch_offset_converts() {
        let dt = timestamp_to_datetime(1_700_000_000).unwrap();
        assert_eq!(dt.timestamp(), 1_700_000_000);
    }
}
