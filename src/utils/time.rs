use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::{Error, Result};

/// Format `datetime` as an RFC 3339 timestamp truncated to whole seconds.
///
/// Timestamps in UTC sort lexically in chronological order.
pub fn transcript_stamp(datetime: OffsetDateTime) -> Result<String> {
    let datetime = datetime
        .to_offset(time::UtcOffset::UTC)
        .replace_nanosecond(0)
        .map_err(|e| Error::serialization(format!("invalid timestamp: {e}"), Some(Box::new(e))))?;
    datetime
        .format(&Rfc3339)
        .map_err(|e| Error::serialization(format!("invalid timestamp: {e}"), Some(Box::new(e))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn stamp_drops_subseconds() {
        let stamp = transcript_stamp(datetime!(2026-10-16 09:30:05.123456 UTC)).unwrap();
        assert_eq!(stamp, "2026-10-16T09:30:05Z");
    }

    #[test]
    fn stamp_normalizes_to_utc() {
        let stamp = transcript_stamp(datetime!(2026-10-16 11:30:05 +02:00)).unwrap();
        assert_eq!(stamp, "2026-10-16T09:30:05Z");
    }

    #[test]
    fn stamps_sort_chronologically() {
        let earlier = transcript_stamp(datetime!(2026-01-02 23:59:59 UTC)).unwrap();
        let later = transcript_stamp(datetime!(2026-10-16 00:00:00 UTC)).unwrap();
        assert!(earlier < later);
    }
}
