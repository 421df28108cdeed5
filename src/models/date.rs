//! Calendar dates coming from the store. Records are written as `YYYY-MM-DD`,
//! but a full timestamp is also accepted and reduced to its UTC date.

use jiff::{Timestamp, civil::Date, tz::TimeZone};
use serde::{Deserialize, Deserializer, de::Error};

pub fn parse(raw: &str) -> Result<Date, jiff::Error> {
    let raw = raw.trim();
    raw.parse::<Date>().or_else(|e| {
        raw.parse::<Timestamp>()
            .map(|ts| ts.to_zoned(TimeZone::UTC).date())
            .map_err(|_| e)
    })
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(|e| D::Error::custom(format!("invalid date '{}': {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_date_is_accepted() {
        assert_eq!(parse("2025-03-01").unwrap(), jiff::civil::date(2025, 3, 1));
    }

    #[test]
    fn test_timestamp_reduces_to_utc_date() {
        assert_eq!(
            parse("2025-02-01T10:00:00.000Z").unwrap(),
            jiff::civil::date(2025, 2, 1)
        );
        assert_eq!(
            parse("2024-12-31T23:59:59Z").unwrap(),
            jiff::civil::date(2024, 12, 31)
        );
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(parse("last tuesday").is_err());
        assert!(parse("").is_err());
    }
}
