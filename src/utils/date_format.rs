use serde::{self, Deserialize, Deserializer, Serializer};
use time::{Date, OffsetDateTime, PrimitiveDateTime, macros::format_description};

/// Format a timestamp the way the protocol's `ClientDateTime` element expects
/// (`YYYY-MM-DDTHH:MM:SS`, no zone).
#[must_use]
pub fn client_datetime(stamp: OffsetDateTime) -> String {
    format_qb_datetime(PrimitiveDateTime::new(stamp.date(), stamp.time()))
}

/// Format a calendar date as the wire's `YYYY-MM-DD`.
#[must_use]
pub fn format_qb_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Format a timestamp as the wire's `YYYY-MM-DDTHH:MM:SS`.
#[must_use]
pub fn format_qb_datetime(stamp: PrimitiveDateTime) -> String {
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
        stamp.year(),
        u8::from(stamp.month()),
        stamp.day(),
        stamp.hour(),
        stamp.minute(),
        stamp.second()
    )
}

/// Parse the wire's `YYYY-MM-DD` date form.
pub fn parse_qb_date(value: &str) -> Result<Date, String> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(value, &format).map_err(|e| format!("failed to parse date '{value}': {e}"))
}

/// Parse the wire's `YYYY-MM-DDTHH:MM:SS` timestamp form.
pub fn parse_qb_datetime(value: &str) -> Result<PrimitiveDateTime, String> {
    let format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    PrimitiveDateTime::parse(value, &format)
        .map_err(|e| format!("failed to parse datetime '{value}': {e}"))
}

// Serialization module for required qbXML dates
pub mod qb_date_format {
    use super::{Date, Deserialize, Deserializer, Serializer, format_qb_date, parse_qb_date, serde};

    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_qb_date(*date))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        parse_qb_date(&value).map_err(serde::de::Error::custom)
    }
}

// Optional qbXML date serialization
pub mod qb_date_format_option {
    use super::{Date, Deserialize, Deserializer, Serializer, format_qb_date, parse_qb_date};

    pub fn serialize<S>(date: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => serializer.serialize_str(&format_qb_date(*date)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt = Option::<String>::deserialize(deserializer)?;
        match opt {
            Some(s) if !s.is_empty() => Ok(parse_qb_date(&s).ok()),
            _ => Ok(None),
        }
    }
}

// Optional qbXML timestamp serialization
pub mod qb_datetime_format_option {
    use super::{
        Deserialize, Deserializer, PrimitiveDateTime, Serializer, format_qb_datetime,
        parse_qb_datetime,
    };

    pub fn serialize<S>(stamp: &Option<PrimitiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match stamp {
            Some(stamp) => serializer.serialize_str(&format_qb_datetime(*stamp)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<PrimitiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt = Option::<String>::deserialize(deserializer)?;
        match opt {
            Some(s) if !s.is_empty() => Ok(parse_qb_datetime(&s).ok()),
            _ => Ok(None),
        }
    }
}
