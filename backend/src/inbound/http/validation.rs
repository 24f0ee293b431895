//! Shared validation helpers for inbound HTTP adapters.

use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::domain::{Error, TimeWindow, UserId};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    InvalidTimestamp,
    InvalidWindow,
    InvalidValue,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidTimestamp => "invalid_timestamp",
            Self::InvalidWindow => "invalid_window",
            Self::InvalidValue => "invalid_value",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

fn field_error(field: FieldName, message: String, code: ErrorCode, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| {
        let name = field.as_str();
        field_error(
            field,
            format!("{name} must be a valid UUID"),
            ErrorCode::InvalidUuid,
            value,
        )
    })
}

pub(crate) fn parse_user_id(value: &str, field: FieldName) -> Result<UserId, Error> {
    parse_uuid(value, field).map(UserId::from_uuid)
}

pub(crate) fn parse_rfc3339_timestamp(
    value: &str,
    field: FieldName,
) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| {
            let name = field.as_str();
            field_error(
                field,
                format!("{name} must be an RFC 3339 timestamp"),
                ErrorCode::InvalidTimestamp,
                value,
            )
        })
}

/// Parse a `startAt`/`endAt` pair into a validated window.
pub(crate) fn parse_window(start_at: &str, end_at: &str) -> Result<TimeWindow, Error> {
    let start = parse_rfc3339_timestamp(start_at, FieldName::new("startAt"))?;
    let end = parse_rfc3339_timestamp(end_at, FieldName::new("endAt"))?;
    TimeWindow::new(start, end).map_err(|_| {
        Error::invalid_request("endAt must not precede startAt").with_details(json!({
            "field": "endAt",
            "code": ErrorCode::InvalidWindow.as_str(),
        }))
    })
}

/// Surface a domain validation failure as a field-scoped request error.
pub(crate) fn invalid_field(
    field: FieldName,
    error: impl std::fmt::Display,
    value: &str,
) -> Error {
    field_error(field, error.to_string(), ErrorCode::InvalidValue, value)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[test]
    fn uuids_parse_and_report_field_context() {
        let ok = parse_uuid("3fa85f64-5717-4562-b3fc-2c963f66afa6", FieldName::new("id"));
        assert!(ok.is_ok());

        let err = parse_uuid("nope", FieldName::new("pupId")).expect_err("invalid uuid");
        let details = err.details().expect("details present");
        assert_eq!(details["field"], "pupId");
        assert_eq!(details["code"], "invalid_uuid");
    }

    #[rstest]
    #[case("2024-06-01T10:00:00Z", true)]
    #[case("2024-06-01T10:00:00+02:00", true)]
    #[case("2024-06-01 10:00", false)]
    #[case("yesterday", false)]
    fn timestamps_must_be_rfc3339(#[case] raw: &str, #[case] ok: bool) {
        let result = parse_rfc3339_timestamp(raw, FieldName::new("startAt"));
        assert_eq!(result.is_ok(), ok);
    }

    #[test]
    fn offset_timestamps_normalise_to_utc() {
        let parsed = parse_rfc3339_timestamp("2024-06-01T12:00:00+02:00", FieldName::new("t"))
            .expect("valid timestamp");
        assert_eq!(parsed.to_rfc3339(), "2024-06-01T10:00:00+00:00");
    }

    #[test]
    fn windows_reject_inverted_ranges() {
        let err = parse_window("2024-06-01T12:00:00Z", "2024-06-01T10:00:00Z")
            .expect_err("inverted window");
        let details = err.details().expect("details present");
        assert_eq!(details["code"], "invalid_window");
    }

    #[test]
    fn windows_accept_ordered_ranges() {
        let window = parse_window("2024-06-01T10:00:00Z", "2024-06-01T12:00:00Z")
            .expect("valid window");
        assert!(window.end_at() > window.start_at());
    }
}
