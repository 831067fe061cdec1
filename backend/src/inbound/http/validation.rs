//! Field parsing for handler payloads.
//!
//! Every rejection is an `invalid_request` whose details name the field, a
//! problem code and, where useful, the offending value.

use std::str::FromStr;

use serde_json::{Value, json};

use crate::domain::{Error, UserId};

/// Why a request field was rejected; serialised as `details.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldProblem<'a> {
    Missing,
    NotUuid(&'a str),
    NotAllowed { value: &'a str, allowed: &'a str },
}

impl FieldProblem<'_> {
    fn into_error(self, field: &str) -> Error {
        let (message, details) = match self {
            Self::Missing => (
                format!("missing required field: {field}"),
                json!({ "field": field, "code": "missing_field" }),
            ),
            Self::NotUuid(value) => (
                format!("{field} must be a valid UUID"),
                Self::echo(field, "invalid_uuid", value),
            ),
            Self::NotAllowed { value, allowed } => (
                format!("{field} must be one of {allowed}"),
                Self::echo(field, "invalid_value", value),
            ),
        };
        Error::invalid_request(message).with_details(details)
    }

    fn echo(field: &str, code: &str, value: &str) -> Value {
        json!({ "field": field, "code": code, "value": value })
    }
}

/// `invalid_request` naming a required field that was absent.
pub(crate) fn missing_field_error(field: &str) -> Error {
    FieldProblem::Missing.into_error(field)
}

/// Require `value` to be present and non-blank.
pub(crate) fn require_text(value: Option<String>, field: &str) -> Result<String, Error> {
    value
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| missing_field_error(field))
}

/// Parse a required user identifier.
pub(crate) fn parse_user_id(value: Option<String>, field: &str) -> Result<UserId, Error> {
    let raw = require_text(value, field)?;
    UserId::new(&raw).map_err(|_| FieldProblem::NotUuid(&raw).into_error(field))
}

/// Parse a required enum value using its `FromStr` wire form.
pub(crate) fn parse_choice<T: FromStr>(
    value: Option<String>,
    field: &str,
    allowed: &str,
) -> Result<T, Error> {
    let raw = require_text(value, field)?;
    T::from_str(raw.trim()).map_err(|_| {
        FieldProblem::NotAllowed {
            value: &raw,
            allowed,
        }
        .into_error(field)
    })
}

/// Drop blank optional text.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode as DomainCode, PenaltyType};
    use rstest::rstest;

    const USER: &str = "userId";
    const PENALTY: &str = "penaltyType";

    #[rstest]
    #[case(None)]
    #[case(Some("   ".to_owned()))]
    fn missing_text_is_reported(#[case] value: Option<String>) {
        let err = require_text(value, USER).expect_err("blank rejected");
        assert_eq!(err.code(), DomainCode::InvalidRequest);
        let details = err.details().expect("details");
        assert_eq!(details["field"], "userId");
        assert_eq!(details["code"], "missing_field");
    }

    #[rstest]
    fn malformed_user_id_echoes_value() {
        let err = parse_user_id(Some("abc".to_owned()), USER).expect_err("invalid uuid");
        let details = err.details().expect("details");
        assert_eq!(details["code"], "invalid_uuid");
        assert_eq!(details["value"], "abc");
    }

    #[rstest]
    fn parses_known_choice() {
        let parsed: PenaltyType =
            parse_choice(Some("no_show".to_owned()), PENALTY, "late_cancellation, no_show")
                .expect("known penalty");
        assert_eq!(parsed, PenaltyType::NoShow);
    }

    #[rstest]
    fn unknown_choice_is_invalid_value() {
        let err = parse_choice::<PenaltyType>(
            Some("rudeness".to_owned()),
            PENALTY,
            "late_cancellation, no_show",
        )
        .expect_err("unknown penalty");
        let details = err.details().expect("details");
        assert_eq!(details["code"], "invalid_value");
        assert_eq!(details["value"], "rudeness");
        assert!(err.message().contains("late_cancellation, no_show"));
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some("  ".to_owned()), None)]
    #[case(Some(" BK-1 ".to_owned()), Some("BK-1".to_owned()))]
    fn non_blank_trims(#[case] input: Option<String>, #[case] expected: Option<String>) {
        assert_eq!(non_blank(input), expected);
    }
}
