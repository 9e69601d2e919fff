//! Input checks applied at the boundary, before anything touches storage.

use std::sync::LazyLock;

use regex::Regex;
use time::{Date, Time, format_description::BorrowedFormatItem, macros::format_description};

use crate::{Error, Result};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
pub const TIME_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]");

pub const MIN_PASSWORD_LEN: usize = 6;

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Ten digits once separators are stripped.
pub fn is_valid_phone(phone: &str) -> bool {
    phone.chars().filter(char::is_ascii_digit).count() == 10
        && phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')' | '+'))
}

pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::Invalid(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }

    Ok(())
}

pub fn parse_date(value: &str) -> Result<Date> {
    Date::parse(value.trim(), DATE_FORMAT)
        .map_err(|_| Error::Invalid(format!("invalid date `{value}`, expected YYYY-MM-DD")))
}

pub fn parse_time(value: &str) -> Result<Time> {
    Time::parse(value.trim(), TIME_FORMAT)
        .map_err(|_| Error::Invalid(format!("invalid time `{value}`, expected HH:MM")))
}

pub fn format_date(date: Date) -> Result<String> {
    Ok(date.format(DATE_FORMAT)?)
}

pub fn format_time(time: Time) -> Result<String> {
    Ok(time.format(TIME_FORMAT)?)
}

/// Fails on the first field whose value is blank.
pub fn require_fields(fields: &[(&str, &str)]) -> Result<()> {
    for (name, value) in fields {
        if value.trim().is_empty() {
            return Err(Error::Invalid(format!("{name} is required")));
        }
    }

    Ok(())
}

/// Removes markup and surrounding whitespace from free text.
pub fn sanitize(value: &str) -> String {
    TAG_RE.replace_all(value, "").trim().to_owned()
}

/// Validator hook for `#[validate(custom(function = ...))]`.
pub fn phone(value: &str) -> std::result::Result<(), validator::ValidationError> {
    if is_valid_phone(value) {
        return Ok(());
    }

    Err(validator::ValidationError::new("phone")
        .with_message("phone number must have 10 digits".into()))
}
