use eventdesk_shared::{
    Error, Money,
    validation::{parse_date, parse_time, require_fields, sanitize},
};
use serde::Deserialize;
use time::{Date, Time};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEventInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date: String,
    pub time: String,
    #[validate(length(min = 1, max = 200))]
    pub venue: String,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[serde(default)]
    pub price: Money,
    #[serde(default)]
    pub is_paid: bool,
    #[validate(range(min = 1))]
    pub max_participants: i64,
    #[serde(default)]
    pub registration_deadline: Option<String>,
}

/// A create request once every field has been checked and parsed.
pub(crate) struct NewEvent {
    pub title: String,
    pub description: String,
    pub date: Date,
    pub time: Time,
    pub venue: String,
    pub category: String,
    pub price: Money,
    pub is_paid: bool,
    pub max_participants: i64,
    pub registration_deadline: Option<Date>,
}

impl CreateEventInput {
    pub(crate) fn parse(self) -> eventdesk_shared::Result<NewEvent> {
        require_fields(&[
            ("title", &self.title),
            ("date", &self.date),
            ("time", &self.time),
            ("venue", &self.venue),
            ("category", &self.category),
        ])?;
        self.validate()?;

        let price = check_price(self.is_paid, self.price)?;

        Ok(NewEvent {
            title: sanitize(&self.title),
            description: sanitize(&self.description),
            date: parse_date(&self.date)?,
            time: parse_time(&self.time)?,
            venue: sanitize(&self.venue),
            category: sanitize(&self.category),
            price,
            is_paid: self.is_paid,
            max_participants: self.max_participants,
            registration_deadline: parse_deadline(self.registration_deadline.as_deref())?,
        })
    }
}

/// Fields an administrator may change on an existing event. Absent fields
/// are left untouched; an empty `registration_deadline` clears it.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct EventPatch {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub venue: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
    pub price: Option<Money>,
    pub is_paid: Option<bool>,
    #[validate(range(min = 1))]
    pub max_participants: Option<i64>,
    pub registration_deadline: Option<String>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.date.is_none()
            && self.time.is_none()
            && self.venue.is_none()
            && self.category.is_none()
            && self.price.is_none()
            && self.is_paid.is_none()
            && self.max_participants.is_none()
            && self.registration_deadline.is_none()
    }
}

pub(crate) fn check_price(is_paid: bool, price: Money) -> eventdesk_shared::Result<Money> {
    if price.is_negative() {
        return Err(Error::Invalid("price cannot be negative".to_owned()));
    }

    if !is_paid {
        return Ok(Money::ZERO);
    }

    if !price.is_positive() {
        return Err(Error::Invalid(
            "a paid event needs a price greater than zero".to_owned(),
        ));
    }

    Ok(price)
}

pub(crate) fn parse_deadline(value: Option<&str>) -> eventdesk_shared::Result<Option<Date>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_date(v).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> CreateEventInput {
        CreateEventInput {
            title: "Rust <b>meetup</b>".to_owned(),
            description: "Talks".to_owned(),
            date: "2030-05-01".to_owned(),
            time: "18:30".to_owned(),
            venue: "Main hall".to_owned(),
            category: "tech".to_owned(),
            price: Money::from_minor(49900),
            is_paid: true,
            max_participants: 50,
            registration_deadline: Some("2030-04-30".to_owned()),
        }
    }

    #[test]
    fn parses_a_valid_request() {
        let event = input().parse().unwrap();
        assert_eq!(event.title, "Rust meetup");
        assert_eq!(event.price.minor_units(), 49900);
        assert!(event.registration_deadline.is_some());
    }

    #[test]
    fn rejects_bad_fields() {
        let mut bad = input();
        bad.date = "01/05/2030".to_owned();
        assert!(bad.parse().is_err());

        let mut bad = input();
        bad.max_participants = 0;
        assert!(matches!(bad.parse(), Err(Error::Validate(_))));

        let mut bad = input();
        bad.price = Money::ZERO;
        assert!(matches!(bad.parse(), Err(Error::Invalid(_))));

        let mut bad = input();
        bad.venue = " ".to_owned();
        assert!(matches!(bad.parse(), Err(Error::Invalid(_))));
    }

    #[test]
    fn free_events_carry_no_price() {
        let mut free = input();
        free.is_paid = false;
        assert_eq!(free.parse().unwrap().price, Money::ZERO);
    }

    #[test]
    fn empty_deadline_is_none() {
        assert_eq!(parse_deadline(Some("")).unwrap(), None);
        assert_eq!(parse_deadline(None).unwrap(), None);
        assert!(parse_deadline(Some("tomorrow")).is_err());
    }
}
