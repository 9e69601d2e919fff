use askama::Template;
use eventdesk_shared::Contact;

use crate::{EventSummary, Notification};

#[derive(Template)]
#[template(path = "registration-confirmed.html")]
pub struct RegistrationConfirmedHtml<'a> {
    pub name: &'a str,
    pub event: &'a EventSummary,
    pub registration_id: &'a str,
    pub year: i32,
}

#[derive(Template)]
#[template(path = "registration-confirmed.txt")]
pub struct RegistrationConfirmedPlain<'a> {
    pub name: &'a str,
    pub event: &'a EventSummary,
    pub registration_id: &'a str,
    pub year: i32,
}

#[derive(Template)]
#[template(path = "payment-confirmed.html")]
pub struct PaymentConfirmedHtml<'a> {
    pub name: &'a str,
    pub event: &'a EventSummary,
    pub amount: String,
    pub transaction_id: &'a str,
    pub year: i32,
}

#[derive(Template)]
#[template(path = "payment-confirmed.txt")]
pub struct PaymentConfirmedPlain<'a> {
    pub name: &'a str,
    pub event: &'a EventSummary,
    pub amount: String,
    pub transaction_id: &'a str,
    pub year: i32,
}

#[derive(Template)]
#[template(path = "event-reminder.html")]
pub struct EventReminderHtml<'a> {
    pub name: &'a str,
    pub event: &'a EventSummary,
    pub year: i32,
}

#[derive(Template)]
#[template(path = "event-reminder.txt")]
pub struct EventReminderPlain<'a> {
    pub name: &'a str,
    pub event: &'a EventSummary,
    pub year: i32,
}

#[derive(Template)]
#[template(path = "event-cancelled.html")]
pub struct EventCancelledHtml<'a> {
    pub name: &'a str,
    pub event: &'a EventSummary,
    pub year: i32,
}

#[derive(Template)]
#[template(path = "event-cancelled.txt")]
pub struct EventCancelledPlain<'a> {
    pub name: &'a str,
    pub event: &'a EventSummary,
    pub year: i32,
}

/// Renders the html and plain text bodies for a notification.
pub fn render(
    recipient: &Contact,
    notification: &Notification,
    year: i32,
) -> askama::Result<(String, String)> {
    let name = recipient.name.as_str();

    match notification {
        Notification::RegistrationConfirmed {
            event,
            registration_id,
        } => Ok((
            RegistrationConfirmedHtml {
                name,
                event,
                registration_id,
                year,
            }
            .render()?,
            RegistrationConfirmedPlain {
                name,
                event,
                registration_id,
                year,
            }
            .render()?,
        )),
        Notification::PaymentConfirmed {
            event,
            amount,
            transaction_id,
        } => Ok((
            PaymentConfirmedHtml {
                name,
                event,
                amount: amount.to_string(),
                transaction_id,
                year,
            }
            .render()?,
            PaymentConfirmedPlain {
                name,
                event,
                amount: amount.to_string(),
                transaction_id,
                year,
            }
            .render()?,
        )),
        Notification::EventReminder { event } => Ok((
            EventReminderHtml { name, event, year }.render()?,
            EventReminderPlain { name, event, year }.render()?,
        )),
        Notification::EventCancelled { event } => Ok((
            EventCancelledHtml { name, event, year }.render()?,
            EventCancelledPlain { name, event, year }.render()?,
        )),
    }
}

#[cfg(test)]
mod tests {
    use eventdesk_shared::Money;

    use super::*;

    fn contact() -> Contact {
        Contact {
            name: "Ada".to_owned(),
            email: "ada@eventdesk.localhost".to_owned(),
        }
    }

    fn summary() -> EventSummary {
        EventSummary {
            id: "e1".to_owned(),
            title: "Rust <meetup>".to_owned(),
            date: "2030-05-01".to_owned(),
            time: "18:30".to_owned(),
            venue: "Main hall".to_owned(),
        }
    }

    #[test]
    fn payment_body_carries_amount_and_reference() {
        let notification = Notification::PaymentConfirmed {
            event: summary(),
            amount: Money::from_minor(49900),
            transaction_id: "pay_123".to_owned(),
        };

        let (html, plain) = render(&contact(), &notification, 2030).unwrap();

        assert!(html.contains("499.00"));
        assert!(html.contains("pay_123"));
        assert!(html.contains("Rust &#60;meetup&#62;") || html.contains("Rust &lt;meetup&gt;"));
        assert!(plain.contains("Rust <meetup>"));
        assert!(plain.contains("Hello Ada"));
    }

    #[test]
    fn every_kind_renders() {
        let event = summary();
        let notifications = [
            Notification::RegistrationConfirmed {
                event: event.clone(),
                registration_id: "r1".to_owned(),
            },
            Notification::EventReminder {
                event: event.clone(),
            },
            Notification::EventCancelled { event },
        ];

        for notification in notifications {
            let (html, plain) = render(&contact(), &notification, 2030).unwrap();
            assert!(html.contains("Main hall"));
            assert!(plain.contains("2030-05-01"));
        }
    }
}
