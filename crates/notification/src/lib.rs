mod service;
mod template;

use eventdesk_shared::{Contact, Money};
use serde::Serialize;
use strum::{AsRefStr, Display};

pub use service::*;

/// What the recipient needs to know about the event a message is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventSummary {
    pub id: String,
    pub title: String,
    pub date: String,
    pub time: String,
    pub venue: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum NotificationKind {
    RegistrationConfirmed,
    PaymentConfirmed,
    EventReminder,
    EventCancelled,
}

/// A message to a participant. The variant picks the template, the fields
/// fill it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    RegistrationConfirmed {
        event: EventSummary,
        registration_id: String,
    },
    PaymentConfirmed {
        event: EventSummary,
        amount: Money,
        transaction_id: String,
    },
    EventReminder {
        event: EventSummary,
    },
    EventCancelled {
        event: EventSummary,
    },
}

impl Notification {
    pub fn kind(&self) -> NotificationKind {
        match self {
            Self::RegistrationConfirmed { .. } => NotificationKind::RegistrationConfirmed,
            Self::PaymentConfirmed { .. } => NotificationKind::PaymentConfirmed,
            Self::EventReminder { .. } => NotificationKind::EventReminder,
            Self::EventCancelled { .. } => NotificationKind::EventCancelled,
        }
    }

    pub fn event(&self) -> &EventSummary {
        match self {
            Self::RegistrationConfirmed { event, .. }
            | Self::PaymentConfirmed { event, .. }
            | Self::EventReminder { event }
            | Self::EventCancelled { event } => event,
        }
    }

    pub fn subject(&self) -> String {
        let title = &self.event().title;

        match self {
            Self::RegistrationConfirmed { .. } => format!("Registration confirmed: {title}"),
            Self::PaymentConfirmed { .. } => format!("Payment received: {title}"),
            Self::EventReminder { .. } => format!("Reminder: {title} is tomorrow"),
            Self::EventCancelled { .. } => format!("Event cancelled: {title}"),
        }
    }
}

/// Delivers notifications. Callers treat delivery as best-effort: a failure
/// is logged, never surfaced to the user whose action triggered it.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, recipient: &Contact, notification: &Notification) -> anyhow::Result<()>;
}

/// Writes notifications to the log instead of delivering them.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, recipient: &Contact, notification: &Notification) -> anyhow::Result<()> {
        tracing::info!(
            to = %recipient.email,
            kind = %notification.kind(),
            subject = %notification.subject(),
            "notification (email disabled)"
        );

        Ok(())
    }
}
