mod admin;
mod payment;
mod reconcile;
mod register;

use std::sync::Arc;

use eventdesk_event::Event;
use eventdesk_notification::{EventSummary, Notification, Notifier};
use eventdesk_payment::PaymentGateway;
use eventdesk_shared::{
    Contact, State,
    validation::{format_date, format_time},
};

pub use admin::Dashboard;
pub use payment::{CompletePaymentInput, PaymentOrder, Settlement};
pub use reconcile::ReconcileReport;
pub use register::RegisterOutcome;

/// Default currency for gateway orders.
pub const DEFAULT_CURRENCY: &str = "INR";

/// Drives a registration from the first click to a confirmed seat.
///
/// Every operation takes the caller explicitly and runs to completion on its
/// own: the writes that must agree with each other share one transaction on
/// the write pool, and notifications go out only after that transaction has
/// committed.
#[derive(Clone)]
pub struct Lifecycle {
    state: State,
    pub events: eventdesk_event::Store,
    pub registrations: eventdesk_registration::Store,
    pub payments: eventdesk_payment::Store,
    pub users: eventdesk_user::Store,
    notifier: Arc<dyn Notifier>,
    gateway: Arc<dyn PaymentGateway>,
    currency: String,
}

impl Lifecycle {
    pub fn new(
        state: State,
        notifier: Arc<dyn Notifier>,
        gateway: Arc<dyn PaymentGateway>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            events: eventdesk_event::Store::new(state.clone()),
            registrations: eventdesk_registration::Store::new(state.clone()),
            payments: eventdesk_payment::Store::new(state.clone()),
            users: eventdesk_user::Store::new(state.clone()),
            state,
            notifier,
            gateway,
            currency: currency.into(),
        }
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Looks up the recipient and hands the message to the notifier. Never
    /// fails: delivery problems are logged and dropped.
    async fn notify(&self, user_id: &str, notification: Notification) {
        let contact = match self.users.contact(user_id).await {
            Ok(Some(contact)) => contact,
            Ok(None) => {
                tracing::warn!(%user_id, kind = %notification.kind(), "notification skipped, user not found");
                return;
            }
            Err(err) => {
                tracing::error!(%user_id, kind = %notification.kind(), error = %err, "notification skipped");
                return;
            }
        };

        self.notify_contact(&contact, &notification).await;
    }

    async fn notify_contact(&self, contact: &Contact, notification: &Notification) {
        if let Err(err) = self.notifier.send(contact, notification).await {
            tracing::error!(
                to = %contact.email,
                kind = %notification.kind(),
                error = %err,
                "failed to send notification"
            );
        }
    }
}

pub(crate) fn summary(event: &Event) -> EventSummary {
    EventSummary {
        id: event.id.to_owned(),
        title: event.title.to_owned(),
        date: format_date(event.date).unwrap_or_else(|_| event.date.to_string()),
        time: format_time(event.time).unwrap_or_else(|_| event.time.to_string()),
        venue: event.venue.to_owned(),
    }
}
