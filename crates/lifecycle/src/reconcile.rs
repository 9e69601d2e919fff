use eventdesk_notification::Notification;
use eventdesk_shared::{Contact, PaymentStatus, RegistrationStatus};
use serde::Serialize;
use sqlx::prelude::FromRow;
use time::Date;

use crate::{Lifecycle, summary};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Registrations confirmed because their payment had already succeeded.
    pub repaired: u64,
    /// Cancelled registrations that still hold a successful payment. These
    /// are reported for a manual refund and never touched.
    pub cancelled_with_payment: Vec<String>,
}

#[derive(FromRow)]
struct Unsettled {
    payment_id: String,
    registration_id: String,
    status: RegistrationStatus,
}

impl Lifecycle {
    /// Finds successful payments whose registration was never confirmed and
    /// confirms it.
    #[tracing::instrument(skip(self))]
    pub async fn reconcile(&self) -> eventdesk_shared::Result<ReconcileReport> {
        let rows = sqlx::query_as::<_, Unsettled>(
            r#"SELECT p.id AS payment_id, r.id AS registration_id, r.status
            FROM payment p
            JOIN registration r ON r.id = p.registration_id
            WHERE p.status = ? AND r.status != ?
            ORDER BY p.payment_date, p.id"#,
        )
        .bind(PaymentStatus::Success)
        .bind(RegistrationStatus::Confirmed)
        .fetch_all(&self.state.read_db)
        .await?;

        let mut report = ReconcileReport::default();

        for row in rows {
            match row.status {
                RegistrationStatus::Pending => {
                    let confirmed = eventdesk_registration::confirm_pending(
                        &self.state.write_db,
                        &row.registration_id,
                    )
                    .await?;

                    tracing::info!(
                        payment_id = %row.payment_id,
                        registration_id = %row.registration_id,
                        "registration confirmed from settled payment"
                    );

                    report.repaired += confirmed;
                }
                RegistrationStatus::Cancelled => {
                    tracing::warn!(
                        payment_id = %row.payment_id,
                        registration_id = %row.registration_id,
                        "cancelled registration holds a successful payment"
                    );

                    report.cancelled_with_payment.push(row.registration_id);
                }
                RegistrationStatus::Confirmed => {}
            }
        }

        Ok(report)
    }

    /// Reminds every confirmed participant of the events held on `date`.
    /// Returns the number of reminders handed to the notifier.
    #[tracing::instrument(skip(self))]
    pub async fn send_reminders(&self, date: Date) -> eventdesk_shared::Result<usize> {
        let mut sent = 0;

        for event in self.events.list_on(date).await? {
            let summary = summary(&event);

            for participant in self.registrations.list_by_event(&event.id).await? {
                if participant.status != RegistrationStatus::Confirmed {
                    continue;
                }

                let contact = Contact {
                    name: participant.name,
                    email: participant.email,
                };

                self.notify_contact(
                    &contact,
                    &Notification::EventReminder {
                        event: summary.clone(),
                    },
                )
                .await;

                sent += 1;
            }
        }

        tracing::info!(%date, sent, "reminders sent");

        Ok(sent)
    }
}
