use eventdesk_event::{CreateEventInput, EventPatch};
use eventdesk_notification::Notification;
use eventdesk_payment::EventPayment;
use eventdesk_registration::Participant;
use eventdesk_shared::{Caller, Contact, Error, Money};
use eventdesk_user::User;
use serde::Serialize;

use crate::{Lifecycle, summary};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub total_events: i64,
    pub upcoming_events: i64,
    pub total_users: i64,
    pub confirmed_registrations: i64,
    pub total_revenue: Money,
}

impl Lifecycle {
    pub async fn create_event(
        &self,
        caller: &Caller,
        input: CreateEventInput,
    ) -> eventdesk_shared::Result<String> {
        caller.require_admin()?;

        self.events.create(input, &caller.user_id).await
    }

    pub async fn update_event(
        &self,
        caller: &Caller,
        event_id: &str,
        patch: EventPatch,
    ) -> eventdesk_shared::Result<u64> {
        caller.require_admin()?;

        if self.events.find(event_id).await?.is_none() {
            return Err(Error::NotFound("event"));
        }

        let affected = self.events.update(event_id, patch).await?;
        tracing::info!(%event_id, affected, "event updated");

        Ok(affected)
    }

    /// Tells everyone still registered that the event is off, then deletes
    /// it. Registrations and payments stay behind as history. Returns the
    /// number of participants notified.
    #[tracing::instrument(skip(self, caller), fields(user_id = %caller.user_id))]
    pub async fn cancel_event(
        &self,
        caller: &Caller,
        event_id: &str,
    ) -> eventdesk_shared::Result<usize> {
        caller.require_admin()?;

        let Some(event) = self.events.find(event_id).await? else {
            return Err(Error::NotFound("event"));
        };

        let summary = summary(&event);
        let mut notified = 0;

        for participant in self.registrations.list_by_event(event_id).await? {
            if participant.status == eventdesk_shared::RegistrationStatus::Cancelled {
                continue;
            }

            let contact = Contact {
                name: participant.name,
                email: participant.email,
            };

            self.notify_contact(
                &contact,
                &Notification::EventCancelled {
                    event: summary.clone(),
                },
            )
            .await;

            notified += 1;
        }

        self.events.delete(event_id).await?;

        tracing::info!(%event_id, notified, "event cancelled");

        Ok(notified)
    }

    pub async fn dashboard(&self, caller: &Caller) -> eventdesk_shared::Result<Dashboard> {
        caller.require_admin()?;

        Ok(Dashboard {
            total_events: self.events.count().await?,
            upcoming_events: self.events.count_upcoming().await?,
            total_users: self.users.count().await?,
            confirmed_registrations: self.registrations.count_all_confirmed().await?,
            total_revenue: self.payments.total_revenue_all().await?,
        })
    }

    pub async fn participants(
        &self,
        caller: &Caller,
        event_id: &str,
    ) -> eventdesk_shared::Result<Vec<Participant>> {
        caller.require_admin()?;

        self.registrations.list_by_event(event_id).await
    }

    pub async fn event_payments(
        &self,
        caller: &Caller,
        event_id: &str,
    ) -> eventdesk_shared::Result<Vec<EventPayment>> {
        caller.require_admin()?;

        self.payments.list_by_event(event_id).await
    }

    pub async fn list_users(&self, caller: &Caller) -> eventdesk_shared::Result<Vec<User>> {
        caller.require_admin()?;

        self.users.list_all().await
    }
}
