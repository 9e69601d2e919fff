use eventdesk_notification::Notification;
use eventdesk_shared::{Caller, Error, Money, today_utc};
use serde::Serialize;

use crate::{Lifecycle, summary};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RegisterOutcome {
    Confirmed {
        registration_id: String,
    },
    PaymentRequired {
        registration_id: String,
        amount: Money,
    },
}

impl RegisterOutcome {
    pub fn registration_id(&self) -> &str {
        match self {
            Self::Confirmed { registration_id } | Self::PaymentRequired { registration_id, .. } => {
                registration_id
            }
        }
    }
}

impl Lifecycle {
    /// Claims a seat for the caller.
    ///
    /// The checks up front give the user a precise answer in the common case.
    /// The seat claim and the registration row are then written in one
    /// transaction: the guarded increment refuses a full event and the unique
    /// `(user_id, event_id)` index refuses a duplicate, so concurrent callers
    /// can neither overbook nor register twice.
    #[tracing::instrument(skip(self, caller), fields(user_id = %caller.user_id))]
    pub async fn register(
        &self,
        caller: &Caller,
        event_id: &str,
    ) -> eventdesk_shared::Result<RegisterOutcome> {
        let Some(event) = self.events.find(event_id).await? else {
            return Err(Error::NotFound("event"));
        };

        if event.is_full() {
            return Err(Error::EventFull);
        }

        if self
            .registrations
            .is_registered(&caller.user_id, event_id)
            .await?
        {
            return Err(Error::AlreadyRegistered);
        }

        if event.deadline_passed(today_utc()) {
            return Err(Error::DeadlinePassed);
        }

        let mut tx = self.state.write_db.begin().await?;

        if eventdesk_event::claim_seat(&mut *tx, event_id).await? == 0 {
            tx.rollback().await?;

            return match self.events.find(event_id).await? {
                Some(_) => Err(Error::EventFull),
                None => Err(Error::NotFound("event")),
            };
        }

        let registration_id =
            eventdesk_registration::insert(&mut *tx, &caller.user_id, event_id, event.is_paid)
                .await?;

        tx.commit().await?;

        tracing::info!(%registration_id, %event_id, paid = event.is_paid, "registration created");

        if event.is_paid {
            return Ok(RegisterOutcome::PaymentRequired {
                registration_id,
                amount: event.price,
            });
        }

        self.notify(
            &caller.user_id,
            Notification::RegistrationConfirmed {
                event: summary(&event),
                registration_id: registration_id.to_owned(),
            },
        )
        .await;

        Ok(RegisterOutcome::Confirmed { registration_id })
    }

    /// Cancels the caller's registration for the event and gives the seat
    /// back. Payments are left untouched.
    #[tracing::instrument(skip(self, caller), fields(user_id = %caller.user_id))]
    pub async fn cancel(&self, caller: &Caller, event_id: &str) -> eventdesk_shared::Result<()> {
        let Some(registration) = self
            .registrations
            .find_by_user_and_event(&caller.user_id, event_id)
            .await?
        else {
            return Err(Error::NotFound("registration"));
        };

        let mut tx = self.state.write_db.begin().await?;

        if eventdesk_registration::cancel_active(&mut *tx, &registration.id).await? == 0 {
            tx.rollback().await?;

            return Err(Error::NotFound("registration"));
        }

        let released = eventdesk_event::release_seat(&mut *tx, event_id).await?;

        tx.commit().await?;

        tracing::info!(registration_id = %registration.id, %event_id, released, "registration cancelled");

        Ok(())
    }
}
