use eventdesk_notification::Notification;
use eventdesk_payment::{CreatePaymentInput, GATEWAY_METHOD, Payment};
use eventdesk_shared::{Caller, Error, Money, PaymentStatus, RegistrationStatus};
use serde::{Deserialize, Serialize};

use crate::{Lifecycle, summary};

/// What the client needs to open the gateway checkout.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentOrder {
    pub payment_id: String,
    pub order_id: String,
    pub amount: Money,
    pub amount_minor: i64,
    pub currency: String,
    pub event_title: String,
}

/// Where a completed payment leaves the registration it paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Settlement {
    /// The registration holds a confirmed seat.
    Confirmed,
    /// The registration was cancelled and no seat is left to give back;
    /// the captured amount has to be refunded.
    RefundDue,
}

/// The fields the gateway hands back to the client after checkout.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletePaymentInput {
    pub order_id: String,
    pub payment_ref: String,
    pub signature: String,
}

impl Lifecycle {
    /// Opens a gateway order for a pending paid registration and records a
    /// pending payment against it. Nothing is written unless the gateway
    /// issued an order.
    #[tracing::instrument(skip(self, caller), fields(user_id = %caller.user_id))]
    pub async fn initiate_payment(
        &self,
        caller: &Caller,
        registration_id: &str,
    ) -> eventdesk_shared::Result<PaymentOrder> {
        let Some(registration) = self.registrations.find(registration_id).await? else {
            return Err(Error::NotFound("registration"));
        };

        if !caller.owns(&registration.user_id) {
            return Err(Error::Forbidden);
        }

        let Some(event) = self.events.find(&registration.event_id).await? else {
            return Err(Error::NotFound("event"));
        };

        if !event.is_paid || !event.price.is_positive() {
            return Err(Error::NotPayable);
        }

        if self.payments.has_success(registration_id).await? {
            return Err(Error::AlreadyPaid);
        }

        if registration.status == RegistrationStatus::Cancelled {
            return Err(Error::Invalid("registration is cancelled".to_owned()));
        }

        let order = self
            .gateway
            .create_order(
                event.price.minor_units(),
                &self.currency,
                &format!("reg_{registration_id}"),
            )
            .await?;

        let payment_id = self
            .payments
            .create(CreatePaymentInput {
                registration_id: registration_id.to_owned(),
                user_id: registration.user_id,
                event_id: event.id,
                amount: event.price,
                order_id: Some(order.id.to_owned()),
                transaction_id: None,
                payment_method: GATEWAY_METHOD.to_owned(),
            })
            .await?;

        tracing::info!(%payment_id, order_id = %order.id, amount = %event.price, "payment initiated");

        Ok(PaymentOrder {
            payment_id,
            order_id: order.id,
            amount: event.price,
            amount_minor: order.amount,
            currency: order.currency,
            event_title: event.title,
        })
    }

    /// Settles a payment from the gateway's signed confirmation.
    ///
    /// A bad signature, or one for a different order, fails the attempt for
    /// good. A good one marks the payment successful and confirms the
    /// registration in the same transaction. A registration cancelled while
    /// the checkout was open gets its seat back when one is free, otherwise
    /// it stays cancelled and the payment is reported as due for refund.
    /// Completing an already settled payment again is a no-op.
    #[tracing::instrument(skip(self, caller, input), fields(user_id = %caller.user_id, order_id = %input.order_id))]
    pub async fn complete_payment(
        &self,
        caller: &Caller,
        payment_id: &str,
        input: CompletePaymentInput,
    ) -> eventdesk_shared::Result<Settlement> {
        let verified =
            self.gateway
                .verify_signature(&input.order_id, &input.payment_ref, &input.signature);

        let payment = self.payments.find(payment_id).await?;

        let Some(payment) = payment.filter(|payment| caller.owns(&payment.user_id)) else {
            if !verified {
                return Err(Error::VerificationFailed);
            }

            return Err(Error::NotFound("payment"));
        };

        if !verified || payment.order_id.as_deref() != Some(input.order_id.as_str()) {
            let failed = eventdesk_payment::fail_pending(&self.state.write_db, payment_id).await?;
            tracing::warn!(%payment_id, failed, "payment signature rejected");

            return Err(Error::VerificationFailed);
        }

        if payment.is_success() {
            return self.settlement_of(&payment.registration_id).await;
        }

        if payment.status != PaymentStatus::Pending {
            return Err(Error::Invalid(format!("payment is {}", payment.status)));
        }

        let mut tx = self.state.write_db.begin().await?;

        eventdesk_payment::set_status(
            &mut *tx,
            payment_id,
            PaymentStatus::Success,
            Some(&input.payment_ref),
        )
        .await?;

        let registration_id = payment.registration_id.as_str();
        let mut settlement = Settlement::Confirmed;

        if eventdesk_registration::confirm_pending(&mut *tx, registration_id).await? == 0
            && eventdesk_registration::reinstate_cancelled(&mut *tx, registration_id).await? > 0
            && eventdesk_event::claim_seat(&mut *tx, &payment.event_id).await? == 0
        {
            eventdesk_registration::cancel_active(&mut *tx, registration_id).await?;
            settlement = Settlement::RefundDue;
        }

        tx.commit().await?;

        if settlement == Settlement::RefundDue {
            tracing::warn!(
                %payment_id,
                %registration_id,
                "payment captured for a cancelled registration without a free seat"
            );
        } else {
            tracing::info!(%payment_id, %registration_id, "payment completed");
        }

        let event = match self.events.find(&payment.event_id).await {
            Ok(Some(event)) => event,
            Ok(None) => return Ok(settlement),
            Err(err) => {
                tracing::error!(%payment_id, error = %err, "confirmation notifications skipped");
                return Ok(settlement);
            }
        };

        let summary = summary(&event);

        self.notify(
            &payment.user_id,
            Notification::PaymentConfirmed {
                event: summary.clone(),
                amount: payment.amount,
                transaction_id: input.payment_ref,
            },
        )
        .await;

        if settlement == Settlement::Confirmed {
            self.notify(
                &payment.user_id,
                Notification::RegistrationConfirmed {
                    event: summary,
                    registration_id: payment.registration_id.to_owned(),
                },
            )
            .await;
        }

        Ok(settlement)
    }

    async fn settlement_of(&self, registration_id: &str) -> eventdesk_shared::Result<Settlement> {
        let cancelled = self
            .registrations
            .find(registration_id)
            .await?
            .is_none_or(|registration| registration.status == RegistrationStatus::Cancelled);

        Ok(if cancelled {
            Settlement::RefundDue
        } else {
            Settlement::Confirmed
        })
    }

    /// Marks an abandoned or declined checkout as failed.
    pub async fn fail_payment(
        &self,
        caller: &Caller,
        payment_id: &str,
    ) -> eventdesk_shared::Result<()> {
        let payment = self.payment_for(caller, payment_id).await?;

        match payment.status {
            PaymentStatus::Pending => {
                eventdesk_payment::fail_pending(&self.state.write_db, payment_id).await?;
                tracing::info!(%payment_id, "payment failed by user");

                Ok(())
            }
            PaymentStatus::Failed => Ok(()),
            PaymentStatus::Success | PaymentStatus::Refunded => Err(Error::AlreadyPaid),
        }
    }

    /// A payment, visible to its owner and to administrators.
    pub async fn payment_for(
        &self,
        caller: &Caller,
        payment_id: &str,
    ) -> eventdesk_shared::Result<Payment> {
        let Some(payment) = self.payments.find(payment_id).await? else {
            return Err(Error::NotFound("payment"));
        };

        if !caller.owns(&payment.user_id) && !caller.is_admin() {
            return Err(Error::Forbidden);
        }

        Ok(payment)
    }
}
