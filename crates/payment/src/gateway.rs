use std::time::Duration;

use eventdesk_shared::Error;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// An order handle issued by the gateway, in minor currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> eventdesk_shared::Result<GatewayOrder>;

    fn verify_signature(&self, order_id: &str, payment_ref: &str, signature: &str) -> bool;
}

/// Lowercase hex HMAC-SHA256 of `{order_id}|{payment_ref}`, the digest the
/// gateway attaches to a completed checkout.
pub fn sign(secret: &str, order_id: &str, payment_ref: &str) -> String {
    hex::encode(mac(secret, order_id, payment_ref).finalize().into_bytes())
}

/// Constant-time check of a hex signature against the expected digest.
pub fn verify_signature(secret: &str, order_id: &str, payment_ref: &str, signature: &str) -> bool {
    let Ok(signature) = hex::decode(signature.trim()) else {
        return false;
    };

    mac(secret, order_id, payment_ref)
        .verify_slice(&signature)
        .is_ok()
}

fn mac(secret: &str, order_id: &str, payment_ref: &str) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_ref.as_bytes());
    mac
}

#[derive(Debug, Clone)]
pub struct RazorpayConfig {
    pub base_url: String,
    pub key_id: String,
    pub key_secret: String,
    pub timeout: Duration,
}

pub struct RazorpayGateway {
    client: reqwest::Client,
    config: RazorpayConfig,
}

#[derive(Serialize)]
struct OrderRequest<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
    payment_capture: u8,
}

impl RazorpayGateway {
    pub fn new(config: RazorpayConfig) -> eventdesk_shared::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| Error::Server(format!("failed to build gateway client: {err}")))?;

        Ok(Self {
            client,
            config: RazorpayConfig {
                base_url: config.base_url.trim_end_matches('/').to_owned(),
                ..config
            },
        })
    }
}

fn transport_error(err: reqwest::Error) -> Error {
    let retryable = err.is_timeout() || err.is_connect();
    Error::gateway(err.to_string(), retryable)
}

#[async_trait::async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> eventdesk_shared::Result<GatewayOrder> {
        let resp = self
            .client
            .post(format!("{}/orders", self.config.base_url))
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(&OrderRequest {
                amount: amount_minor,
                currency,
                receipt,
                payment_capture: 1,
            })
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), %message, "gateway rejected order");

            return Err(Error::gateway(
                format!("order rejected with status {status}"),
                status.is_server_error(),
            ));
        }

        let order = resp
            .json::<GatewayOrder>()
            .await
            .map_err(|err| Error::gateway(format!("malformed order response: {err}"), false))?;

        tracing::info!(order_id = %order.id, amount = order.amount, %receipt, "gateway order created");

        Ok(order)
    }

    fn verify_signature(&self, order_id: &str, payment_ref: &str, signature: &str) -> bool {
        verify_signature(&self.config.key_secret, order_id, payment_ref, signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_matches_reference_digest() {
        let signature = sign("secret", "order_123", "pay_456");
        assert_eq!(
            signature,
            "18bfc0baafae8f6367711ee362f2201aaa3654274683100e5367bb9a2bd29cbe"
        );
        assert!(verify_signature("secret", "order_123", "pay_456", &signature));
    }

    #[test]
    fn rejects_tampered_signatures() {
        let signature = sign("secret", "order_123", "pay_456");

        assert!(!verify_signature("other", "order_123", "pay_456", &signature));
        assert!(!verify_signature("secret", "order_124", "pay_456", &signature));
        assert!(!verify_signature("secret", "order_123", "pay_457", &signature));
        assert!(!verify_signature("secret", "order_123", "pay_456", "not-hex"));
        assert!(!verify_signature("secret", "order_123", "pay_456", &signature[..62]));
    }

    #[test]
    fn separator_is_part_of_the_message() {
        assert_ne!(sign("secret", "ab", "c"), sign("secret", "a", "bc"));
    }
}
