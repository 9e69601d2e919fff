//! Email delivery over SMTP using lettre

use eventdesk_shared::Contact;
use lettre::{
    Message, SmtpTransport, Transport, message::MultiPart,
    transport::smtp::authentication::Credentials,
};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{Notification, Notifier, template};

#[derive(Debug, Deserialize, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_address: String,
}

#[derive(Clone)]
pub struct EmailService {
    mailer: SmtpTransport,
    from: String,
}

impl EmailService {
    pub fn new(config: &EmailConfig) -> anyhow::Result<Self> {
        let mailer = if config.smtp_username.is_empty() || config.smtp_password.is_empty() {
            tracing::info!(
                smtp_host = %config.smtp_host,
                smtp_port = config.smtp_port,
                "SMTP credentials not configured, using unauthenticated connection"
            );

            SmtpTransport::builder_dangerous(&config.smtp_host)
                .port(config.smtp_port)
                .build()
        } else {
            tracing::info!(
                smtp_host = %config.smtp_host,
                smtp_port = config.smtp_port,
                from = %config.from_address,
                "Email service initialized with authentication and TLS"
            );

            let creds =
                Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());

            SmtpTransport::relay(&config.smtp_host)?
                .port(config.smtp_port)
                .credentials(creds)
                .build()
        };

        Ok(Self {
            mailer,
            from: config.from_address.clone(),
        })
    }

    /// Sends a multipart message. The SMTP exchange is blocking, so it runs
    /// on the blocking pool.
    #[tracing::instrument(skip(self, html, plain))]
    pub async fn send_mail(
        &self,
        to: &str,
        subject: &str,
        html: String,
        plain: String,
    ) -> anyhow::Result<()> {
        let message = Message::builder()
            .from(self.from.parse()?)
            .to(to.parse()?)
            .subject(subject)
            .multipart(MultiPart::alternative_plain_html(plain, html))?;

        let mailer = self.mailer.clone();
        tokio::task::spawn_blocking(move || mailer.send(&message)).await??;

        tracing::info!("email sent");

        Ok(())
    }
}

#[async_trait::async_trait]
impl Notifier for EmailService {
    async fn send(&self, recipient: &Contact, notification: &Notification) -> anyhow::Result<()> {
        let year = OffsetDateTime::now_utc().year();
        let (html, plain) = template::render(recipient, notification, year)?;

        self.send_mail(&recipient.email, &notification.subject(), html, plain)
            .await
    }
}
