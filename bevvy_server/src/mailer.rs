use lettre::{
    message::Mailbox,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport,
    AsyncTransport,
    Message,
    Tokio1Executor,
};
use log::*;

use crate::{config::MailConfig, errors::DeliveryError};

#[allow(async_fn_in_trait)]
pub trait Messenger {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), DeliveryError>;
}

/// Sends mail through an SMTP relay, STARTTLS by default or wrapped TLS when the relay wants it.
/// The transport keeps its own connection pool, so cloning the messenger is cheap and sends reuse
/// connections where possible.
#[derive(Clone)]
pub struct SmtpMessenger {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMessenger {
    pub fn new(config: &MailConfig) -> Result<Self, DeliveryError> {
        let creds = Credentials::new(config.smtp_user.clone(), config.smtp_password.reveal().clone());
        let builder = if config.smtp_secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
        };
        let transport = builder.port(config.smtp_port).credentials(creds).build();
        let from = format!("BevvyRun <{}>", config.from_address)
            .parse::<Mailbox>()
            .map_err(|e| DeliveryError::InvalidMessage(format!("Invalid From address: {e}")))?;
        Ok(Self { transport, from })
    }
}

impl Messenger for SmtpMessenger {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), DeliveryError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse::<Mailbox>().map_err(|e| DeliveryError::InvalidMessage(format!("Invalid To address: {e}")))?)
            .subject(subject)
            .body(body.to_string())?;
        self.transport.send(message).await?;
        debug!("📧️ Sent \"{subject}\" to {to}");
        Ok(())
    }
}
