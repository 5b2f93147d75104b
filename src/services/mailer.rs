use futures::future::BoxFuture;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor, message::header::ContentType,
    transport::smtp::authentication::Credentials,
};
use std::sync::Arc;
use thiserror::Error;

use crate::config::Config;
use crate::database::models::Notification;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Email build error: {0}")]
    Build(String),

    #[error("Mail rejected: {0}")]
    Rejected(String),
}

/// A rendered message ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

impl From<&Notification> for OutgoingMail {
    fn from(notification: &Notification) -> Self {
        Self {
            to: notification.recipients.0.clone(),
            subject: notification.subject.clone(),
            body: notification.body.clone(),
        }
    }
}

pub trait Mailer: Send + Sync {
    fn send<'a>(&'a self, mail: &'a OutgoingMail) -> BoxFuture<'a, Result<(), MailError>>;
}

/// Sends over SMTP with STARTTLS, authenticating as the sender.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    pub fn new(
        host: &str,
        port: u16,
        username: String,
        password: String,
    ) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
            .port(port)
            .credentials(Credentials::new(username.clone(), password))
            .build();

        Ok(Self {
            transport,
            from_address: username,
        })
    }

    async fn deliver(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let mut builder = Message::builder()
            .from(self.from_address.parse()?)
            .subject(mail.subject.clone())
            .header(ContentType::TEXT_PLAIN);

        for address in &mail.to {
            builder = builder.to(address.parse()?);
        }

        let email = builder
            .body(mail.body.clone())
            .map_err(|e| MailError::Build(e.to_string()))?;

        self.transport.send(email).await?;

        log::info!("Sent \"{}\" to {}", mail.subject, mail.to.join(", "));
        Ok(())
    }
}

impl Mailer for SmtpMailer {
    fn send<'a>(&'a self, mail: &'a OutgoingMail) -> BoxFuture<'a, Result<(), MailError>> {
        Box::pin(self.deliver(mail))
    }
}

/// Writes mail to the log instead of sending it.
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send<'a>(&'a self, mail: &'a OutgoingMail) -> BoxFuture<'a, Result<(), MailError>> {
        Box::pin(async move {
            log::info!(
                "Mail not configured; would send \"{}\" to {}:\n{}",
                mail.subject,
                mail.to.join(", "),
                mail.body
            );
            Ok(())
        })
    }
}

/// SMTP when `EMAIL` and `EMAIL_PASSWORD` are both set, otherwise the log.
pub fn mailer_from_config(config: &Config) -> Result<Arc<dyn Mailer>, MailError> {
    match (&config.email_address, &config.email_password) {
        (Some(address), Some(password)) => Ok(Arc::new(SmtpMailer::new(
            &config.smtp_host,
            config.smtp_port,
            address.clone(),
            password.clone(),
        )?)),
        _ => {
            log::warn!("EMAIL/EMAIL_PASSWORD not set; notifications will only be logged");
            Ok(Arc::new(LogMailer))
        }
    }
}
