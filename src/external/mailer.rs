use crate::config::SmtpConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub html_body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> AppResult<()>;
}

#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

fn parse_mailbox(address: &str) -> AppResult<Mailbox> {
    address
        .parse::<Mailbox>()
        .map_err(|e| AppError::ValidationError(format!("Invalid email address {address}: {e}")))
}

impl SmtpMailer {
    /// Port 465 uses implicit TLS; any other port negotiates STARTTLS.
    pub fn new(config: &SmtpConfig) -> AppResult<Self> {
        let builder = if config.port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        }
        .map_err(|e| AppError::ConfigError(format!("Invalid SMTP relay {}: {e}", config.host)))?;

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        let from = parse_mailbox(&config.from_address)
            .map_err(|e| AppError::ConfigError(e.to_string()))?;

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> AppResult<()> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(parse_mailbox(&email.to)?)
            .subject(email.subject.as_str())
            .header(ContentType::TEXT_HTML);
        if let Some(reply_to) = &email.reply_to {
            builder = builder.reply_to(parse_mailbox(reply_to)?);
        }
        let message = builder
            .body(email.html_body)
            .map_err(|e| AppError::InternalError(format!("Failed to build email: {e}")))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Failed to send email: {e}")))?;

        log::info!("Email sent to {}", email.to);
        Ok(())
    }
}
