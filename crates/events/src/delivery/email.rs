//! Email notification delivery via SMTP.
//!
//! [`EmailDelivery`] wraps the `lettre` async SMTP transport. Configuration
//! is loaded from environment variables; if `SMTP_HOST` is not set,
//! [`EmailConfig::from_env`] returns `None` and email is disabled.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@projectpulse.local";

/// Prefix on every subject line.
const SUBJECT_PREFIX: &str = "[ProjectPulse]";

/// Configuration for SMTP delivery.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    /// Defaults to 587.
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set.
    ///
    /// | Variable        | Required | Default                       |
    /// |-----------------|----------|-------------------------------|
    /// | `SMTP_HOST`     | yes      |                               |
    /// | `SMTP_PORT`     | no       | `587`                         |
    /// | `SMTP_FROM`     | no       | `noreply@projectpulse.local`  |
    /// | `SMTP_USER`     | no       |                               |
    /// | `SMTP_PASSWORD` | no       |                               |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// OutgoingEmail
// ---------------------------------------------------------------------------

/// A rendered notification email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl OutgoingEmail {
    /// Render a notification message for one recipient.
    ///
    /// Urgent notifications and approval requests are flagged in the subject.
    pub fn for_notification(
        to: &str,
        recipient_name: &str,
        message: &str,
        is_urgent: bool,
        requires_approval: bool,
    ) -> Self {
        let tag = match (is_urgent, requires_approval) {
            (true, _) => " URGENT:",
            (false, true) => " Approval needed:",
            (false, false) => "",
        };
        let headline: String = message.chars().take(80).collect();
        Self {
            to: to.to_string(),
            subject: format!("{SUBJECT_PREFIX}{tag} {headline}"),
            body: format!(
                "Hello {recipient_name},\n\n{message}\n\nSign in to ProjectPulse for details."
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// EmailDelivery
// ---------------------------------------------------------------------------

/// Sends notification emails via SMTP.
pub struct EmailDelivery {
    from_address: String,
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailDelivery {
    /// Build the SMTP transport from configuration.
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            from_address: config.from_address.clone(),
            mailer: builder.build(),
        })
    }

    pub async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        let message = Message::builder()
            .from(self.from_address.parse()?)
            .to(email.to.parse()?)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone())
            .map_err(|e| EmailError::Build(e.to_string()))?;

        self.mailer.send(message).await?;

        tracing::info!(to = %email.to, subject = %email.subject, "Notification email sent");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
