//! SMTP digest delivery.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use lettre::message::{header::ContentType, Mailbox, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::MailConfig;

/// Build the digest subject line for the given handles and local date.
#[must_use]
pub fn digest_subject(handles: &[String], date: NaiveDate) -> String {
    format!(
        "@{} Tweet Digest for {}",
        handles.join("/@"),
        date.format("%-m/%-d/%y")
    )
}

/// Email sender for digest delivery.
pub struct EmailSender {
    config: MailConfig,
}

impl EmailSender {
    /// Create a new email sender with the given configuration.
    #[must_use]
    pub const fn new(config: MailConfig) -> Self {
        Self { config }
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(MailConfig::from_env()?))
    }

    /// Send the digest HTML to all configured recipients.
    pub async fn send(&self, subject: &str, html_body: &str) -> Result<()> {
        let from = Mailbox::new(
            Some(self.config.from_name.clone()),
            self.config
                .from_email
                .parse()
                .context("Invalid from email address")?,
        );

        let mut builder = Message::builder().from(from).subject(subject);
        for to in &self.config.to_emails {
            builder = builder.to(to
                .parse()
                .with_context(|| format!("Invalid recipient address: {to}"))?);
        }

        let email = builder
            .singlepart(
                SinglePart::builder()
                    .header(ContentType::TEXT_HTML)
                    .body(html_body.to_string()),
            )
            .context("Failed to build email message")?;

        let creds = Credentials::new(
            self.config.smtp_username.clone(),
            self.config.smtp_password.clone(),
        );

        let mailer: AsyncSmtpTransport<Tokio1Executor> =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)
                .context("Failed to create SMTP transport")?
                .port(self.config.smtp_port)
                .credentials(creds)
                .build();

        mailer
            .send(email)
            .await
            .context("Failed to send email via SMTP")?;

        tracing::info!(
            subject,
            recipients = self.config.to_emails.len(),
            "Email sent successfully"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_joins_handles_and_formats_date() {
        let handles = vec!["alice".to_string(), "bob".to_string()];
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        assert_eq!(
            digest_subject(&handles, date),
            "@alice/@bob Tweet Digest for 3/4/24"
        );
    }

    #[test]
    fn subject_with_a_single_handle() {
        let handles = vec!["alice".to_string()];
        let date = NaiveDate::from_ymd_opt(2026, 12, 31).unwrap();
        assert_eq!(
            digest_subject(&handles, date),
            "@alice Tweet Digest for 12/31/26"
        );
    }
}
