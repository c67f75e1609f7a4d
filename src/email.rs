//! Delivery of the assembled report

use anyhow::{Context, Result as AnyResult};
use lettre::{
    Message, Transport, message::Mailbox, message::header::ContentType,
    transport::smtp::SmtpTransport, transport::smtp::authentication::Credentials,
};

use crate::config::EmailConfig;
use crate::models::Report;
use crate::{KitewatchError, Result};

/// Sends a finished report somewhere
pub trait Notifier {
    fn notify(&self, report: &Report) -> Result<()>;
}

/// Prints the report instead of sending it
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn notify(&self, report: &Report) -> Result<()> {
        println!("{report}");
        Ok(())
    }
}

/// Emails the report to every configured recipient over SMTP with implicit TLS
#[derive(Debug, Clone)]
pub struct EmailNotifier {
    server: String,
    port: u16,
    username: String,
    password: String,
    sender: Mailbox,
    recipients: Vec<Mailbox>,
    subject: String,
}

impl EmailNotifier {
    pub fn from_config(config: &EmailConfig) -> Result<Self> {
        Self::try_from_config(config).map_err(|e| KitewatchError::config(format!("{e:#}")))
    }

    fn try_from_config(config: &EmailConfig) -> AnyResult<Self> {
        let server = config.smtp_server.clone().context("Missing SMTP server")?;
        let username = config.username.clone().context("Missing SMTP username")?;
        let password = config.password.clone().context("Missing SMTP password")?;

        let sender = format!("{} <{}>", config.sender_name, username)
            .parse()
            .context("Failed to parse from address")?;

        let recipients = config
            .recipients
            .iter()
            .map(|recipient| {
                recipient
                    .parse()
                    .with_context(|| format!("Failed to parse to address '{recipient}'"))
            })
            .collect::<AnyResult<Vec<Mailbox>>>()?;

        Ok(Self {
            server,
            port: config.smtp_port,
            username,
            password,
            sender,
            recipients,
            subject: config.subject.clone(),
        })
    }

    fn create_mailer(&self) -> AnyResult<SmtpTransport> {
        let credentials = Credentials::new(self.username.clone(), self.password.clone());

        let mailer = SmtpTransport::relay(&self.server)
            .with_context(|| format!("Failed to set up SMTP relay {}", self.server))?
            .port(self.port)
            .credentials(credentials)
            .build();

        Ok(mailer)
    }

    /// One plain-text message for one recipient
    fn build_message(&self, recipient: &Mailbox, body: &str) -> AnyResult<Message> {
        Message::builder()
            .from(self.sender.clone())
            .to(recipient.clone())
            .subject(self.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .context("Failed to build email")
    }

    fn send(&self, report: &Report) -> AnyResult<()> {
        let body = report.body();
        let mailer = self.create_mailer()?;

        for recipient in &self.recipients {
            let email = self.build_message(recipient, &body)?;
            tracing::info!("Sending email to {}", recipient);
            mailer
                .send(&email)
                .with_context(|| format!("Failed to send email to {recipient}"))?;
        }

        Ok(())
    }
}

impl Notifier for EmailNotifier {
    fn notify(&self, report: &Report) -> Result<()> {
        self.send(report)
            .map_err(|e| KitewatchError::notification(format!("{e:#}")))
    }
}
