//! New-bug notification mail.

use crate::error::DeliveryError;
use crate::models::Bug;
use crate::output::render_html;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::{Message, SmtpTransport, Transport};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A rendered notification ready for delivery.
pub struct Email {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

impl Email {
    /// RFC 5322 form, used by `notify --dry-run`.
    pub fn to_message(&self) -> Result<Message, DeliveryError> {
        Message::builder()
            .from(parse_mailbox(&self.from)?)
            .to(parse_mailbox(&self.to)?)
            .subject(self.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(self.html.clone())
            .map_err(|e| DeliveryError::Message(e.to_string()))
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, DeliveryError> {
    address.parse().map_err(|e: lettre::address::AddressError| DeliveryError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

/// Mail delivery collaborator.
pub trait MailTransport {
    fn send(&self, email: &Email) -> Result<(), DeliveryError>;
}

/// Plain SMTP to a local relay.
pub struct SmtpMailer {
    transport: SmtpTransport,
}

impl SmtpMailer {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            transport: SmtpTransport::builder_dangerous(host).port(port).build(),
        }
    }
}

impl MailTransport for SmtpMailer {
    fn send(&self, email: &Email) -> Result<(), DeliveryError> {
        let message = email.to_message()?;
        self.transport
            .send(&message)
            .map_err(|e| DeliveryError::Relay(e.to_string()))?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
/// Fixed sender, recipient and body settings for notification mail.
pub struct MailSettings {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub intro: Option<String>,
    pub show_bug_url: String,
}

/// Builds and sends the new-bug mail through a [`MailTransport`].
pub struct Notifier<'a, T: MailTransport + ?Sized> {
    transport: &'a T,
    settings: MailSettings,
}

impl<'a, T: MailTransport + ?Sized> Notifier<'a, T> {
    pub fn new(transport: &'a T, settings: MailSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    pub fn build_email(&self, new_bugs: &[Bug]) -> Email {
        Email {
            from: self.settings.from.clone(),
            to: self.settings.to.clone(),
            subject: self.settings.subject.clone(),
            html: render_html(
                new_bugs,
                &self.settings.show_bug_url,
                self.settings.intro.as_deref(),
            ),
        }
    }

    /// Send one mail listing `new_bugs`. Returns `false` without sending
    /// when the list is empty.
    pub fn notify(&self, new_bugs: &[Bug]) -> Result<bool, DeliveryError> {
        if new_bugs.is_empty() {
            return Ok(false);
        }
        let email = self.build_email(new_bugs);
        self.transport.send(&email)?;
        info!(to = %email.to, count = new_bugs.len(), "notification sent");
        Ok(true)
    }
}
