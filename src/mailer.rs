//! Outgoing mail: one lettre SMTP transport built at startup and shared by
//! every request, plus message assembly for the rendered submission.

use std::sync::{Arc, Mutex};

use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{debug, info};

use crate::{config::Config, submission::Attachment};

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error(transparent)]
    Message(#[from] lettre::error::Error),

    #[error(transparent)]
    Address(#[from] lettre::address::AddressError),

    #[error(transparent)]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("stub transport refused the message")]
    Stub,
}

#[derive(Clone)]
enum MailTransport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    Stub {
        fail: bool,
        outbox: Arc<Mutex<Vec<Vec<u8>>>>,
    },
}

/// Process-wide mail client: transport plus the fixed sender and recipient.
#[derive(Clone)]
pub struct Mailer {
    transport: MailTransport,
    sender: Mailbox,
    recipient: Mailbox,
}

impl Mailer {
    /// STARTTLS relay with credentials from the configuration.
    pub fn from_config(config: &Config) -> Result<Self, MailError> {
        let creds = Credentials::new(config.smtp.user.clone(), config.smtp.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp.host)?
            .port(config.smtp.port)
            .credentials(creds)
            .build();

        Ok(Self {
            transport: MailTransport::Smtp(transport),
            sender: config.sender.parse()?,
            recipient: config.recipient.parse()?,
        })
    }

    /// Mailer that records messages instead of talking to a relay.
    ///
    /// Intended for tests. With `fail` set, every delivery reports an error
    /// without recording anything.
    pub fn stub(sender: &str, recipient: &str, fail: bool) -> Self {
        Self {
            transport: MailTransport::Stub {
                fail,
                outbox: Arc::new(Mutex::new(Vec::new())),
            },
            sender: sender.parse().expect("invalid sender mailbox"),
            recipient: recipient.parse().expect("invalid recipient mailbox"),
        }
    }

    /// Raw RFC 5322 text of every message a stub mailer has accepted.
    /// Empty for the real SMTP transport.
    pub fn captured(&self) -> Vec<String> {
        match &self.transport {
            MailTransport::Stub { outbox, .. } => outbox
                .lock()
                .expect("outbox lock poisoned")
                .iter()
                .map(|raw| String::from_utf8_lossy(raw).into_owned())
                .collect(),
            MailTransport::Smtp(_) => Vec::new(),
        }
    }

    /// Build and synchronously submit one message. No retries; a transport
    /// failure surfaces directly to the caller.
    pub async fn deliver(
        &self,
        subject: &str,
        html: String,
        attachment: Option<Attachment>,
    ) -> Result<(), MailError> {
        let message = self.build_message(subject, html, attachment)?;

        match &self.transport {
            MailTransport::Smtp(transport) => {
                transport.send(message).await?;
            }
            MailTransport::Stub { fail, outbox } => {
                if *fail {
                    return Err(MailError::Stub);
                }
                outbox
                    .lock()
                    .expect("outbox lock poisoned")
                    .push(message.formatted());
                debug!("stub transport captured message");
            }
        }

        info!(subject, to = %self.recipient, "submission relayed");
        Ok(())
    }

    fn build_message(
        &self,
        subject: &str,
        html: String,
        attachment: Option<Attachment>,
    ) -> Result<Message, MailError> {
        let builder = Message::builder()
            .from(self.sender.clone())
            .to(self.recipient.clone())
            .subject(subject);

        let message = match attachment {
            Some(attachment) => builder.multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::html(html))
                    .singlepart(attachment.into()),
            )?,
            None => builder.singlepart(SinglePart::html(html))?,
        };

        Ok(message)
    }
}

impl From<Attachment> for SinglePart {
    fn from(attachment: Attachment) -> Self {
        // Declared MIME type is preserved verbatim; only an unparseable one
        // degrades to the generic binary type.
        let content_type = ContentType::parse(&attachment.content_type)
            .unwrap_or(ContentType::parse("application/octet-stream").unwrap());

        lettre::message::Attachment::new(attachment.filename)
            .body(attachment.content, content_type)
    }
}
