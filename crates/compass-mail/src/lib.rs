//! compass-mail
//!
//! Transactional email. Messages are rendered from Tera templates and
//! delivered through a [`Mailer`]: SendGrid in production, the log when no
//! API key is configured, memory in tests.

pub mod error;
pub mod mailer;
pub mod templates;

pub use error::MailError;
pub use mailer::{Email, LogMailer, Mailer, MemoryMailer, SendGridMailer};
