//! The BevvyRun reconciliation daemon.
//!
//! This crate wraps the `bevvy_engine` settlement core with everything it needs to run unattended:
//! environment configuration, the IMAP source that pulls payment notifications out of a mailbox,
//! the SMTP messenger and notifier that answer partial payments, and the fixed-interval poll
//! worker that drives one reconciliation cycle at a time.
pub mod config;
pub mod errors;
pub mod mailbox;
pub mod mailer;
pub mod notifier;
pub mod poll_worker;

pub use mailer::SmtpMessenger;
