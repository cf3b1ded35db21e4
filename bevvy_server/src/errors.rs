use bevvy_engine::LedgerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(#[from] LedgerError),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
}

impl From<sqlx::Error> for ServerError {
    fn from(e: sqlx::Error) -> Self {
        ServerError::InitializeError(e.to_string())
    }
}

/// Errors raised while fetching messages from the inbound mailbox. Any of these aborts the current
/// poll cycle only; the next tick starts from scratch.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Could not connect to the mailbox. {0}")]
    Connection(String),
    #[error("The mailbox rejected the login. {0}")]
    Authentication(String),
    #[error("Mailbox protocol error. {0}")]
    Protocol(String),
    #[error("Could not parse a fetched message. {0}")]
    Malformed(String),
}

impl From<imap::error::Error> for SourceError {
    fn from(e: imap::error::Error) -> Self {
        SourceError::Protocol(e.to_string())
    }
}

impl From<native_tls::Error> for SourceError {
    fn from(e: native_tls::Error) -> Self {
        SourceError::Connection(e.to_string())
    }
}

impl From<mailparse::MailParseError> for SourceError {
    fn from(e: mailparse::MailParseError) -> Self {
        SourceError::Malformed(e.to_string())
    }
}

/// Errors raised while sending outbound mail. Delivery is best-effort and never affects ledger
/// state; callers log these and move on.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Could not build the outbound message. {0}")]
    InvalidMessage(String),
    #[error("SMTP transport error. {0}")]
    Transport(String),
}

impl From<lettre::error::Error> for DeliveryError {
    fn from(e: lettre::error::Error) -> Self {
        DeliveryError::InvalidMessage(e.to_string())
    }
}

impl From<lettre::address::AddressError> for DeliveryError {
    fn from(e: lettre::address::AddressError) -> Self {
        DeliveryError::InvalidMessage(e.to_string())
    }
}

impl From<lettre::transport::smtp::Error> for DeliveryError {
    fn from(e: lettre::transport::smtp::Error) -> Self {
        DeliveryError::Transport(e.to_string())
    }
}
