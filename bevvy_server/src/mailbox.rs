//! Inbound mail plumbing.
//!
//! The reconciliation worker only ever sees [`InboundMessage`]s; where they come from is hidden
//! behind [`MessageSource`], so tests can feed the pipeline from a vector. The production source
//! is [`ImapSource`], which drains the UNSEEN messages from an IMAP inbox once per poll cycle.

use log::*;
use mailparse::{MailHeaderMap, ParsedMail};

use crate::{config::MailConfig, errors::SourceError};

/// One raw message pulled from the mailbox. `key` is the RFC 5322 `Message-ID` when the message
/// carries one, and is used to deduplicate re-delivered messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub key: Option<String>,
    pub body: String,
}

#[allow(async_fn_in_trait)]
pub trait MessageSource {
    /// Fetches all unread messages, consuming them from the source in the process.
    async fn fetch_unread(&self) -> Result<Vec<InboundMessage>, SourceError>;
}

/// Polls an IMAP INBOX for unseen messages. A fresh connection is made on every fetch; mailbox
/// providers aggressively drop idle sessions, and at the poll intervals in play reconnecting is
/// cheaper than keeping a session alive.
#[derive(Clone)]
pub struct ImapSource {
    config: MailConfig,
}

impl ImapSource {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }
}

impl MessageSource for ImapSource {
    async fn fetch_unread(&self) -> Result<Vec<InboundMessage>, SourceError> {
        let config = self.config.clone();
        // The imap crate is blocking, so the whole session runs on the blocking pool.
        tokio::task::spawn_blocking(move || fetch_unread_blocking(&config))
            .await
            .map_err(|e| SourceError::Connection(format!("The mailbox task did not complete: {e}")))?
    }
}

fn fetch_unread_blocking(config: &MailConfig) -> Result<Vec<InboundMessage>, SourceError> {
    let tls = native_tls::TlsConnector::builder().build()?;
    debug!("📨️ Connecting to {}:{}", config.imap_host, config.imap_port);
    let client = imap::connect((config.imap_host.as_str(), config.imap_port), &config.imap_host, &tls)?;
    let mut session = client
        .login(&config.imap_user, config.imap_password.reveal())
        .map_err(|(e, _)| SourceError::Authentication(e.to_string()))?;
    session.select("INBOX")?;
    let unseen = session.uid_search("UNSEEN")?;
    debug!("📨️ {} unseen messages in INBOX", unseen.len());
    let mut messages = Vec::with_capacity(unseen.len());
    if !unseen.is_empty() {
        let uid_set = unseen.iter().map(u32::to_string).collect::<Vec<_>>().join(",");
        // Fetching RFC822 marks the messages \Seen, so the next cycle will not see them again.
        let fetches = session.uid_fetch(uid_set, "RFC822")?;
        for fetch in fetches.iter() {
            let Some(raw) = fetch.body() else {
                warn!("📨️ A fetched message came back without a body. Skipping it.");
                continue;
            };
            match extract_message(raw) {
                Ok(Some(msg)) => messages.push(msg),
                Ok(None) => debug!("📨️ A fetched message has no text part. Skipping it."),
                Err(e) => warn!("📨️ Could not parse a fetched message: {e}. Skipping it."),
            }
        }
    }
    if let Err(e) = session.logout() {
        debug!("📨️ IMAP logout failed: {e}");
    }
    Ok(messages)
}

/// Parses one raw RFC822 message into an [`InboundMessage`], or `None` if it has no text part.
fn extract_message(raw: &[u8]) -> Result<Option<InboundMessage>, SourceError> {
    let parsed = mailparse::parse_mail(raw)?;
    let key = parsed.headers.get_first_value("Message-ID").map(|id| id.trim().to_string());
    let body = plain_text_body(&parsed)?;
    Ok(body.map(|body| InboundMessage { key, body }))
}

/// Walks the MIME tree and returns the first `text/plain` part, falling back to any text part for
/// single-part messages.
fn plain_text_body(mail: &ParsedMail) -> Result<Option<String>, SourceError> {
    if mail.subparts.is_empty() {
        if mail.ctype.mimetype.starts_with("text/") {
            return Ok(Some(mail.get_body()?));
        }
        return Ok(None);
    }
    for part in &mail.subparts {
        if part.ctype.mimetype == "text/plain" {
            return Ok(Some(part.get_body()?));
        }
    }
    for part in &mail.subparts {
        if let Some(body) = plain_text_body(part)? {
            return Ok(Some(body));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod test {
    use super::*;

    const SIMPLE: &[u8] = b"Message-ID: <abc123@mail.example>\r\n\
        From: service@paypal.de\r\n\
        Subject: Zahlung erhalten\r\n\
        Content-Type: text/plain; charset=utf-8\r\n\
        \r\n\
        Erhaltener Betrag 18,80 \xe2\x82\xac EUR\r\n";

    const MULTIPART: &[u8] = b"From: service@paypal.de\r\n\
        Content-Type: multipart/alternative; boundary=\"sep\"\r\n\
        \r\n\
        --sep\r\n\
        Content-Type: text/html; charset=utf-8\r\n\
        \r\n\
        <p>Erhaltener Betrag</p>\r\n\
        --sep\r\n\
        Content-Type: text/plain; charset=utf-8\r\n\
        \r\n\
        Erhaltener Betrag 18,80 \xe2\x82\xac EUR\r\n\
        --sep--\r\n";

    #[test]
    fn single_part_message_with_key() {
        let msg = extract_message(SIMPLE).unwrap().unwrap();
        assert_eq!(msg.key.as_deref(), Some("<abc123@mail.example>"));
        assert!(msg.body.contains("Erhaltener Betrag 18,80"));
    }

    #[test]
    fn multipart_message_prefers_the_plain_text_part() {
        let msg = extract_message(MULTIPART).unwrap().unwrap();
        assert_eq!(msg.key, None);
        assert!(msg.body.contains("Erhaltener Betrag 18,80"));
        assert!(!msg.body.contains("<p>"));
    }
}
