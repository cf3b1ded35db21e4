use bevvy_common::Euro;
use regex::Regex;

use crate::db_types::{DebtId, PaymentEvent};

/// Extracts a structured [`PaymentEvent`] from one raw notification body.
///
/// Implementations must be pure: no ledger access, no side effects. A `None` from any of the
/// methods means "this message is not (or not recognisably) a payment notification", which is an
/// expected outcome for unrelated mail, not an error.
pub trait NoticeParser {
    fn extract_amount(&self, body: &str) -> Option<Euro>;

    fn extract_reference(&self, body: &str) -> Option<DebtId>;

    fn parse(&self, body: &str) -> Option<PaymentEvent> {
        let amount = self.extract_amount(body)?;
        let reference = self.extract_reference(body)?;
        Some(PaymentEvent { amount, reference })
    }
}

/// Parser for the PayPal Germany transfer-received notification layout.
///
/// The plain-text body carries two labelled fields:
///
/// ```text
/// Erhaltener Betrag 18,80 € EUR
/// Mitteilung von Alice Example 1f0e57a2-6b39-4d0c-9c3f-8b1a2c3d4e5f
/// ```
///
/// Both extractions are anchored to their label phrase. The amount anchor stops unrelated numbers
/// elsewhere in the body from matching; the reference anchor stops UUIDs embedded in tracking
/// links from matching. Amounts use the European decimal format (comma decimal separator, period
/// thousands separator) and are converted to canonical values.
pub struct TransferNoticeParser {
    amount: Regex,
    reference: Regex,
}

impl Default for TransferNoticeParser {
    fn default() -> Self {
        let amount = Regex::new(r"(?i)Erhaltener Betrag\s+([\d.,]+)\s+€").unwrap();
        // The sender name sits between the label and the token, hence the lazy gap.
        let reference = Regex::new(
            r"(?is)Mitteilung von.*?([a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12})",
        )
        .unwrap();
        Self { amount, reference }
    }
}

impl TransferNoticeParser {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NoticeParser for TransferNoticeParser {
    fn extract_amount(&self, body: &str) -> Option<Euro> {
        let raw = self.amount.captures(body).and_then(|c| c.get(1)).map(|m| m.as_str())?;
        // "1.234,56" -> "1234.56"
        let canonical = raw.replace('.', "").replace(',', ".");
        canonical.parse::<Euro>().ok()
    }

    fn extract_reference(&self, body: &str) -> Option<DebtId> {
        self.reference.captures(body).and_then(|c| c.get(1)).map(|m| DebtId(m.as_str().to_lowercase()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const NOTICE: &str = "Sie haben eine Zahlung erhalten\n\n\
        Erhaltener Betrag 18,80 € EUR\n\n\
        Mitteilung von Alice Example\n1f0e57a2-6b39-4d0c-9c3f-8b1a2c3d4e5f\n\n\
        Details: https://example.com/tx/9e107d9d-372b-46bc-a7c9-9c3f8b1a2c3d\n";

    #[test]
    fn extracts_simple_amount() {
        let parser = TransferNoticeParser::new();
        assert_eq!(parser.extract_amount("Erhaltener Betrag 18,80 € EUR"), Some(Euro::from(18.80)));
    }

    #[test]
    fn extracts_amount_with_thousands_separator() {
        let parser = TransferNoticeParser::new();
        assert_eq!(parser.extract_amount("Erhaltener Betrag 1.234,56 € EUR"), Some(Euro::from(1234.56)));
    }

    #[test]
    fn amount_requires_the_label() {
        let parser = TransferNoticeParser::new();
        assert_eq!(parser.extract_amount("Betrag 18,80 € EUR"), None);
        assert_eq!(parser.extract_amount("You sent 18,80 € to someone"), None);
    }

    #[test]
    fn reference_requires_the_label() {
        let parser = TransferNoticeParser::new();
        // A UUID that only appears inside a link must not match.
        let body = "Click https://example.com/tx/9e107d9d-372b-46bc-a7c9-9c3f8b1a2c3d to view";
        assert_eq!(parser.extract_reference(body), None);
    }

    #[test]
    fn reference_skips_the_sender_name() {
        let parser = TransferNoticeParser::new();
        let reference = parser.extract_reference(NOTICE).unwrap();
        assert_eq!(reference.as_str(), "1f0e57a2-6b39-4d0c-9c3f-8b1a2c3d4e5f");
    }

    #[test]
    fn parses_a_full_notice() {
        let parser = TransferNoticeParser::new();
        let event = parser.parse(NOTICE).unwrap();
        assert_eq!(event.amount, Euro::from(18.80));
        assert_eq!(event.reference.as_str(), "1f0e57a2-6b39-4d0c-9c3f-8b1a2c3d4e5f");
    }

    #[test]
    fn unrelated_mail_is_no_match() {
        let parser = TransferNoticeParser::new();
        assert_eq!(parser.parse("Your weekly newsletter: 10 great beers under 2,00 €"), None);
        assert_eq!(parser.parse(""), None);
    }

    #[test]
    fn partial_layouts_are_no_match() {
        let parser = TransferNoticeParser::new();
        // Amount present, reference missing.
        assert_eq!(parser.parse("Erhaltener Betrag 18,80 € EUR\nMitteilung von Alice"), None);
        // Reference present, amount missing.
        assert_eq!(
            parser.parse("Mitteilung von Alice 1f0e57a2-6b39-4d0c-9c3f-8b1a2c3d4e5f"),
            None
        );
    }
}
