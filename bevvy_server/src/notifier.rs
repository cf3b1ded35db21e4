use bevvy_common::Euro;
use bevvy_engine::{db_types::DebtId, SettlementOutcome};
use log::*;

use crate::{errors::DeliveryError, mailer::Messenger};

const PAYMENT_REQUEST_SUBJECT: &str = "Payment Request - BevvyRun";
const PARTIAL_PAYMENT_SUBJECT: &str = "Partial Payment Received - BevvyRun";
const PARTIAL_PAYMENT_TEMPLATE: &str =
    "Payment Received: {RECEIVED}. Remaining: {REMAINING}. Please pay using new Ref: {ORDER_ID}";

/// Turns settlement outcomes into outbound mail.
///
/// Only partial payments produce mail here (the payer needs the fresh reference token to pay the
/// remainder). Full settlements and ignored notifications are logged; live clients learn about
/// settlements through the engine's event hooks instead.
pub struct Notifier<M> {
    messenger: M,
}

impl<M: Messenger> Notifier<M> {
    pub fn new(messenger: M) -> Self {
        Self { messenger }
    }

    /// Reacts to one settlement outcome. Delivery failures are logged and swallowed; the ledger
    /// has already committed and a lost mail must not fail the cycle.
    pub async fn notify(&self, outcome: &SettlementOutcome) {
        match outcome {
            SettlementOutcome::Ignored { reference, reason } => {
                debug!("📧️ Nothing to send for [{reference}]: {reason}");
            },
            SettlementOutcome::Settled { debt, excess } => {
                info!("📧️ Debt [{}] of {} settled. Credited excess: {excess}", debt.id, debt.payer_email);
            },
            SettlementOutcome::Partial { debt, received, remaining, .. } => {
                let body = render_partial_payment(PARTIAL_PAYMENT_TEMPLATE, *received, *remaining, &debt.id);
                if let Err(e) = self.messenger.send(&debt.payer_email, PARTIAL_PAYMENT_SUBJECT, &body).await {
                    error!("📧️ Could not send the partial-payment notice to {}: {e}", debt.payer_email);
                } else {
                    info!("📧️ Sent the new reference [{}] to {}", debt.id, debt.payer_email);
                }
            },
        }
    }

    /// Sends a payment request for one debt, e.g. when a session is locked and the tab is split.
    pub async fn send_payment_request(
        &self,
        to: &str,
        reference: &DebtId,
        amount: Euro,
        template: &str,
    ) -> Result<(), DeliveryError> {
        let body = render_payment_request(template, reference, amount);
        self.messenger.send(to, PAYMENT_REQUEST_SUBJECT, &body).await?;
        info!("📧️ Sent a payment request over {amount} to {to} for [{reference}]");
        Ok(())
    }
}

fn render_payment_request(template: &str, reference: &DebtId, amount: Euro) -> String {
    template.replace("{ORDER_ID}", reference.as_str()).replace("{ORDER_AMOUNT}", &format!("{:.2}", amount.value()))
}

fn render_partial_payment(template: &str, received: Euro, remaining: Euro, reference: &DebtId) -> String {
    template
        .replace("{RECEIVED}", &format!("{:.2}", received.value()))
        .replace("{REMAINING}", &format!("{:.2}", remaining.value()))
        .replace("{ORDER_ID}", reference.as_str())
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn payment_request_rendering() {
        let reference = DebtId::from_str("1f2ab0dc-aaaa-bbbb-cccc-1234567890ab").unwrap();
        let body =
            render_payment_request("Please pay {ORDER_AMOUNT} € with reference {ORDER_ID}. Thanks!", &reference, Euro::from(18.8));
        assert_eq!(body, "Please pay 18.80 € with reference 1f2ab0dc-aaaa-bbbb-cccc-1234567890ab. Thanks!");
    }

    #[test]
    fn partial_payment_rendering() {
        let reference = DebtId::from_str("1f2ab0dc-aaaa-bbbb-cccc-1234567890ab").unwrap();
        let body = render_partial_payment(PARTIAL_PAYMENT_TEMPLATE, Euro::from(10.0), Euro::from(8.8), &reference);
        assert_eq!(
            body,
            "Payment Received: 10.00. Remaining: 8.80. Please pay using new Ref: \
             1f2ab0dc-aaaa-bbbb-cccc-1234567890ab"
        );
    }
}
