use bevvy_common::Euro;

use crate::{
    db_types::{Debt, DebtId, LineItem, PayerBalance},
    traits::ledger_database::LedgerError,
};

/// Read-only queries over the debt ledger.
#[allow(async_fn_in_trait)]
pub trait LedgerManagement: Clone {
    /// Fetches the debt for the given reference token, if the token still resolves.
    async fn fetch_debt_by_reference(&self, reference: &DebtId) -> Result<Option<Debt>, LedgerError>;

    /// Fetches the line items belonging to the given debt, oldest first.
    async fn fetch_line_items_for_debt(&self, reference: &DebtId) -> Result<Vec<LineItem>, LedgerError>;

    /// Fetches all debts belonging to a session, newest first.
    async fn fetch_debts_for_session(&self, session_id: &str) -> Result<Vec<Debt>, LedgerError>;

    /// The payer's prepaid credit balance. Zero if the payer has never been credited.
    async fn credit_balance_for(&self, payer_email: &str) -> Result<Euro, LedgerError>;

    /// Per-payer summary of credit held versus debt outstanding, across all sessions.
    async fn payer_balances(&self) -> Result<Vec<PayerBalance>, LedgerError>;
}
