use bevvy_common::Euro;

use crate::{
    db_types::{Debt, DebtId, LineItem, PayerBalance},
    traits::{LedgerError, LedgerManagement},
};

/// Read-only access to the debt ledger.
#[derive(Debug, Clone)]
pub struct LedgerApi<B> {
    db: B,
}

impl<B> LedgerApi<B>
where B: LedgerManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn fetch_debt_by_reference(&self, reference: &DebtId) -> Result<Option<Debt>, LedgerError> {
        self.db.fetch_debt_by_reference(reference).await
    }

    pub async fn fetch_line_items_for_debt(&self, reference: &DebtId) -> Result<Vec<LineItem>, LedgerError> {
        self.db.fetch_line_items_for_debt(reference).await
    }

    pub async fn fetch_debts_for_session(&self, session_id: &str) -> Result<Vec<Debt>, LedgerError> {
        self.db.fetch_debts_for_session(session_id).await
    }

    pub async fn credit_balance_for(&self, payer_email: &str) -> Result<Euro, LedgerError> {
        self.db.credit_balance_for(payer_email).await
    }

    pub async fn payer_balances(&self) -> Result<Vec<PayerBalance>, LedgerError> {
        self.db.payer_balances().await
    }
}
