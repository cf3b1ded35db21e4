use bevvy_common::Euro;
use thiserror::Error;

use crate::{
    db_types::{Debt, DebtId, LineItem, NewDebt, NewLineItem, PaymentEvent},
    traits::{LedgerManagement, SettlementOutcome},
};

/// This trait defines the mutating behaviour of a debt ledger backend.
///
/// The ledger is the only shared mutable resource in the system, and this trait is the only write
/// path into it. Every method that touches more than one row executes as a single atomic
/// transaction; a failure anywhere rolls the whole mutation back.
#[allow(async_fn_in_trait)]
pub trait LedgerDatabase: Clone + LedgerManagement {
    /// The URL of the database.
    fn url(&self) -> &str;

    /// Records a group-order submission: a new debt owned by `debt.payer_email` plus its line
    /// items, in a single atomic transaction. The owed amount is the sum of the item prices.
    ///
    /// Any credit balance the payer holds is allocated to the debt immediately: it pre-loads
    /// `amount_paid`, and if it covers the owed total the debt is born settled. The balance is
    /// reduced by exactly the amount allocated.
    async fn insert_debt(&self, debt: NewDebt, items: Vec<NewLineItem>) -> Result<Debt, LedgerError>;

    /// Applies a payment notification to the ledger and returns what happened.
    ///
    /// The whole decision runs inside one transaction, including the lookup of the referenced
    /// debt, so a concurrent settlement of the same debt cannot slip between the guard read and
    /// the mutation. If `message_key` is given, it is checked against (and on any mutation,
    /// recorded in) the processed-message ledger within the same transaction, so a re-delivered
    /// message cannot be double-applied.
    ///
    /// * Unknown reference, settled debt, or duplicate key → [`SettlementOutcome::Ignored`],
    ///   no mutation.
    /// * Payment covers the debt → the debt is marked settled; a material excess is credited to
    ///   the payer's balance. → [`SettlementOutcome::Settled`].
    /// * Payment falls short → the debt is retired and replaced by a successor under a fresh
    ///   reference, inheriting the line items and the cumulative paid amount.
    ///   → [`SettlementOutcome::Partial`].
    async fn apply_payment(
        &self,
        event: &PaymentEvent,
        message_key: Option<&str>,
    ) -> Result<SettlementOutcome, LedgerError>;

    /// Renames and/or re-prices one line item, and recomputes the parent debt's owed amount from
    /// the surviving items in the same transaction. Items of a settled debt are immutable.
    async fn update_line_item(&self, item_id: &str, name: &str, price: Euro) -> Result<LineItem, LedgerError>;

    /// Deletes one line item and recomputes the parent debt's owed amount in the same
    /// transaction. Items of a settled debt are immutable.
    async fn remove_line_item(&self, item_id: &str) -> Result<LineItem, LedgerError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), LedgerError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("A debt must carry at least one line item")]
    EmptySubmission,
    #[error("The debt {0} does not exist")]
    DebtNotFound(DebtId),
    #[error("The line item {0} does not exist")]
    LineItemNotFound(String),
    #[error("Debt {0} is settled; its items can no longer change")]
    DebtAlreadySettled(DebtId),
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        LedgerError::DatabaseError(e.to_string())
    }
}
