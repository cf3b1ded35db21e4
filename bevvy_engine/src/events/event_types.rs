use serde::{Deserialize, Serialize};

use crate::db_types::Debt;

/// A debt has been fully paid off. Scoped to the session the debt belongs to; subscribers
/// typically push a `debt_settled` signal to live clients of that session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtSettledEvent {
    pub debt: Debt,
}

impl DebtSettledEvent {
    pub fn new(debt: Debt) -> Self {
        Self { debt }
    }
}

/// Something about a session's ledger state changed (a partial payment re-referenced a debt, a
/// line item was edited, a new submission arrived). A generic invalidation signal: subscribers
/// should re-fetch the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUpdatedEvent {
    pub session_id: String,
}

impl SessionUpdatedEvent {
    pub fn new<S: Into<String>>(session_id: S) -> Self {
        Self { session_id: session_id.into() }
    }
}
