use std::fmt::Display;

use bevvy_common::Euro;

use crate::db_types::{Debt, DebtId};

/// Why a payment notification was dropped without touching the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The reference token does not resolve to any debt. Usually a stale token from a debt that
    /// has since been re-referenced, or a notification that was never ours.
    UnknownReference,
    /// The referenced debt is already settled. Guards against duplicate notifications.
    AlreadySettled,
    /// The message key has been processed before. Guards against re-delivered messages being
    /// double-applied.
    DuplicateMessage,
}

impl Display for IgnoreReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IgnoreReason::UnknownReference => write!(f, "the reference does not resolve to a debt"),
            IgnoreReason::AlreadySettled => write!(f, "the referenced debt is already settled"),
            IgnoreReason::DuplicateMessage => write!(f, "the message has already been processed"),
        }
    }
}

/// What applying one [`PaymentEvent`](crate::db_types::PaymentEvent) did to the ledger.
///
/// The variants are mutually exclusive and the associated mutation has already been committed by
/// the time a value of this type is returned.
#[derive(Debug, Clone, PartialEq)]
pub enum SettlementOutcome {
    /// No mutation took place.
    Ignored { reference: DebtId, reason: IgnoreReason },
    /// The debt is paid off. `excess` is the amount credited to the payer's balance, or zero.
    Settled { debt: Debt, excess: Euro },
    /// The payment fell short. `debt` is the successor carrying the original line items under a
    /// new reference; the old reference no longer resolves.
    Partial { old_reference: DebtId, debt: Debt, received: Euro, remaining: Euro },
}
