//! The settlement decision.
//!
//! This is the pure heart of the reconciliation engine: given the ledger state of a debt and an
//! incoming amount, compute which of the mutually exclusive settlement outcomes applies. The
//! caller is responsible for applying the corresponding mutation atomically.

use bevvy_common::Euro;

/// The decision for one payment against one open debt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Settlement {
    /// The payment covers the debt (within [`Euro::TOLERANCE`]). A material excess becomes credit.
    Settle { total_paid: Euro, excess: Euro },
    /// The payment falls short. The debt must be retired and re-referenced under a successor id.
    Partial { total_paid: Euro, remaining: Euro },
}

/// Decides the settlement outcome for a payment of `received` against a debt with the given
/// owed and already-paid amounts. Sub-cent overpayments are swallowed rather than credited.
pub fn decide(amount_owed: Euro, amount_paid: Euro, received: Euro) -> Settlement {
    let total_paid = amount_paid + received;
    if total_paid.covers(amount_owed) {
        let excess = total_paid - amount_owed;
        let excess = if excess.is_material() { excess } else { Euro::zero() };
        Settlement::Settle { total_paid, excess }
    } else {
        Settlement::Partial { total_paid, remaining: amount_owed - total_paid }
    }
}
