//! Interface contracts for ledger backends.
//!
//! A debt ledger backend has two faces:
//!
//! * [`LedgerDatabase`] defines the mutations: accepting new group-order submissions, applying
//!   inbound payments, and maintaining line items. Every multi-row mutation here is atomic.
//! * [`LedgerManagement`] provides read-only queries over debts, line items and credit balances.
//!
//! The [`SettlementOutcome`] and [`IgnoreReason`] types describe what a payment application did to
//! the ledger, and are what the outbound notifier keys its behaviour off.
mod data_objects;
mod ledger_database;
mod ledger_management;

pub use data_objects::{IgnoreReason, SettlementOutcome};
pub use ledger_database::{LedgerDatabase, LedgerError};
pub use ledger_management::LedgerManagement;
