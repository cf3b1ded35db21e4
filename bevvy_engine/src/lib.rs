//! BevvyRun Settlement Engine
//!
//! BevvyRun lets a group of people pool small purchases (typically drinks), track who owes what,
//! and settle up by bank or PayPal transfer. This library contains the core reconciliation logic:
//! matching inbound payment-notification messages against open debts and keeping the ledger
//! consistent while doing so. It is presentation-agnostic; the mail plumbing and the poll loop that
//! drive it live in the `bevvy_server` crate.
//!
//! The library is divided into three main sections:
//! 1. Database management and control ([`SqliteDatabase`] and the backend traits). SQLite is the
//!    supported backend. You should never need to access the database directly; use the public
//!    APIs instead. The exception is the data types used in the database, which are defined in the
//!    [`db_types`] module and are public.
//! 2. The public API ([`ReconciliationApi`] for flows that mutate the ledger, [`LedgerApi`] for
//!    read-only queries). Backends implement the [`LedgerDatabase`] and [`LedgerManagement`]
//!    traits to plug in underneath these APIs.
//! 3. The notification parser ([`helpers`]), which turns one raw message body into a
//!    [`db_types::PaymentEvent`], or reports that the message is not a payment notification.
//!
//! The engine also emits events when debts are settled or session state changes. A simple actor
//! framework ([`events`]) lets callers hook into these and push the changes to live subscribers.
mod api;
mod sqlite;
mod traits;

pub mod db_types;
pub mod events;
pub mod helpers;
pub mod settlement;
pub mod test_utils;

pub use api::{LedgerApi, ReconciliationApi};
pub use sqlite::{
    db::{db_url, run_migrations},
    SqliteDatabase,
};
pub use traits::{IgnoreReason, LedgerDatabase, LedgerError, LedgerManagement, SettlementOutcome};
