mod ledger_api;
mod reconciliation_api;

pub use ledger_api::LedgerApi;
pub use reconciliation_api::ReconciliationApi;
