use bevvy_common::Euro;
use log::{debug, info};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    db_types::{Debt, DebtId, LineItem, NewDebt, NewLineItem, PayerBalance, PaymentEvent},
    settlement::{self, Settlement},
    sqlite::db::{self, credits, debts, line_items, messages},
    traits::{IgnoreReason, LedgerDatabase, LedgerError, LedgerManagement, SettlementOutcome},
};

/// The SQLite backend for the debt ledger.
///
/// Cloning is cheap; clones share the same connection pool.
#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl std::fmt::Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteDatabase").field("url", &self.url).finish()
    }
}

impl SqliteDatabase {
    /// Creates a new database backend using the URL from the environment, or the default URL.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db::db_url();
        Self::new_with_url(&url, max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = db::new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl LedgerDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_debt(&self, debt: NewDebt, items: Vec<NewLineItem>) -> Result<Debt, LedgerError> {
        if items.is_empty() {
            return Err(LedgerError::EmptySubmission);
        }
        let mut tx = self.pool.begin().await?;
        let total = items.iter().map(|i| i.price).sum::<Euro>();
        // Any prepaid credit the payer holds goes straight onto the new debt.
        let balance = credits::balance_for(&debt.payer_email, &mut tx).await?;
        let credit_used = if balance.is_material() { balance.min(total) } else { Euro::zero() };
        let settled = credit_used.covers(total);
        let id = DebtId::random();
        let row = debts::insert_debt(
            &id,
            &debt.session_id,
            &debt.payer_name,
            &debt.payer_email,
            total,
            credit_used,
            settled,
            &mut tx,
        )
        .await?;
        for item in &items {
            let item_id = Uuid::new_v4().to_string();
            line_items::insert_line_item(&item_id, &id, &debt.session_id, item, &mut tx).await?;
        }
        if credit_used.is_material() {
            credits::set_balance(&debt.payer_email, balance - credit_used, &mut tx).await?;
            info!("🗃️ Applied {credit_used} of {}'s credit to new debt [{id}]", debt.payer_email);
        }
        tx.commit().await?;
        debug!("🗃️ New debt [{id}] for {} over {total} ({} items)", debt.payer_email, items.len());
        Ok(row)
    }

    async fn apply_payment(
        &self,
        event: &PaymentEvent,
        message_key: Option<&str>,
    ) -> Result<SettlementOutcome, LedgerError> {
        let mut tx = self.pool.begin().await?;
        if let Some(key) = message_key {
            if messages::is_processed(key, &mut tx).await? {
                tx.rollback().await?;
                return Ok(SettlementOutcome::Ignored {
                    reference: event.reference.clone(),
                    reason: IgnoreReason::DuplicateMessage,
                });
            }
        }
        let Some(debt) = debts::fetch_debt_by_reference(&event.reference, &mut tx).await? else {
            tx.rollback().await?;
            return Ok(SettlementOutcome::Ignored {
                reference: event.reference.clone(),
                reason: IgnoreReason::UnknownReference,
            });
        };
        if debt.settled {
            tx.rollback().await?;
            return Ok(SettlementOutcome::Ignored {
                reference: event.reference.clone(),
                reason: IgnoreReason::AlreadySettled,
            });
        }
        let outcome = match settlement::decide(debt.amount_owed, debt.amount_paid, event.amount) {
            Settlement::Settle { total_paid, excess } => {
                let debt = debts::settle(&event.reference, total_paid, &mut tx).await?;
                if excess.is_material() {
                    credits::add_credit(&debt.payer_email, excess, &mut tx).await?;
                }
                SettlementOutcome::Settled { debt, excess }
            },
            Settlement::Partial { total_paid, remaining } => {
                // The successor must exist before the items can be re-pointed at it.
                let successor_id = DebtId::random();
                let successor = debts::insert_successor(&debt, &successor_id, total_paid, &mut tx).await?;
                line_items::repoint_items(&debt.id, &successor_id, &mut tx).await?;
                debts::delete(&debt.id, &mut tx).await?;
                SettlementOutcome::Partial {
                    old_reference: debt.id.clone(),
                    debt: successor,
                    received: event.amount,
                    remaining,
                }
            },
        };
        if let Some(key) = message_key {
            messages::record_processed(key, &mut tx).await?;
        }
        tx.commit().await?;
        Ok(outcome)
    }

    async fn update_line_item(&self, item_id: &str, name: &str, price: Euro) -> Result<LineItem, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let Some(item) = line_items::fetch_line_item(item_id, &mut tx).await? else {
            tx.rollback().await?;
            return Err(LedgerError::LineItemNotFound(item_id.to_string()));
        };
        let Some(debt) = debts::fetch_debt_by_reference(&item.debt_id, &mut tx).await? else {
            tx.rollback().await?;
            return Err(LedgerError::DebtNotFound(item.debt_id));
        };
        if debt.settled {
            tx.rollback().await?;
            return Err(LedgerError::DebtAlreadySettled(debt.id));
        }
        let updated = line_items::update_line_item(item_id, name, price, &mut tx)
            .await?
            .ok_or_else(|| LedgerError::LineItemNotFound(item_id.to_string()))?;
        let total = line_items::total_for_debt(&debt.id, &mut tx).await?;
        debts::set_amount_owed(&debt.id, total, &mut tx).await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn remove_line_item(&self, item_id: &str) -> Result<LineItem, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let Some(item) = line_items::fetch_line_item(item_id, &mut tx).await? else {
            tx.rollback().await?;
            return Err(LedgerError::LineItemNotFound(item_id.to_string()));
        };
        let Some(debt) = debts::fetch_debt_by_reference(&item.debt_id, &mut tx).await? else {
            tx.rollback().await?;
            return Err(LedgerError::DebtNotFound(item.debt_id));
        };
        if debt.settled {
            tx.rollback().await?;
            return Err(LedgerError::DebtAlreadySettled(debt.id));
        }
        let deleted = line_items::delete_line_item(item_id, &mut tx)
            .await?
            .ok_or_else(|| LedgerError::LineItemNotFound(item_id.to_string()))?;
        let total = line_items::total_for_debt(&debt.id, &mut tx).await?;
        debts::set_amount_owed(&debt.id, total, &mut tx).await?;
        tx.commit().await?;
        Ok(deleted)
    }

    async fn close(&mut self) -> Result<(), LedgerError> {
        self.pool.close().await;
        Ok(())
    }
}

impl LedgerManagement for SqliteDatabase {
    async fn fetch_debt_by_reference(&self, reference: &DebtId) -> Result<Option<Debt>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let debt = debts::fetch_debt_by_reference(reference, &mut conn).await?;
        Ok(debt)
    }

    async fn fetch_line_items_for_debt(&self, reference: &DebtId) -> Result<Vec<LineItem>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let items = line_items::fetch_items_for_debt(reference, &mut conn).await?;
        Ok(items)
    }

    async fn fetch_debts_for_session(&self, session_id: &str) -> Result<Vec<Debt>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let debts = debts::fetch_debts_for_session(session_id, &mut conn).await?;
        Ok(debts)
    }

    async fn credit_balance_for(&self, payer_email: &str) -> Result<Euro, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let balance = credits::balance_for(payer_email, &mut conn).await?;
        Ok(balance)
    }

    async fn payer_balances(&self) -> Result<Vec<PayerBalance>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let credit_rows = credits::all_balances(&mut conn).await?;
        let debt_rows = debts::outstanding_per_payer(&mut conn).await?;
        Ok(credits::merge_balances(credit_rows, debt_rows))
    }
}
