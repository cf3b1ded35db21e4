use bevvy_common::Euro;
use log::{debug, info};

use crate::{
    db_types::{Debt, LineItem, NewDebt, NewLineItem, PaymentEvent},
    events::{DebtSettledEvent, EventProducers, SessionUpdatedEvent},
    traits::{LedgerDatabase, LedgerError, SettlementOutcome},
};

/// The mutating API of the settlement engine.
///
/// Every flow that writes to the ledger goes through this struct. It delegates the atomic work to
/// the backend and fires the relevant events after the mutation has committed, so subscribers only
/// ever observe durable state.
pub struct ReconciliationApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B: std::fmt::Debug> std::fmt::Debug for ReconciliationApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReconciliationApi ({:?})", self.db)
    }
}

impl<B> ReconciliationApi<B>
where B: LedgerDatabase
{
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }

    /// Records a new group-order submission and announces it to the session's subscribers.
    pub async fn process_new_debt(&self, debt: NewDebt, items: Vec<NewLineItem>) -> Result<Debt, LedgerError> {
        let session_id = debt.session_id.clone();
        let debt = self.db.insert_debt(debt, items).await?;
        if debt.settled {
            info!("📢️ Debt [{}] was covered in full by {}'s credit", debt.id, debt.payer_email);
            for producer in &self.producers.debt_settled_producer {
                producer.publish_event(DebtSettledEvent::new(debt.clone())).await;
            }
        }
        for producer in &self.producers.session_updated_producer {
            producer.publish_event(SessionUpdatedEvent::new(session_id.clone())).await;
        }
        Ok(debt)
    }

    /// Applies one parsed payment notification to the ledger.
    ///
    /// `message_key` deduplicates re-delivered messages; pass the source's stable message id when
    /// it has one. Events fire only after the backend has committed, and only for outcomes that
    /// changed the ledger.
    pub async fn reconcile(
        &self,
        event: PaymentEvent,
        message_key: Option<&str>,
    ) -> Result<SettlementOutcome, LedgerError> {
        let outcome = self.db.apply_payment(&event, message_key).await?;
        match &outcome {
            SettlementOutcome::Ignored { reference, reason } => {
                debug!("📢️ Payment of {} against [{reference}] ignored: {reason}", event.amount);
            },
            SettlementOutcome::Settled { debt, excess } => {
                info!("📢️ Debt [{}] settled by a payment of {}. Credited excess: {excess}", debt.id, event.amount);
                for producer in &self.producers.debt_settled_producer {
                    producer.publish_event(DebtSettledEvent::new(debt.clone())).await;
                }
                for producer in &self.producers.session_updated_producer {
                    producer.publish_event(SessionUpdatedEvent::new(debt.session_id.clone())).await;
                }
            },
            SettlementOutcome::Partial { old_reference, debt, received, remaining } => {
                info!(
                    "📢️ Partial payment of {received} against [{old_reference}]. {remaining} remains under [{}]",
                    debt.id
                );
                for producer in &self.producers.session_updated_producer {
                    producer.publish_event(SessionUpdatedEvent::new(debt.session_id.clone())).await;
                }
            },
        }
        Ok(outcome)
    }

    /// Edits a line item and announces the change to the session's subscribers.
    pub async fn update_line_item(&self, item_id: &str, name: &str, price: Euro) -> Result<LineItem, LedgerError> {
        let item = self.db.update_line_item(item_id, name, price).await?;
        for producer in &self.producers.session_updated_producer {
            producer.publish_event(SessionUpdatedEvent::new(item.session_id.clone())).await;
        }
        Ok(item)
    }

    /// Removes a line item and announces the change to the session's subscribers.
    pub async fn remove_line_item(&self, item_id: &str) -> Result<LineItem, LedgerError> {
        let item = self.db.remove_line_item(item_id).await?;
        for producer in &self.producers.session_updated_producer {
            producer.publish_event(SessionUpdatedEvent::new(item.session_id.clone())).await;
        }
        Ok(item)
    }
}
