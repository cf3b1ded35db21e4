//! Event hooks fire for committed ledger changes, and only for those.

use std::sync::{
    atomic::{AtomicI32, Ordering},
    Arc,
};

use bevvy_common::Euro;
use bevvy_engine::{
    db_types::{NewDebt, NewLineItem, PaymentEvent},
    events::{EventHandlers, EventHooks},
    test_utils::{prepare_test_env, random_db_path},
    LedgerDatabase,
    ReconciliationApi,
    SqliteDatabase,
};
use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};

#[derive(Default, Clone)]
struct HookCalled {
    called: Arc<AtomicI32>,
}

impl HookCalled {
    pub fn called(&self) {
        let _ = self.called.fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> i32 {
        self.called.load(Ordering::Relaxed)
    }
}

#[tokio::test]
async fn settlement_and_session_hooks_fire() {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");

    let settled = HookCalled::default();
    let updated = HookCalled::default();
    let settled_copy = settled.clone();
    let updated_copy = updated.clone();
    let mut hooks = EventHooks::default();
    hooks.on_debt_settled(move |ev| {
        info!("🪝️ Debt settled: {:?}", ev.debt.id);
        settled_copy.called();
        Box::pin(async {})
    });
    hooks.on_session_updated(move |ev| {
        info!("🪝️ Session updated: {}", ev.session_id);
        updated_copy.called();
        Box::pin(async {})
    });
    let handlers = EventHandlers::new(10, hooks);
    let producers = handlers.producers();
    let mut api = ReconciliationApi::new(db, producers);

    // Two submissions, one full settlement and one partial payment.
    let debt_a = api
        .process_new_debt(
            NewDebt::new("thursday-round", "alice", "alice@example.com"),
            vec![NewLineItem::new("Helles", Euro::from(3.80))],
        )
        .await
        .expect("Error processing submission");
    let debt_b = api
        .process_new_debt(
            NewDebt::new("thursday-round", "bob", "bob@example.com"),
            vec![NewLineItem::new("Spezi", Euro::from(6.80))],
        )
        .await
        .expect("Error processing submission");
    let event = PaymentEvent { amount: Euro::from(3.80), reference: debt_a.id.clone() };
    api.reconcile(event, None).await.expect("Error reconciling payment");
    let event = PaymentEvent { amount: Euro::from(2.00), reference: debt_b.id.clone() };
    api.reconcile(event, None).await.expect("Error reconciling payment");

    let url = api.db().url().to_string();
    if let Err(e) = api.db_mut().close().await {
        error!("🚀️ Failed to close database: {e}");
    }
    // Dropping the api drops the producers, so the handlers drain and shut down.
    drop(api);
    if let Some(handler) = handlers.on_debt_settled {
        handler.start_handler().await;
    }
    if let Some(handler) = handlers.on_session_updated {
        handler.start_handler().await;
    }
    Sqlite::drop_database(&url).await.unwrap();

    // Only the full settlement fires the debt hook; every submission and payment touches a session.
    assert_eq!(settled.count(), 1);
    assert_eq!(updated.count(), 4);
    info!("🪝️ test complete");
}
