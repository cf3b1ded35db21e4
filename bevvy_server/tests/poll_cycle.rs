//! One poll cycle against a real SQLite ledger, with the mailbox and the SMTP relay faked out.

use std::sync::{Arc, Mutex};

use bevvy_common::Euro;
use bevvy_engine::{
    db_types::{NewDebt, NewLineItem},
    events::EventProducers,
    helpers::TransferNoticeParser,
    test_utils::{prepare_test_env, random_db_path},
    LedgerDatabase,
    LedgerManagement,
    ReconciliationApi,
    SqliteDatabase,
};
use bevvy_server::{
    errors::{DeliveryError, SourceError},
    mailbox::{InboundMessage, MessageSource},
    mailer::Messenger,
    notifier::Notifier,
    poll_worker::run_cycle,
};
use sqlx::{migrate::MigrateDatabase, Sqlite};

#[derive(Clone, Default)]
struct FakeSource {
    messages: Arc<Mutex<Vec<InboundMessage>>>,
}

impl FakeSource {
    fn push(&self, key: Option<&str>, body: &str) {
        self.messages
            .lock()
            .unwrap()
            .push(InboundMessage { key: key.map(String::from), body: body.to_string() });
    }
}

impl MessageSource for FakeSource {
    async fn fetch_unread(&self) -> Result<Vec<InboundMessage>, SourceError> {
        Ok(self.messages.lock().unwrap().drain(..).collect())
    }
}

#[derive(Clone, Default)]
struct FakeMessenger {
    sent: Arc<Mutex<Vec<(String, String, String)>>>,
}

impl Messenger for FakeMessenger {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), DeliveryError> {
        self.sent.lock().unwrap().push((to.to_string(), subject.to_string(), body.to_string()));
        Ok(())
    }
}

fn notice(amount: &str, reference: &str) -> String {
    format!(
        "Sie haben eine Zahlung erhalten\n\nErhaltener Betrag {amount} € EUR\n\nMitteilung von Alice \
         Example\n{reference}\n"
    )
}

#[tokio::test]
async fn a_cycle_reconciles_notifies_and_survives_junk() {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let mut db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");

    let api = ReconciliationApi::new(db.clone(), EventProducers::default());
    let alice = api
        .process_new_debt(
            NewDebt::new("thursday-round", "alice", "alice@example.com"),
            vec![NewLineItem::new("Helles", Euro::from(18.80))],
        )
        .await
        .unwrap();
    let bob = api
        .process_new_debt(
            NewDebt::new("thursday-round", "bob", "bob@example.com"),
            vec![NewLineItem::new("Spezi", Euro::from(6.80))],
        )
        .await
        .unwrap();

    let source = FakeSource::default();
    // Full payment, partial payment, unrelated mail, and a stale reference.
    source.push(Some("<m1@mail.example>"), &notice("18,80", alice.id.as_str()));
    source.push(Some("<m2@mail.example>"), &notice("5,00", bob.id.as_str()));
    source.push(None, "Your weekly newsletter: 10 great beers under 2,00 €");
    source.push(Some("<m4@mail.example>"), &notice("5,00", "9e107d9d-372b-46bc-a7c9-9c3f8b1a2c3d"));

    let messenger = FakeMessenger::default();
    let notifier = Notifier::new(messenger.clone());
    let parser = TransferNoticeParser::default();
    let report = run_cycle(&api, &parser, &source, &notifier).await.expect("Error running cycle");

    assert_eq!(report.fetched, 4);
    assert_eq!(report.settled, 1);
    assert_eq!(report.partial, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.ignored, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(report.total_applied(), 2);

    // Alice's debt is settled; Bob got a mail carrying his fresh reference.
    let settled = db.fetch_debt_by_reference(&alice.id).await.unwrap().unwrap();
    assert!(settled.settled);
    assert!(db.fetch_debt_by_reference(&bob.id).await.unwrap().is_none());
    let open = db.fetch_debts_for_session("thursday-round").await.unwrap();
    let successor = open.iter().find(|d| !d.settled).expect("Successor debt missing");
    assert_eq!(successor.amount_paid, Euro::from(5.00));

    let sent = messenger.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    let (to, subject, body) = &sent[0];
    assert_eq!(to, "bob@example.com");
    assert_eq!(subject, "Partial Payment Received - BevvyRun");
    assert!(body.contains("Payment Received: 5.00"));
    assert!(body.contains("Remaining: 1.80"));
    assert!(body.contains(successor.id.as_str()));

    // A second cycle with the same message keys re-delivered applies nothing.
    source.push(Some("<m1@mail.example>"), &notice("18,80", alice.id.as_str()));
    source.push(Some("<m2@mail.example>"), &notice("5,00", successor.id.as_str()));
    let report = run_cycle(&api, &parser, &source, &notifier).await.expect("Error running cycle");
    assert_eq!(report.total_applied(), 0);
    assert_eq!(report.ignored, 2);

    db.close().await.unwrap();
    Sqlite::drop_database(&url).await.unwrap();
}
