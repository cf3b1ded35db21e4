use std::time::Duration;

use bevvy_engine::{
    events::EventProducers,
    helpers::{NoticeParser, TransferNoticeParser},
    LedgerDatabase,
    ReconciliationApi,
    SettlementOutcome,
    SqliteDatabase,
};
use log::*;
use tokio::task::JoinHandle;

use crate::{
    errors::SourceError,
    mailbox::{ImapSource, MessageSource},
    mailer::Messenger,
    notifier::Notifier,
    SmtpMessenger,
};

/// What one poll cycle did. Counters only; the interesting details are in the logs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// Messages fetched from the source.
    pub fetched: usize,
    /// Messages that were not payment notifications.
    pub skipped: usize,
    pub settled: usize,
    pub partial: usize,
    pub ignored: usize,
    /// Ledger transaction failures. The message is consumed regardless; the payment surfaces
    /// again through the payer, not through a retry.
    pub failed: usize,
}

impl CycleReport {
    pub fn total_applied(&self) -> usize {
        self.settled + self.partial
    }
}

/// Starts the mailbox reconciliation worker. Do not await the returned JoinHandle, as it will run
/// indefinitely.
pub fn start_reconciliation_worker(
    db: SqliteDatabase,
    producers: EventProducers,
    source: ImapSource,
    notifier: Notifier<SmtpMessenger>,
    poll_interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(poll_interval);
        let api = ReconciliationApi::new(db, producers);
        let parser = TransferNoticeParser::default();
        info!("📬️ Mailbox reconciliation worker started ({}s interval)", poll_interval.as_secs());
        loop {
            timer.tick().await;
            debug!("📬️ Polling the mailbox for payment notifications");
            match run_cycle(&api, &parser, &source, &notifier).await {
                Ok(report) if report.fetched == 0 => trace!("📬️ No new messages"),
                Ok(report) => {
                    info!(
                        "📬️ Cycle complete. {} fetched, {} settled, {} partial, {} ignored, {} skipped, {} failed",
                        report.fetched, report.settled, report.partial, report.ignored, report.skipped, report.failed
                    );
                },
                Err(e) => {
                    // Source trouble aborts only this cycle. The next tick reconnects.
                    error!("📬️ Could not fetch messages: {e}");
                },
            }
        }
    })
}

/// Runs one poll cycle: fetch the unread messages, then parse, reconcile and notify for each one
/// in turn. A failure on one message is logged and counted; it never stalls the rest of the batch.
pub async fn run_cycle<B, P, S, M>(
    api: &ReconciliationApi<B>,
    parser: &P,
    source: &S,
    notifier: &Notifier<M>,
) -> Result<CycleReport, SourceError>
where
    B: LedgerDatabase,
    P: NoticeParser,
    S: MessageSource,
    M: Messenger,
{
    let messages = source.fetch_unread().await?;
    let mut report = CycleReport { fetched: messages.len(), ..CycleReport::default() };
    for message in &messages {
        let Some(event) = parser.parse(&message.body) else {
            debug!("📬️ A message did not look like a payment notification. Skipping it.");
            report.skipped += 1;
            continue;
        };
        match api.reconcile(event, message.key.as_deref()).await {
            Ok(outcome) => {
                match &outcome {
                    SettlementOutcome::Settled { .. } => report.settled += 1,
                    SettlementOutcome::Partial { .. } => report.partial += 1,
                    SettlementOutcome::Ignored { reference, reason } => {
                        warn!("📬️ Dropped a payment notification for [{reference}]: {reason}");
                        report.ignored += 1;
                    },
                }
                notifier.notify(&outcome).await;
            },
            Err(e) => {
                error!("📬️ The ledger rejected a payment notification: {e}");
                report.failed += 1;
            },
        }
    }
    Ok(report)
}
