use bevvy_engine::{
    events::{EventHandlers, EventHooks},
    run_migrations,
    SqliteDatabase,
};
use bevvy_server::{
    config::ServerConfig,
    errors::ServerError,
    mailbox::ImapSource,
    notifier::Notifier,
    poll_worker::start_reconciliation_worker,
    SmtpMessenger,
};
use dotenvy::dotenv;
use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();
    let config = ServerConfig::from_env_or_default();

    info!("🚀️ Starting the BevvyRun reconciliation server");
    match run_server(config).await {
        Ok(_) => println!("Bye!"),
        Err(e) => eprintln!("{e}"),
    }
}

async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    if !Sqlite::database_exists(&config.database_url).await.unwrap_or(false) {
        info!("🚀️ Creating database {}", config.database_url);
        Sqlite::create_database(&config.database_url).await?;
    }
    let db = SqliteDatabase::new_with_url(&config.database_url, 25).await?;
    run_migrations(db.pool()).await?;

    // Log-only hooks. A live push transport (websockets and friends) would subscribe here.
    let mut hooks = EventHooks::default();
    hooks.on_debt_settled(|ev| {
        Box::pin(async move {
            info!("🪝️ Debt [{}] of {} is settled", ev.debt.id, ev.debt.payer_email);
        })
    });
    hooks.on_session_updated(|ev| {
        Box::pin(async move {
            info!("🪝️ Session {} has updated ledger state", ev.session_id);
        })
    });
    let handlers = EventHandlers::new(25, hooks);
    let producers = handlers.producers();
    handlers.start_handlers().await;

    let source = ImapSource::new(config.mail.clone());
    let messenger = SmtpMessenger::new(&config.mail).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let notifier = Notifier::new(messenger);
    let _worker = start_reconciliation_worker(db, producers, source, notifier, config.poll_interval);

    info!("🚀️ Server is running. Press Ctrl-C to stop.");
    tokio::signal::ctrl_c().await?;
    info!("🚀️ Shutting down");
    Ok(())
}
