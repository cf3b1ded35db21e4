use sqlx::SqliteConnection;

/// True if a message with this key has been applied to the ledger before.
pub async fn is_processed(message_key: &str, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT message_key FROM processed_messages WHERE message_key = $1")
            .bind(message_key)
            .fetch_optional(conn)
            .await?;
    Ok(row.is_some())
}

/// Records the key inside the same transaction that applies the message's ledger mutation, so the
/// mutation and the dedupe record commit or roll back together.
pub async fn record_processed(message_key: &str, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT OR IGNORE INTO processed_messages (message_key) VALUES ($1)")
        .bind(message_key)
        .execute(conn)
        .await?;
    Ok(())
}
