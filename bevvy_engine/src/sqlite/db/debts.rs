use bevvy_common::Euro;
use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{Debt, DebtId};

/// Inserts a debt row. Not atomic on its own; embed the call inside a transaction and pass
/// `&mut *tx` as the connection argument when it is part of a larger mutation.
#[allow(clippy::too_many_arguments)]
pub async fn insert_debt(
    id: &DebtId,
    session_id: &str,
    payer_name: &str,
    payer_email: &str,
    amount_owed: Euro,
    amount_paid: Euro,
    settled: bool,
    conn: &mut SqliteConnection,
) -> Result<Debt, sqlx::Error> {
    let debt = sqlx::query_as(
        r#"
            INSERT INTO debts (id, session_id, payer_name, payer_email, amount_owed, amount_paid, settled)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(id.as_str())
    .bind(session_id)
    .bind(payer_name)
    .bind(payer_email)
    .bind(amount_owed)
    .bind(amount_paid)
    .bind(settled)
    .fetch_one(conn)
    .await?;
    Ok(debt)
}

/// Inserts the successor for a partially paid debt. Everything except the id and the cumulative
/// paid amount is inherited from the original, including its creation timestamp.
pub async fn insert_successor(
    original: &Debt,
    successor_id: &DebtId,
    amount_paid: Euro,
    conn: &mut SqliteConnection,
) -> Result<Debt, sqlx::Error> {
    let debt: Debt = sqlx::query_as(
        r#"
            INSERT INTO debts (id, session_id, payer_name, payer_email, amount_owed, amount_paid, settled, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, 0, $7)
            RETURNING *;
        "#,
    )
    .bind(successor_id.as_str())
    .bind(original.session_id.as_str())
    .bind(original.payer_name.as_str())
    .bind(original.payer_email.as_str())
    .bind(original.amount_owed)
    .bind(amount_paid)
    .bind(original.created_at)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Debt [{}] re-referenced as [{}]", original.id, debt.id);
    Ok(debt)
}

pub async fn fetch_debt_by_reference(
    reference: &DebtId,
    conn: &mut SqliteConnection,
) -> Result<Option<Debt>, sqlx::Error> {
    let debt =
        sqlx::query_as("SELECT * FROM debts WHERE id = $1").bind(reference.as_str()).fetch_optional(conn).await?;
    Ok(debt)
}

pub async fn fetch_debts_for_session(session_id: &str, conn: &mut SqliteConnection) -> Result<Vec<Debt>, sqlx::Error> {
    let debts = sqlx::query_as("SELECT * FROM debts WHERE session_id = $1 ORDER BY created_at DESC")
        .bind(session_id)
        .fetch_all(conn)
        .await?;
    Ok(debts)
}

/// Marks the debt settled with the given cumulative paid amount. Terminal: a settled debt is never
/// touched by the engine again.
pub async fn settle(reference: &DebtId, amount_paid: Euro, conn: &mut SqliteConnection) -> Result<Debt, sqlx::Error> {
    let debt = sqlx::query_as(
        "UPDATE debts SET settled = 1, amount_paid = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *",
    )
    .bind(amount_paid)
    .bind(reference.as_str())
    .fetch_one(conn)
    .await?;
    Ok(debt)
}

/// Re-derives the owed amount after a line-item mutation.
pub async fn set_amount_owed(
    reference: &DebtId,
    amount_owed: Euro,
    conn: &mut SqliteConnection,
) -> Result<Debt, sqlx::Error> {
    let debt = sqlx::query_as(
        "UPDATE debts SET amount_owed = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *",
    )
    .bind(amount_owed)
    .bind(reference.as_str())
    .fetch_one(conn)
    .await?;
    Ok(debt)
}

/// Removes a retired debt row so its reference token stops resolving.
pub async fn delete(reference: &DebtId, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM debts WHERE id = $1").bind(reference.as_str()).execute(conn).await?;
    Ok(())
}

/// Outstanding (unsettled) debt per payer, for the balance summary.
pub async fn outstanding_per_payer(conn: &mut SqliteConnection) -> Result<Vec<(String, Euro)>, sqlx::Error> {
    let rows = sqlx::query_as(
        r#"
            SELECT payer_email, SUM(amount_owed - amount_paid) AS debt
            FROM debts
            WHERE settled = 0
            GROUP BY payer_email
            HAVING debt > 0.001
        "#,
    )
    .fetch_all(conn)
    .await?;
    Ok(rows)
}
