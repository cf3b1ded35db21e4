use bevvy_common::Euro;
use log::trace;
use sqlx::SqliteConnection;

use crate::db_types::{DebtId, LineItem, NewLineItem};

pub async fn insert_line_item(
    id: &str,
    debt_id: &DebtId,
    session_id: &str,
    item: &NewLineItem,
    conn: &mut SqliteConnection,
) -> Result<LineItem, sqlx::Error> {
    let item = sqlx::query_as(
        r#"
            INSERT INTO line_items (id, debt_id, session_id, name, price)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(id)
    .bind(debt_id.as_str())
    .bind(session_id)
    .bind(item.name.as_str())
    .bind(item.price)
    .fetch_one(conn)
    .await?;
    Ok(item)
}

pub async fn fetch_line_item(item_id: &str, conn: &mut SqliteConnection) -> Result<Option<LineItem>, sqlx::Error> {
    let item = sqlx::query_as("SELECT * FROM line_items WHERE id = $1").bind(item_id).fetch_optional(conn).await?;
    Ok(item)
}

pub async fn fetch_items_for_debt(
    debt_id: &DebtId,
    conn: &mut SqliteConnection,
) -> Result<Vec<LineItem>, sqlx::Error> {
    let items = sqlx::query_as("SELECT * FROM line_items WHERE debt_id = $1 ORDER BY created_at ASC")
        .bind(debt_id.as_str())
        .fetch_all(conn)
        .await?;
    Ok(items)
}

/// Moves every line item of `old` onto `new`. Used when a partially paid debt is re-referenced;
/// the successor must already exist.
pub async fn repoint_items(old: &DebtId, new: &DebtId, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE line_items SET debt_id = $1 WHERE debt_id = $2")
        .bind(new.as_str())
        .bind(old.as_str())
        .execute(conn)
        .await?;
    trace!("🗃️ {} line items moved from [{old}] to [{new}]", result.rows_affected());
    Ok(result.rows_affected())
}

pub async fn update_line_item(
    item_id: &str,
    name: &str,
    price: Euro,
    conn: &mut SqliteConnection,
) -> Result<Option<LineItem>, sqlx::Error> {
    let item = sqlx::query_as("UPDATE line_items SET name = $1, price = $2 WHERE id = $3 RETURNING *")
        .bind(name)
        .bind(price)
        .bind(item_id)
        .fetch_optional(conn)
        .await?;
    Ok(item)
}

pub async fn delete_line_item(item_id: &str, conn: &mut SqliteConnection) -> Result<Option<LineItem>, sqlx::Error> {
    let item =
        sqlx::query_as("DELETE FROM line_items WHERE id = $1 RETURNING *").bind(item_id).fetch_optional(conn).await?;
    Ok(item)
}

/// The sum of the debt's line-item prices. This is the authoritative source for `amount_owed`
/// after any item mutation.
pub async fn total_for_debt(debt_id: &DebtId, conn: &mut SqliteConnection) -> Result<Euro, sqlx::Error> {
    let (total,): (Euro,) = sqlx::query_as("SELECT COALESCE(SUM(price), 0) FROM line_items WHERE debt_id = $1")
        .bind(debt_id.as_str())
        .fetch_one(conn)
        .await?;
    Ok(total)
}
