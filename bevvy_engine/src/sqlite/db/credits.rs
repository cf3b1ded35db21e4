use bevvy_common::Euro;
use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::PayerBalance;

pub async fn balance_for(payer_email: &str, conn: &mut SqliteConnection) -> Result<Euro, sqlx::Error> {
    let balance: Option<(Euro,)> = sqlx::query_as("SELECT balance FROM credit_balances WHERE payer_email = $1")
        .bind(payer_email)
        .fetch_optional(conn)
        .await?;
    Ok(balance.map(|(b,)| b).unwrap_or_default())
}

/// Adds an overpayment to the payer's running credit. Upsert, additive.
pub async fn add_credit(payer_email: &str, amount: Euro, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
            INSERT INTO credit_balances (payer_email, balance) VALUES ($1, $2)
            ON CONFLICT (payer_email) DO UPDATE SET balance = balance + excluded.balance
        "#,
    )
    .bind(payer_email)
    .bind(amount)
    .execute(conn)
    .await?;
    debug!("🗃️ Credited {amount} to {payer_email}");
    Ok(())
}

/// Sets the payer's balance outright. Used when credit is allocated to a new debt at submission.
pub async fn set_balance(payer_email: &str, balance: Euro, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
            INSERT INTO credit_balances (payer_email, balance) VALUES ($1, $2)
            ON CONFLICT (payer_email) DO UPDATE SET balance = excluded.balance
        "#,
    )
    .bind(payer_email)
    .bind(balance)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn all_balances(conn: &mut SqliteConnection) -> Result<Vec<(String, Euro)>, sqlx::Error> {
    let rows = sqlx::query_as("SELECT payer_email, balance FROM credit_balances WHERE balance > 0")
        .fetch_all(conn)
        .await?;
    Ok(rows)
}

/// Merges credit balances with outstanding debt into the per-payer summary.
pub fn merge_balances(credits: Vec<(String, Euro)>, debts: Vec<(String, Euro)>) -> Vec<PayerBalance> {
    let mut result: Vec<PayerBalance> = Vec::with_capacity(credits.len() + debts.len());
    for (payer_email, credit) in credits {
        result.push(PayerBalance { payer_email, credit, debt: Euro::zero() });
    }
    for (payer_email, debt) in debts {
        match result.iter_mut().find(|b| b.payer_email == payer_email) {
            Some(entry) => entry.debt = debt,
            None => result.push(PayerBalance { payer_email, credit: Euro::zero(), debt }),
        }
    }
    result.sort_by(|a, b| a.payer_email.cmp(&b.payer_email));
    result
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn merging_credit_and_debt_summaries() {
        let credits = vec![("alice@example.com".to_string(), Euro::from(2.5))];
        let debts = vec![
            ("bob@example.com".to_string(), Euro::from(6.0)),
            ("alice@example.com".to_string(), Euro::from(1.0)),
        ];
        let merged = merge_balances(credits, debts);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].payer_email, "alice@example.com");
        assert_eq!(merged[0].credit, Euro::from(2.5));
        assert_eq!(merged[0].debt, Euro::from(1.0));
        assert_eq!(merged[1].payer_email, "bob@example.com");
        assert_eq!(merged[1].credit, Euro::zero());
        assert_eq!(merged[1].debt, Euro::from(6.0));
    }
}
