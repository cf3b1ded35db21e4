use std::{fmt::Display, str::FromStr};

use bevvy_common::Euro;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

//--------------------------------------        DebtId        ---------------------------------------------------------
/// The reference token for a debt.
///
/// The id is embedded in outbound payment requests and expected back in the payer's confirmation
/// message; it is the matching key for reconciliation. On a partial payment the remaining balance
/// moves to a successor debt under a fresh id, so stale tokens stop resolving.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct DebtId(pub String);

impl DebtId {
    /// Generates a fresh reference token (a v4 UUID).
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for DebtId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for DebtId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for DebtId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------         Debt         ---------------------------------------------------------
/// One payer's outstanding amount for a group-order submission.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Debt {
    pub id: DebtId,
    pub session_id: String,
    pub payer_name: String,
    pub payer_email: String,
    pub amount_owed: Euro,
    /// Cumulative amount paid. Starts at whatever credit was applied at submission time and only
    /// ever grows; on re-referencing it is carried forward unchanged to the successor.
    pub amount_paid: Euro,
    pub settled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Debt {
    pub fn remaining(&self) -> Euro {
        self.amount_owed - self.amount_paid
    }
}

//--------------------------------------        NewDebt       ---------------------------------------------------------
/// A group-order submission about to enter the ledger. The owed amount is derived from the line
/// items that accompany it, never supplied directly.
#[derive(Debug, Clone)]
pub struct NewDebt {
    pub session_id: String,
    pub payer_name: String,
    pub payer_email: String,
}

impl NewDebt {
    pub fn new<S1, S2, S3>(session_id: S1, payer_name: S2, payer_email: S3) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self { session_id: session_id.into(), payer_name: payer_name.into(), payer_email: payer_email.into() }
    }
}

//--------------------------------------       LineItem       ---------------------------------------------------------
/// A single purchase belonging to exactly one debt. The sum of a debt's line-item prices equals
/// its owed amount at all times.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    pub debt_id: DebtId,
    pub session_id: String,
    pub name: String,
    pub price: Euro,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewLineItem {
    pub name: String,
    pub price: Euro,
}

impl NewLineItem {
    pub fn new<S: Into<String>>(name: S, price: Euro) -> Self {
        Self { name: name.into(), price }
    }
}

//--------------------------------------     PaymentEvent     ---------------------------------------------------------
/// A structured payment notification, extracted from one raw message body.
///
/// Transient: produced by the parser, consumed once by the reconciliation engine, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentEvent {
    pub amount: Euro,
    pub reference: DebtId,
}

//--------------------------------------     PayerBalance     ---------------------------------------------------------
/// Per-payer summary of prepaid credit versus outstanding debt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayerBalance {
    pub payer_email: String,
    pub credit: Euro,
    pub debt: Euro,
}
