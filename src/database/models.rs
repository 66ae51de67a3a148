use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn from_is_income(is_income: bool) -> Self {
        if is_income {
            TransactionKind::Income
        } else {
            TransactionKind::Expense
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(format!("unknown transaction kind: {other}")),
        }
    }
}

/// One recorded income/expense operation. Rows are immutable: they are only
/// ever inserted or bulk-deleted by "delete all data".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Option<i64>,
    pub chat_id: i64,
    pub date: NaiveDate,
    pub category: String,
    pub amount: f64,
    pub kind: TransactionKind,
}

/// Running ruble balance, one row per chat, created lazily.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Balance {
    pub chat_id: i64,
    pub amount: f64,
    pub last_updated: Option<NaiveDate>,
}

/// Secondary-currency accumulator, unique per (chat, currency). Never derived
/// from the transaction ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyBalance {
    pub id: Option<i64>,
    pub chat_id: i64,
    pub currency: String,
    pub amount: f64,
    pub last_updated: Option<NaiveDate>,
}

/// Result of parsing a "Категория, Сумма" line.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedOperation {
    pub category: String,
    pub amount: f64,
    pub is_income: bool,
}
