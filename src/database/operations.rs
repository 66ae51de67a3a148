use crate::database::models::{CurrencyBalance, Transaction, TransactionKind};
use crate::error::{BudgetBotError, Result};
use crate::utils::round_money;
use chrono::{Local, NaiveDate};
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::timeout;

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    store_timeout: Duration,
}

impl Database {
    pub async fn new(database_url: &str, store_timeout: Duration) -> Result<Self> {
        let conn = Connection::open(database_url)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
            store_timeout,
        };

        db.init_schema().await?;
        Ok(db)
    }

    /// Bounded wait for the connection. A gateway call fails with a clear
    /// store-unavailable error instead of hanging indefinitely.
    async fn acquire(&self) -> Result<MutexGuard<'_, Connection>> {
        timeout(self.store_timeout, self.conn.lock())
            .await
            .map_err(|_| BudgetBotError::store_unavailable("timed out waiting for connection"))
    }

    async fn init_schema(&self) -> Result<()> {
        let conn = self.acquire().await?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                chat_id INTEGER NOT NULL,
                date TEXT NOT NULL,
                category TEXT NOT NULL,
                amount REAL NOT NULL,
                kind TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS balances (
                chat_id INTEGER PRIMARY KEY,
                amount REAL NOT NULL DEFAULT 0,
                last_updated TEXT
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS currency_balances (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                chat_id INTEGER NOT NULL,
                currency TEXT NOT NULL,
                amount REAL NOT NULL DEFAULT 0,
                last_updated TEXT,
                UNIQUE(chat_id, currency)
            )",
            [],
        )?;

        info!("Database schema initialized successfully");
        Ok(())
    }

    /// Inserts the transaction and applies the signed delta to the chat's
    /// balance as one store transaction.
    pub async fn add_transaction(
        &self,
        chat_id: i64,
        date: NaiveDate,
        category: &str,
        amount: f64,
        is_income: bool,
    ) -> Result<()> {
        let mut conn = self.acquire().await?;
        let kind = TransactionKind::from_is_income(is_income);
        let amount = round_money(amount);
        let today = Local::now().date_naive();

        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO transactions (chat_id, date, category, amount, kind)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![chat_id, date, category, amount, kind.as_str()],
        )?;

        let delta = if is_income { amount } else { -amount };
        let current: Option<f64> = tx
            .query_row(
                "SELECT amount FROM balances WHERE chat_id = ?1",
                params![chat_id],
                |row| row.get(0),
            )
            .optional()?;

        match current {
            Some(balance) => {
                tx.execute(
                    "UPDATE balances SET amount = ?1, last_updated = ?2 WHERE chat_id = ?3",
                    params![round_money(balance + delta), today, chat_id],
                )?;
            }
            None => {
                tx.execute(
                    "INSERT INTO balances (chat_id, amount, last_updated) VALUES (?1, ?2, ?3)",
                    params![chat_id, delta, today],
                )?;
            }
        }
        tx.commit()?;

        info!(
            "Transaction added for chat_id {}: {} - {:.2} ({})",
            chat_id,
            category,
            amount,
            kind.as_str()
        );
        Ok(())
    }

    pub async fn get_transactions(&self, chat_id: i64) -> Result<Vec<Transaction>> {
        let conn = self.acquire().await?;

        let mut stmt = conn.prepare(
            "SELECT id, chat_id, date, category, amount, kind
             FROM transactions WHERE chat_id = ?1",
        )?;
        let rows = stmt.query_map(params![chat_id], map_transaction_row)?;

        let mut transactions = Vec::new();
        for row in rows {
            transactions.push(row?);
        }
        Ok(transactions)
    }

    /// Closed interval on the date column: both boundary days are included.
    pub async fn get_transactions_by_period(
        &self,
        chat_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        let conn = self.acquire().await?;

        let mut stmt = conn.prepare(
            "SELECT id, chat_id, date, category, amount, kind
             FROM transactions WHERE chat_id = ?1 AND date >= ?2 AND date <= ?3",
        )?;
        let rows = stmt.query_map(params![chat_id, start, end], map_transaction_row)?;

        let mut transactions = Vec::new();
        for row in rows {
            transactions.push(row?);
        }
        Ok(transactions)
    }

    /// Absence is a valid default, not an error.
    pub async fn get_user_balance(&self, chat_id: i64) -> Result<f64> {
        let conn = self.acquire().await?;

        let balance: Option<f64> = conn
            .query_row(
                "SELECT amount FROM balances WHERE chat_id = ?1",
                params![chat_id],
                |row| row.get(0),
            )
            .optional()?;

        Ok(balance.unwrap_or(0.0))
    }

    /// Upsert overwrite. Intentionally breaks the derived-from-transactions
    /// invariant: this is the manual override feature.
    pub async fn reset_user_balance(&self, chat_id: i64, new_value: f64) -> Result<f64> {
        let conn = self.acquire().await?;
        let new_value = round_money(new_value);
        let today = Local::now().date_naive();

        let updated = conn.execute(
            "UPDATE balances SET amount = ?1, last_updated = ?2 WHERE chat_id = ?3",
            params![new_value, today, chat_id],
        )?;
        if updated == 0 {
            conn.execute(
                "INSERT INTO balances (chat_id, amount, last_updated) VALUES (?1, ?2, ?3)",
                params![chat_id, new_value, today],
            )?;
        }

        info!("User {chat_id} balance reset to: {new_value:.2}");
        Ok(new_value)
    }

    /// Deletes all three record sets for the chat in one store transaction
    /// and reports per-set deleted counts.
    pub async fn delete_all_user_data(&self, chat_id: i64) -> Result<(usize, usize, usize)> {
        let mut conn = self.acquire().await?;

        let tx = conn.transaction()?;
        let transactions_deleted = tx.execute(
            "DELETE FROM transactions WHERE chat_id = ?1",
            params![chat_id],
        )?;
        let balances_deleted =
            tx.execute("DELETE FROM balances WHERE chat_id = ?1", params![chat_id])?;
        let currencies_deleted = tx.execute(
            "DELETE FROM currency_balances WHERE chat_id = ?1",
            params![chat_id],
        )?;
        tx.commit()?;

        info!(
            "User {chat_id} data deleted: {transactions_deleted} transactions, \
             {balances_deleted} balance records, {currencies_deleted} currency records"
        );
        Ok((transactions_deleted, balances_deleted, currencies_deleted))
    }

    pub async fn get_user_currencies(&self, chat_id: i64) -> Result<Vec<CurrencyBalance>> {
        let conn = self.acquire().await?;

        let mut stmt = conn.prepare(
            "SELECT id, chat_id, currency, amount, last_updated
             FROM currency_balances WHERE chat_id = ?1",
        )?;
        let rows = stmt.query_map(params![chat_id], |row| {
            Ok(CurrencyBalance {
                id: Some(row.get(0)?),
                chat_id: row.get(1)?,
                currency: row.get(2)?,
                amount: row.get(3)?,
                last_updated: row.get(4)?,
            })
        })?;

        let mut currencies = Vec::new();
        for row in rows {
            currencies.push(row?);
        }
        Ok(currencies)
    }

    /// Upsert, full overwrite of the stored amount (not a delta).
    pub async fn update_user_currency(
        &self,
        chat_id: i64,
        currency: &str,
        amount: f64,
    ) -> Result<f64> {
        let conn = self.acquire().await?;
        let amount = round_money(amount);
        let today = Local::now().date_naive();

        let updated = conn.execute(
            "UPDATE currency_balances SET amount = ?1, last_updated = ?2
             WHERE chat_id = ?3 AND currency = ?4",
            params![amount, today, chat_id, currency],
        )?;
        if updated == 0 {
            conn.execute(
                "INSERT INTO currency_balances (chat_id, currency, amount, last_updated)
                 VALUES (?1, ?2, ?3, ?4)",
                params![chat_id, currency, amount, today],
            )?;
        }

        info!("User {chat_id} {currency} balance updated: {amount:.2}");
        Ok(amount)
    }

    pub async fn delete_user_currency(&self, chat_id: i64, currency: &str) -> Result<bool> {
        let conn = self.acquire().await?;

        let deleted = conn.execute(
            "DELETE FROM currency_balances WHERE chat_id = ?1 AND currency = ?2",
            params![chat_id, currency],
        )?;

        if deleted > 0 {
            info!("User {chat_id} {currency} balance deleted");
        } else {
            debug!("User {chat_id} has no {currency} balance to delete");
        }
        Ok(deleted > 0)
    }

    /// Idempotent: returns the existing amount if the balance is already
    /// open, otherwise creates it at zero.
    pub async fn create_currency_balance(&self, chat_id: i64, currency: &str) -> Result<f64> {
        let conn = self.acquire().await?;

        let existing: Option<f64> = conn
            .query_row(
                "SELECT amount FROM currency_balances WHERE chat_id = ?1 AND currency = ?2",
                params![chat_id, currency],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(amount) = existing {
            return Ok(amount);
        }

        let today = Local::now().date_naive();
        conn.execute(
            "INSERT INTO currency_balances (chat_id, currency, amount, last_updated)
             VALUES (?1, ?2, 0, ?3)",
            params![chat_id, currency, today],
        )?;

        info!("User {chat_id} {currency} balance created with 0");
        Ok(0.0)
    }
}

fn map_transaction_row(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let kind: String = row.get(5)?;
    let kind = kind.parse::<TransactionKind>().map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, err.into())
    })?;

    Ok(Transaction {
        id: Some(row.get(0)?),
        chat_id: row.get(1)?,
        date: row.get(2)?,
        category: row.get(3)?,
        amount: row.get(4)?,
        kind,
    })
}
