use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

const DEFAULT_INCOME_CATEGORIES: &str = "зарплата,аванс,пополнение,доход,премия";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub bot_token: String,
    pub database_url: String,
    pub bot_name: String,
    /// Categories treated as income by the message parser. Data, not logic:
    /// extend via the INCOME_CATEGORIES env var without touching code.
    pub income_categories: Vec<String>,
    pub max_retry_attempts: u32,
    pub retry_interval_secs: u64,
    pub store_timeout_secs: u64,
    pub log_level: String,
}

impl Settings {
    pub fn new() -> Result<Self> {
        let bot_token = env::var("BOT_TOKEN").map_err(|_| anyhow!("BOT_TOKEN must be set"))?;

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "budget_bot.db".to_string());

        let bot_name = env::var("BOT_NAME").unwrap_or_else(|_| "BudgetBot".to_string());

        let income_categories = parse_income_categories(
            &env::var("INCOME_CATEGORIES")
                .unwrap_or_else(|_| DEFAULT_INCOME_CATEGORIES.to_string()),
        );

        let max_retry_attempts = env::var("MAX_RETRY_ATTEMPTS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u32>()
            .unwrap_or(30);

        let retry_interval_secs = env::var("RETRY_INTERVAL")
            .unwrap_or_else(|_| "2".to_string())
            .parse::<u64>()
            .unwrap_or(2);

        let store_timeout_secs = env::var("STORE_TIMEOUT")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .unwrap_or(30);

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(Settings {
            bot_token,
            database_url,
            bot_name,
            income_categories,
            max_retry_attempts,
            retry_interval_secs,
            store_timeout_secs,
            log_level,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.bot_token.is_empty() {
            return Err(anyhow!("Bot token cannot be empty"));
        }

        if self.database_url.is_empty() {
            return Err(anyhow!("Database URL cannot be empty"));
        }

        if self.income_categories.is_empty() {
            return Err(anyhow!("Income category list cannot be empty"));
        }

        if self.max_retry_attempts == 0 {
            return Err(anyhow!("Max retry attempts must be greater than 0"));
        }

        if self.store_timeout_secs == 0 {
            return Err(anyhow!("Store timeout must be greater than 0"));
        }

        Ok(())
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval_secs)
    }
}

fn parse_income_categories(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|category| category.trim().to_lowercase())
        .filter(|category| !category.is_empty())
        .collect()
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            bot_token: String::new(),
            database_url: "budget_bot.db".to_string(),
            bot_name: "BudgetBot".to_string(),
            income_categories: parse_income_categories(DEFAULT_INCOME_CATEGORIES),
            max_retry_attempts: 30,
            retry_interval_secs: 2,
            store_timeout_secs: 30,
            log_level: "info".to_string(),
        }
    }
}
