use crate::calculator::{Outcome, Period, Statistics};
use crate::database::models::CurrencyBalance;
use crate::error::BudgetBotError;
use chrono::NaiveDate;
use log::{error, info};

/// Symbols shown next to currency amounts. Data, not logic: unknown codes
/// fall back to the code itself.
const CURRENCY_SYMBOLS: &[(&str, &str)] = &[("USD", "$"), ("CNY", "¥")];

/// Monetary values carry 2 fractional digits everywhere.
pub fn round_money(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub struct Logger;

impl Logger {
    pub fn log_operation_start(operation: &str, details: &str) {
        info!("🚀 Starting {operation}: {details}");
    }

    pub fn log_operation_success(operation: &str, details: &str) {
        info!("✅ {operation} completed successfully: {details}");
    }

    pub fn log_operation_failure(operation: &str, error: &str) {
        error!("❌ {operation} failed: {error}");
    }

    /// Store failures are logged with chat context; the user only ever sees
    /// a generic failure text.
    pub fn log_store_failure(chat_id: i64, operation: &str, error: &BudgetBotError) {
        error!("[{}] Store operation '{operation}' failed for chat {chat_id}: {error}", error.severity());
    }
}

pub struct Formatter;

impl Formatter {
    pub fn format_rub(amount: f64) -> String {
        format!("{amount:.2} руб.")
    }

    pub fn currency_symbol(code: &str) -> &str {
        CURRENCY_SYMBOLS
            .iter()
            .find(|(known, _)| *known == code)
            .map(|(_, symbol)| *symbol)
            .unwrap_or(code)
    }

    pub fn format_currency(code: &str, amount: f64) -> String {
        format!("{amount:.2}{}", Self::currency_symbol(code))
    }

    /// One "• USD: 100.00$" line per open currency balance.
    pub fn currency_lines(currencies: &[CurrencyBalance]) -> String {
        currencies
            .iter()
            .map(|currency| {
                format!(
                    "• {}: {}\n",
                    currency.currency,
                    Self::format_currency(&currency.currency, currency.amount)
                )
            })
            .collect()
    }

    /// Ruble balance plus currency balances, shared by the main menu and the
    /// cancel reply.
    pub fn balances_overview(balance: f64, currencies: &[CurrencyBalance]) -> String {
        let mut message = format!("💵 Текущий баланс: {}", Self::format_rub(balance));

        if currencies.is_empty() {
            message.push_str(
                "\n\n💱 Валютные балансы отсутствуют\nДля добавления перейдите в Настройки → Валюты",
            );
        } else {
            message.push_str("\n\n💱 Валютные балансы:\n");
            message.push_str(&Self::currency_lines(currencies));
        }
        message
    }

    pub fn statistics_report(
        period: Period,
        start: NaiveDate,
        end: NaiveDate,
        stats: &Statistics,
        balance: f64,
        currencies: &[CurrencyBalance],
    ) -> String {
        let name = period.display_name();
        let dates = match period {
            Period::Day => format!("{start}"),
            _ => format!("{start} - {end}"),
        };

        let mut message = format!("{} Статистика за {name} ({dates}):\n\n", period.icon());

        if stats.expenses_by_category.is_empty() {
            message.push_str(&format!("📤 Расходов за {name} нет\n\n"));
        } else {
            message.push_str("📤 Расходы:\n");
            for (category, amount) in &stats.expenses_by_category {
                message.push_str(&format!("• {category}: {}\n", Self::format_rub(*amount)));
            }
            message.push_str(&format!(
                "\n💰 Итого расходов за {name}: {}\n\n",
                Self::format_rub(stats.total_expenses)
            ));
        }

        if stats.income_by_category.is_empty() {
            message.push_str(&format!("📥 Доходов за {name} нет\n\n"));
        } else {
            message.push_str("📥 Доходы:\n");
            for (category, amount) in &stats.income_by_category {
                message.push_str(&format!("• {category}: {}\n", Self::format_rub(*amount)));
            }
            message.push_str(&format!(
                "\n💳 Итого доходов за {name}: {}\n\n",
                Self::format_rub(stats.total_income)
            ));
        }

        match stats.outcome() {
            Outcome::Profit => message.push_str(&format!(
                "📈 Прибыль за период: +{}\n",
                Self::format_rub(stats.net)
            )),
            Outcome::Loss => message.push_str(&format!(
                "📉 Убыток за период: {}\n",
                Self::format_rub(stats.net)
            )),
            Outcome::BrokeEven => message.push_str("⚖️ За период вы вышли в ноль\n"),
        }

        message.push_str(&format!("💵 Текущий баланс: {}\n", Self::format_rub(balance)));
        if !currencies.is_empty() {
            message.push_str(&Self::currency_lines(currencies));
        }
        message
    }
}
