use crate::database::models::ParsedOperation;
use crate::error::{BudgetBotError, Result};
use crate::parser::patterns::Patterns;
use log::debug;

pub const FORMAT_ERROR_TEXT: &str = "❌ Неверный формат. Используйте: \"Категория, Сумма\"";
pub const AMOUNT_ERROR_TEXT: &str = "❌ Сумма должна быть числом";

#[derive(Clone, Debug)]
pub struct MessageParser {
    income_categories: Vec<String>,
    patterns: &'static Patterns,
}

impl MessageParser {
    pub fn new(income_categories: Vec<String>) -> Self {
        Self {
            income_categories: income_categories
                .into_iter()
                .map(|category| category.to_lowercase())
                .collect(),
            patterns: Patterns::get_instance(),
        }
    }

    /// Parses a "Категория, Сумма" line. The comma is the only separator;
    /// anything with more or fewer parts is rejected before the amount is
    /// even looked at.
    pub fn parse(&self, text: &str) -> Result<ParsedOperation> {
        debug!("Parsing message: {text}");

        let parts: Vec<&str> = self.patterns.split_regex.split(text.trim()).collect();
        if parts.len() != 2 {
            return Err(BudgetBotError::format_error(FORMAT_ERROR_TEXT));
        }

        let category = parts[0].trim().to_lowercase();
        let amount = self.parse_number(parts[1])?;
        let is_income = self.is_income_category(&category);

        Ok(ParsedOperation {
            category,
            amount,
            is_income,
        })
    }

    /// Shared number normalization for amounts and mode input: inner
    /// whitespace removed, decimal comma accepted. Negative values are legal
    /// literals (the currency withdraw-by-negative convention).
    pub fn parse_number(&self, text: &str) -> Result<f64> {
        let normalized = self
            .patterns
            .whitespace_regex
            .replace_all(text.trim(), "")
            .replace(',', ".");

        normalized
            .parse::<f64>()
            .map_err(|_| BudgetBotError::amount_error(AMOUNT_ERROR_TEXT))
    }

    pub fn is_income_category(&self, category: &str) -> bool {
        let category = category.to_lowercase();
        self.income_categories.iter().any(|known| *known == category)
    }

    pub fn income_categories(&self) -> &[String] {
        &self.income_categories
    }
}
