use crate::database::models::{Transaction, TransactionKind};
use crate::utils::round_money;

/// Per-category totals over a set of transactions. Categories keep the order
/// of their first appearance; no numeric sort is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    pub expenses_by_category: Vec<(String, f64)>,
    pub income_by_category: Vec<(String, f64)>,
    pub total_expenses: f64,
    pub total_income: f64,
    pub net: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Profit,
    Loss,
    BrokeEven,
}

impl Statistics {
    pub fn outcome(&self) -> Outcome {
        if self.net > 0.0 {
            Outcome::Profit
        } else if self.net < 0.0 {
            Outcome::Loss
        } else {
            Outcome::BrokeEven
        }
    }

    pub fn is_empty(&self) -> bool {
        self.expenses_by_category.is_empty() && self.income_by_category.is_empty()
    }
}

/// Buckets each transaction by its stored kind. The kind was fixed at write
/// time; the income allow-list is never consulted again here.
pub fn aggregate(transactions: &[Transaction]) -> Statistics {
    let mut expenses_by_category: Vec<(String, f64)> = Vec::new();
    let mut income_by_category: Vec<(String, f64)> = Vec::new();
    let mut total_expenses = 0.0;
    let mut total_income = 0.0;

    for transaction in transactions {
        match transaction.kind {
            TransactionKind::Income => {
                add_to_bucket(
                    &mut income_by_category,
                    &transaction.category,
                    transaction.amount,
                );
                total_income += transaction.amount;
            }
            TransactionKind::Expense => {
                add_to_bucket(
                    &mut expenses_by_category,
                    &transaction.category,
                    transaction.amount,
                );
                total_expenses += transaction.amount;
            }
        }
    }

    let total_expenses = round_money(total_expenses);
    let total_income = round_money(total_income);

    Statistics {
        expenses_by_category,
        income_by_category,
        total_expenses,
        total_income,
        net: round_money(total_income - total_expenses),
    }
}

fn add_to_bucket(buckets: &mut Vec<(String, f64)>, category: &str, amount: f64) {
    match buckets.iter_mut().find(|(name, _)| name == category) {
        Some((_, total)) => *total = round_money(*total + amount),
        None => buckets.push((category.to_string(), amount)),
    }
}
