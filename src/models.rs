use std::fmt;

use chrono::{NaiveDate, Weekday};
use rust_decimal::Decimal;

/// One parsed row of a transaction export. Never mutated after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub category: String,
    pub account: String,
    pub description: String,
}

impl Transaction {
    /// Fields in the simple export layout: date, amount, category, account, description.
    #[cfg(test)]
    pub fn to_record(&self) -> [String; 5] {
        [
            self.date.format("%m-%d-%Y").to_string(),
            self.amount.to_string(),
            self.category.clone(),
            self.account.clone(),
            self.description.clone(),
        ]
    }

    pub fn is_expense(&self) -> bool {
        self.amount < Decimal::ZERO
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotal {
    pub name: String,
    pub total: Decimal,
    pub count: usize,
}

/// Per-category totals ordered by absolute total descending, then name ascending.
#[derive(Debug, Clone, Default)]
pub struct CategorySummary {
    pub categories: Vec<CategoryTotal>,
    pub total: Decimal,
}

impl CategorySummary {
    /// The first `n` categories. Omitted or non-positive `n` means all of them.
    pub fn top(&self, n: Option<i64>) -> &[CategoryTotal] {
        match n {
            Some(n) if n > 0 => {
                let n = usize::try_from(n).unwrap_or(usize::MAX);
                &self.categories[..n.min(self.categories.len())]
            }
            _ => &self.categories,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FlagReason {
    LargeAmount,
    Duplicate,
    Outlier,
}

impl FlagReason {
    pub fn code(&self) -> &'static str {
        match self {
            Self::LargeAmount => "LARGE_AMOUNT",
            Self::Duplicate => "DUPLICATE",
            Self::Outlier => "OUTLIER",
        }
    }
}

impl fmt::Display for FlagReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuspiciousTransaction<'a> {
    pub transaction: &'a Transaction,
    pub reason: FlagReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub daily_total: Decimal,
    pub cumulative: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advice {
    /// Spending exceeds income.
    Save,
    /// Income covers spending; the surplus could be invested.
    Invest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CashFlowSummary {
    pub income: Decimal,
    pub spending: Decimal,
    pub net: Decimal,
    pub advice: Advice,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekdayTotal {
    pub weekday: Weekday,
    pub total: Decimal,
    pub count: usize,
}
