use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::models::{
    Advice, CashFlowSummary, CategorySummary, CategoryTotal, FlagReason, SeriesPoint,
    SuspiciousTransaction, Transaction, WeekdayTotal,
};

// ---------------------------------------------------------------------------
// Category totals
// ---------------------------------------------------------------------------

pub fn category_totals(transactions: &[&Transaction]) -> CategorySummary {
    let mut groups: HashMap<&str, (Decimal, usize)> = HashMap::new();
    for t in transactions {
        let entry = groups.entry(t.category.as_str()).or_default();
        entry.0 += t.amount;
        entry.1 += 1;
    }

    let mut categories: Vec<CategoryTotal> = groups
        .into_iter()
        .map(|(name, (total, count))| CategoryTotal {
            name: name.to_string(),
            total,
            count,
        })
        .collect();
    categories.sort_by(|a, b| {
        b.total
            .abs()
            .cmp(&a.total.abs())
            .then_with(|| a.name.cmp(&b.name))
    });

    let total = transactions.iter().map(|t| t.amount).sum();
    CategorySummary { categories, total }
}

// ---------------------------------------------------------------------------
// Suspicious transactions
// ---------------------------------------------------------------------------

/// Rules for [`detect_suspicious`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuspicionPolicy {
    /// Amounts whose magnitude is strictly above this are flagged `LARGE_AMOUNT`.
    pub large_amount_threshold: Decimal,
    /// IQR multiplier for the outer fence on debit magnitudes. `None` disables `OUTLIER`.
    pub outlier_fence: Option<Decimal>,
}

impl Default for SuspicionPolicy {
    fn default() -> Self {
        Self {
            large_amount_threshold: Decimal::from(1000),
            outlier_fence: Some(Decimal::from(3)),
        }
    }
}

const MIN_OUTLIER_SAMPLE: usize = 4;

/// Flag large amounts, repeated `(description, amount, date)` rows and debit outliers.
///
/// The first occurrence of a repeated row is not flagged; every later one is.
/// Results follow input order, and a transaction with several reasons yields
/// one entry per reason.
pub fn detect_suspicious<'a>(
    transactions: &[&'a Transaction],
    policy: &SuspicionPolicy,
) -> Vec<SuspiciousTransaction<'a>> {
    let fence = policy
        .outlier_fence
        .and_then(|k| outlier_fence(transactions, k));

    let mut seen: HashSet<(&str, Decimal, NaiveDate)> = HashSet::new();
    let mut flagged = Vec::new();
    for &t in transactions {
        if t.amount.abs() > policy.large_amount_threshold {
            flagged.push(SuspiciousTransaction {
                transaction: t,
                reason: FlagReason::LargeAmount,
            });
        }
        if !seen.insert((t.description.as_str(), t.amount, t.date)) {
            flagged.push(SuspiciousTransaction {
                transaction: t,
                reason: FlagReason::Duplicate,
            });
        }
        if let Some(fence) = fence {
            if t.is_expense() && t.amount.abs() > fence {
                flagged.push(SuspiciousTransaction {
                    transaction: t,
                    reason: FlagReason::Outlier,
                });
            }
        }
    }
    tracing::debug!(flagged = flagged.len(), "suspicious transaction scan complete");
    flagged
}

/// `Q3 + k * IQR` over debit magnitudes, or `None` with too few debits or a
/// fence beyond `Decimal`'s range.
fn outlier_fence(transactions: &[&Transaction], k: Decimal) -> Option<Decimal> {
    let mut debits: Vec<Decimal> = transactions
        .iter()
        .filter(|t| t.is_expense())
        .map(|t| t.amount.abs())
        .collect();
    if debits.len() < MIN_OUTLIER_SAMPLE {
        return None;
    }
    debits.sort();
    let q1 = quantile(&debits, Decimal::new(25, 2))?;
    let q3 = quantile(&debits, Decimal::new(75, 2))?;
    k.checked_mul(q3 - q1)?.checked_add(q3)
}

/// Linear-interpolated quantile of sorted values.
fn quantile(sorted: &[Decimal], q: Decimal) -> Option<Decimal> {
    let last = sorted.len().checked_sub(1)?;
    let pos = q * Decimal::from(last);
    let lower = pos.floor().to_usize()?;
    let frac = pos - pos.floor();
    let low = sorted[lower];
    let high = sorted.get(lower + 1).copied().unwrap_or(low);
    Some(low + (high - low) * frac)
}

// ---------------------------------------------------------------------------
// Spending over time
// ---------------------------------------------------------------------------

/// One point per calendar day with that day's sum and the running total.
pub fn spending_over_time(transactions: &[&Transaction]) -> Vec<SeriesPoint> {
    let mut by_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for t in transactions {
        *by_day.entry(t.date).or_default() += t.amount;
    }

    let mut running = Decimal::ZERO;
    by_day
        .into_iter()
        .map(|(date, daily_total)| {
            running += daily_total;
            SeriesPoint {
                date,
                daily_total,
                cumulative: running,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Cash flow and weekday breakdown
// ---------------------------------------------------------------------------

pub fn cash_flow(transactions: &[&Transaction]) -> CashFlowSummary {
    let income: Decimal = transactions
        .iter()
        .filter(|t| t.amount > Decimal::ZERO)
        .map(|t| t.amount)
        .sum();
    let spending: Decimal = transactions
        .iter()
        .filter(|t| t.is_expense())
        .map(|t| t.amount.abs())
        .sum();
    let advice = if spending > income {
        Advice::Save
    } else {
        Advice::Invest
    };
    CashFlowSummary {
        income,
        spending,
        net: income - spending,
        advice,
    }
}

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Expense totals per weekday, Monday first. Income is ignored.
pub fn weekday_spending(transactions: &[&Transaction]) -> Vec<WeekdayTotal> {
    let mut totals: Vec<WeekdayTotal> = WEEK
        .iter()
        .map(|&weekday| WeekdayTotal {
            weekday,
            total: Decimal::ZERO,
            count: 0,
        })
        .collect();
    for t in transactions.iter().filter(|t| t.is_expense()) {
        let slot = &mut totals[t.date.weekday().num_days_from_monday() as usize];
        slot.total += t.amount.abs();
        slot.count += 1;
    }
    totals
}
