use chrono::NaiveDate;

use crate::error::{BookkeeperError, Result};
use crate::models::Transaction;

/// Optional predicates over transactions. Unset fields impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub account: Option<String>,
    pub description: Option<String>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.start.is_none()
            && self.end.is_none()
            && self.account.is_none()
            && self.description.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(BookkeeperError::Validation(format!(
                    "start date {} is after end date {}",
                    start.format("%m-%d-%Y"),
                    end.format("%m-%d-%Y")
                )));
            }
        }
        Ok(())
    }

    /// Transactions matching every supplied criterion, in input order.
    pub fn apply<'a>(&self, transactions: &'a [Transaction]) -> Vec<&'a Transaction> {
        let needle = self.description.as_ref().map(|d| d.to_lowercase());
        transactions
            .iter()
            .filter(|t| self.start.map_or(true, |s| t.date >= s))
            .filter(|t| self.end.map_or(true, |e| t.date <= e))
            .filter(|t| self.account.as_ref().map_or(true, |a| &t.account == a))
            .filter(|t| {
                needle
                    .as_ref()
                    .map_or(true, |n| t.description.to_lowercase().contains(n.as_str()))
            })
            .collect()
    }
}
