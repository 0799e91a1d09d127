pub mod run;
pub mod text;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use rust_decimal::Decimal;

use crate::error::{BookkeeperError, Result};
use crate::filter::FilterCriteria;
use crate::importer::{parse_date_mdy, RowPolicy};
use crate::reports::SuspicionPolicy;
use crate::settings::Settings;

fn parse_flag_date(raw: &str) -> std::result::Result<NaiveDate, String> {
    parse_date_mdy(raw, '-').ok_or_else(|| format!("'{raw}' is not a valid MM-DD-YYYY date"))
}

#[derive(Parser, Debug)]
#[command(
    name = "bookkeeper",
    version,
    about = "Summarize spending and flag suspicious charges in a transaction export."
)]
pub struct Cli {
    /// Transaction export (CSV with one header row)
    pub file: PathBuf,
    /// Start date, inclusive
    #[arg(short = 's', long = "start", value_name = "MM-DD-YYYY", value_parser = parse_flag_date)]
    pub start: Option<NaiveDate>,
    /// End date, inclusive
    #[arg(short = 'e', long = "end", value_name = "MM-DD-YYYY", value_parser = parse_flag_date)]
    pub end: Option<NaiveDate>,
    /// Only transactions from this account (exact match)
    #[arg(short = 'a', long = "account", value_name = "NAME")]
    pub account: Option<String>,
    /// Number of top categories to report (0 or less shows all)
    #[arg(short = 'c', long = "categories", value_name = "N", allow_negative_numbers = true)]
    pub categories: Option<i64>,
    /// Only transactions whose description contains this text (case-insensitive)
    #[arg(short = 'd', long = "description", value_name = "TEXT")]
    pub description: Option<String>,
    /// Flag amounts larger than this as LARGE_AMOUNT
    #[arg(long, value_name = "AMOUNT")]
    pub threshold: Option<Decimal>,
    /// Skip unparseable rows with a warning instead of aborting
    #[arg(long = "skip-invalid")]
    pub skip_invalid: bool,
    /// Include the day-by-day spending table
    #[arg(long)]
    pub timeline: bool,
    /// Write the text report to this file instead of stdout
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: Option<PathBuf>,
    /// Write a cumulative spending chart (PDF) to this file
    #[arg(long, value_name = "PATH")]
    pub chart: Option<PathBuf>,
    /// Settings file (default: ~/.config/bookkeeper/settings.json)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Everything a run needs, with flags merged over settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub file: PathBuf,
    pub criteria: FilterCriteria,
    pub top_n: Option<i64>,
    pub policy: SuspicionPolicy,
    pub row_policy: RowPolicy,
    pub timeline: bool,
    pub output: Option<PathBuf>,
    pub chart: Option<PathBuf>,
}

impl Cli {
    pub fn resolve(self, settings: Settings) -> Result<RunConfig> {
        let criteria = FilterCriteria {
            start: self.start,
            end: self.end,
            account: self.account,
            description: self.description,
        };
        criteria.validate()?;

        let threshold = self.threshold.unwrap_or(settings.large_amount_threshold);
        if threshold < Decimal::ZERO {
            return Err(BookkeeperError::Validation(format!(
                "threshold must not be negative (got {threshold})"
            )));
        }
        if let Some(k) = settings.outlier_fence {
            if k < Decimal::ZERO {
                return Err(BookkeeperError::Validation(format!(
                    "outlier_fence must not be negative (got {k})"
                )));
            }
        }

        if cfg!(not(feature = "pdf")) && self.chart.is_some() {
            return Err(BookkeeperError::Validation(
                "--chart requires a build with the `pdf` feature".to_string(),
            ));
        }

        let row_policy = if self.skip_invalid || settings.skip_invalid_rows {
            RowPolicy::Skip
        } else {
            RowPolicy::Abort
        };

        Ok(RunConfig {
            file: self.file,
            criteria,
            top_n: self.categories.or(settings.top_categories),
            policy: SuspicionPolicy {
                large_amount_threshold: threshold,
                outlier_fence: settings.outlier_fence,
            },
            row_policy,
            timeline: self.timeline,
            output: self.output,
            chart: self.chart,
        })
    }
}
