use std::io::IsTerminal;
use std::path::Path;

use crate::cli::{text, Cli, RunConfig};
use crate::error::Result;
use crate::importer::{load_transactions, LoadResult};
use crate::models::{SeriesPoint, Transaction};
use crate::reports;
use crate::settings::load_settings;

pub fn run(cli: Cli) -> Result<()> {
    let settings = load_settings(cli.config.as_deref())?;
    let config = cli.resolve(settings)?;
    execute(&config)
}

pub fn execute(config: &RunConfig) -> Result<()> {
    let loaded = load_transactions(&config.file, config.row_policy)?;
    tracing::info!(
        loaded = loaded.transactions.len(),
        skipped = loaded.skipped,
        layout = loaded.layout.name(),
        "parsed transaction file"
    );

    let matched = config.criteria.apply(&loaded.transactions);
    tracing::info!(matched = matched.len(), "applied filters");

    if config.output.is_some() || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let series = reports::spending_over_time(&matched);
    let report = build_report(config, &loaded, &matched, &series);

    if let Some(path) = &config.output {
        write_file(path, report.as_bytes())?;
    } else {
        println!("{report}");
    }

    if let Some(path) = &config.chart {
        let title = format!("Cumulative Spending: {}", file_label(&config.file));
        write_chart(path, &series, &title)?;
    }
    Ok(())
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// The full text report for the matched transactions.
pub fn build_report(
    config: &RunConfig,
    loaded: &LoadResult,
    matched: &[&Transaction],
    series: &[SeriesPoint],
) -> String {
    let header = text::format_header(
        &file_label(&config.file),
        loaded.transactions.len(),
        loaded.skipped,
        matched.len(),
        &config.criteria,
    );
    if matched.is_empty() {
        return format!("{header}\n\nNo transactions match the given filters.");
    }

    let summary = reports::category_totals(matched);
    let suspicious = reports::detect_suspicious(matched, &config.policy);
    tracing::info!(flagged = suspicious.len(), "flagged suspicious transactions");

    let mut sections = vec![
        header,
        text::format_categories(
            summary.top(config.top_n),
            summary.categories.len(),
            summary.total,
        ),
        text::format_suspicious(&suspicious),
        text::format_cash_flow(&reports::cash_flow(matched)),
        text::format_weekdays(&reports::weekday_spending(matched)),
    ];
    if config.timeline {
        sections.push(text::format_timeline(series));
    }
    sections.join("\n\n")
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    println!("Wrote {}", path.display());
    Ok(())
}

#[cfg(feature = "pdf")]
fn write_chart(path: &Path, series: &[SeriesPoint], title: &str) -> Result<()> {
    let bytes = crate::pdf::render_spending_chart(series, title)?;
    write_file(path, &bytes)
}

#[cfg(not(feature = "pdf"))]
fn write_chart(_path: &Path, _series: &[SeriesPoint], _title: &str) -> Result<()> {
    Err(crate::error::BookkeeperError::Validation(
        "--chart requires a build with the `pdf` feature".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterCriteria;
    use crate::importer::{read_transactions, RowPolicy};
    use crate::reports::SuspicionPolicy;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    const SAMPLE: &str = "\
Date,Amount,Category,Account,Description
01-04-2021,-50.00,Groceries,Checking,Market
01-05-2021,-50.00,Groceries,Checking,Market
01-05-2021,-50.00,Groceries,Checking,Market
01-06-2021,2400.00,Income,Checking,Payroll
01-09-2021,-18.75,Dining,Discover,Cafe
02-01-2021,-1200.00,Rent,Checking,Landlord
";

    fn config(criteria: FilterCriteria) -> RunConfig {
        RunConfig {
            file: PathBuf::from("transactions.csv"),
            criteria,
            top_n: None,
            policy: SuspicionPolicy::default(),
            row_policy: RowPolicy::Abort,
            timeline: false,
            output: None,
            chart: None,
        }
    }

    fn report_for(config: &RunConfig) -> String {
        colored::control::set_override(false);
        let loaded = read_transactions(SAMPLE.as_bytes(), config.row_policy).unwrap();
        let matched = config.criteria.apply(&loaded.transactions);
        let series = reports::spending_over_time(&matched);
        build_report(config, &loaded, &matched, &series)
    }

    #[test]
    fn test_full_report_sections() {
        let out = report_for(&config(FilterCriteria::default()));
        assert!(out.contains("6 loaded, 6 matched"));
        assert!(out.contains("Spending by Category"));
        // Payroll and rent are large, the second 01-05 market charge repeats,
        // and rent also sits above the debit fence.
        assert!(out.contains("Suspicious Transactions (4)"));
        assert!(out.contains("DUPLICATE"));
        assert!(out.contains("LARGE_AMOUNT"));
        assert!(out.contains("OUTLIER"));
        assert!(out.contains("Cash Flow"));
        assert!(out.contains("Spending by Day of Week"));
        assert!(!out.contains("Spending Over Time"));
    }

    #[test]
    fn test_empty_range_report() {
        let criteria = FilterCriteria {
            start: NaiveDate::from_ymd_opt(2021, 3, 1),
            end: NaiveDate::from_ymd_opt(2021, 3, 31),
            ..Default::default()
        };
        let out = report_for(&config(criteria));
        assert!(out.contains("0 matched"));
        assert!(out.ends_with("No transactions match the given filters."));
    }

    #[test]
    fn test_top_n_and_timeline() {
        let mut cfg = config(FilterCriteria {
            account: Some("Checking".to_string()),
            ..Default::default()
        });
        cfg.top_n = Some(1);
        cfg.timeline = true;
        let out = report_for(&cfg);
        assert!(out.contains("Top 1 of 3 Categories"));
        assert!(out.contains("Income"));
        assert!(!out.contains("Cafe"));
        assert!(out.contains("Spending Over Time"));
    }

    #[test]
    fn test_execute_writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("transactions.csv");
        std::fs::write(&input, SAMPLE).unwrap();
        let mut cfg = config(FilterCriteria::default());
        cfg.file = input;
        cfg.output = Some(dir.path().join("reports").join("summary.txt"));
        execute(&cfg).unwrap();
        let written = std::fs::read_to_string(dir.path().join("reports").join("summary.txt")).unwrap();
        assert!(written.starts_with("Financial Summary: transactions.csv"));
        assert!(!written.contains('\u{1b}'));
    }
}
