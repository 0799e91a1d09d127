use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};
use rust_decimal::Decimal;

use crate::filter::FilterCriteria;
use crate::fmt::money;
use crate::models::{
    Advice, CashFlowSummary, CategoryTotal, SeriesPoint, SuspiciousTransaction, WeekdayTotal,
};

fn amount_cell(amount: Decimal) -> Cell {
    let s = if amount < Decimal::ZERO {
        money(amount).red().to_string()
    } else {
        money(amount).green().to_string()
    };
    Cell::new(s).set_alignment(CellAlignment::Right)
}

fn right(s: impl ToString) -> Cell {
    Cell::new(s.to_string()).set_alignment(CellAlignment::Right)
}

pub fn format_header(
    file: &str,
    loaded: usize,
    skipped: usize,
    matched: usize,
    criteria: &FilterCriteria,
) -> String {
    let mut out = format!("Financial Summary: {file}\n");
    out.push_str(&format!("Transactions: {loaded} loaded, {matched} matched"));
    if skipped > 0 {
        out.push_str(&format!(", {skipped} skipped"));
    }
    out.push('\n');
    if criteria.is_empty() {
        out.push_str("Filters: none");
        return out;
    }

    let mut filters = Vec::new();
    if let Some(start) = criteria.start {
        filters.push(format!("from {}", start.format("%m-%d-%Y")));
    }
    if let Some(end) = criteria.end {
        filters.push(format!("to {}", end.format("%m-%d-%Y")));
    }
    if let Some(account) = &criteria.account {
        filters.push(format!("account = {account}"));
    }
    if let Some(desc) = &criteria.description {
        filters.push(format!("description contains \"{desc}\""));
    }
    out.push_str(&format!("Filters: {}", filters.join(", ")));
    out
}

pub fn format_categories(categories: &[CategoryTotal], shown_of: usize, total: Decimal) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Category", "Total", "Count"]);
    for c in categories {
        table.add_row(vec![
            Cell::new(&c.name),
            amount_cell(c.total),
            right(c.count),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total (all categories)".bold()),
        amount_cell(total),
        Cell::new(""),
    ]);

    let title = if categories.len() < shown_of {
        format!("Top {} of {shown_of} Categories", categories.len())
    } else {
        "Spending by Category".to_string()
    };
    format!("{title}\n{table}")
}

pub fn format_suspicious(rows: &[SuspiciousTransaction<'_>]) -> String {
    if rows.is_empty() {
        return "No suspicious transactions.".to_string();
    }

    let mut table = Table::new();
    table.set_header(vec!["Date", "Description", "Amount", "Account", "Reason"]);
    for r in rows {
        let t = r.transaction;
        table.add_row(vec![
            Cell::new(t.date.format("%m-%d-%Y")),
            Cell::new(&t.description),
            amount_cell(t.amount),
            Cell::new(&t.account),
            Cell::new(r.reason.code().yellow()),
        ]);
    }
    format!("Suspicious Transactions ({})\n{table}", rows.len())
}

pub fn format_cash_flow(summary: &CashFlowSummary) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Item", "Amount"]);
    table.add_row(vec![Cell::new("Income"), right(money(summary.income))]);
    table.add_row(vec![Cell::new("Spending"), right(money(summary.spending))]);
    let net_label = if summary.net >= Decimal::ZERO {
        "NET".green().bold()
    } else {
        "NET".red().bold()
    };
    table.add_row(vec![Cell::new(net_label), amount_cell(summary.net)]);

    let advice = match summary.advice {
        Advice::Save => format!(
            "Spending exceeds income by {}. Consider cutting back and building savings.",
            money(summary.spending - summary.income)
        )
        .red()
        .to_string(),
        Advice::Invest => format!(
            "Income covers spending with {} left over. Consider investing the surplus.",
            money(summary.net)
        )
        .green()
        .to_string(),
    };
    format!("Cash Flow\n{table}\n{advice}")
}

pub fn format_weekdays(days: &[WeekdayTotal]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Day", "Spending", "Count"]);
    for d in days {
        table.add_row(vec![
            Cell::new(d.weekday),
            right(money(d.total)),
            right(d.count),
        ]);
    }
    format!("Spending by Day of Week\n{table}")
}

pub fn format_timeline(series: &[SeriesPoint]) -> String {
    if series.is_empty() {
        return "No activity to chart.".to_string();
    }

    let mut table = Table::new();
    table.set_header(vec!["Date", "Day Total", "Cumulative"]);
    for p in series {
        table.add_row(vec![
            Cell::new(p.date.format("%m-%d-%Y")),
            amount_cell(p.daily_total),
            amount_cell(p.cumulative),
        ]);
    }
    format!("Spending Over Time\n{table}")
}
