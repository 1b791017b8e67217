//! Terminal and CSV rendering of records and summary metrics.

use colored::Colorize;
use jiralog_api::WorklogRecord;
use std::fmt::Display;
use std::fs;
use std::io;
use std::path::Path;
use tabled::{Table, Tabled};

use crate::summary::Summary;

const CSV_HEADER: &str = "date,user,activity,issue_key,summary,hours";
const USER_BAR_SCALE: f64 = 2.0;
const USER_BAR_MAX: f64 = 40.0;

/// Output format enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid format: {}. Use 'table' or 'json'", s)),
        }
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "Activity")]
    activity: String,
    #[tabled(rename = "Issue")]
    issue_key: String,
    #[tabled(rename = "Summary")]
    summary: String,
    #[tabled(rename = "Hours")]
    hours: String,
}

impl From<&WorklogRecord> for RecordRow {
    fn from(record: &WorklogRecord) -> Self {
        Self {
            date: record.date.to_string(),
            user: record.user.clone(),
            activity: record.activity.clone(),
            issue_key: record.issue_key.clone(),
            summary: record.summary.clone(),
            hours: format!("{:.2}", record.hours),
        }
    }
}

/// Prints the record list in the requested format. An empty list is a
/// normal outcome, reported as such rather than as an error.
pub fn print_records(records: &[WorklogRecord], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => {
            if records.is_empty() {
                println!("No worklogs found.");
            } else {
                let rows: Vec<RecordRow> = records.iter().map(RecordRow::from).collect();
                println!("{}", Table::new(rows));
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(records)?);
        }
    }
    Ok(())
}

/// Prints the headline metrics and an hours-per-user text bar chart.
pub fn print_summary(summary: &Summary) {
    println!("{}", "Summary".bold());
    println!("  Total hours: {:.2}", summary.total_hours);
    println!("  Worklogs:    {}", summary.entry_count);
    println!("  Issues:      {}", summary.issue_count);

    if summary.per_user.is_empty() {
        return;
    }
    println!();
    println!("{}", "Hours per user".bold());
    for entry in &summary.per_user {
        let bar_len = (entry.hours * USER_BAR_SCALE).min(USER_BAR_MAX) as usize;
        println!(
            "  {:<24} {:>6.2}  {}",
            entry.user,
            entry.hours,
            "█".repeat(bar_len).cyan()
        );
    }
}

fn should_neutralize(value: &str) -> bool {
    let trimmed = value.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('\'') {
        return false;
    }
    matches!(
        trimmed.chars().next(),
        Some('=') | Some('+') | Some('-') | Some('@')
    )
}

fn neutralize_formula(value: &str) -> String {
    if should_neutralize(value) {
        format!("'{value}")
    } else {
        value.to_string()
    }
}

fn csv_escape(value: &str) -> String {
    let safe = neutralize_formula(value);
    if safe.contains(',') || safe.contains('"') || safe.contains('\n') || safe.contains('\r') {
        format!("\"{}\"", safe.replace('"', "\"\""))
    } else {
        safe
    }
}

/// Renders the record list as UTF-8 CSV: header row of the record field
/// names, one row per record.
pub fn records_to_csv(records: &[WorklogRecord]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(CSV_HEADER.to_string());
    for record in records {
        lines.push(
            [
                record.date.to_string(),
                csv_escape(&record.user),
                csv_escape(&record.activity),
                csv_escape(&record.issue_key),
                csv_escape(&record.summary),
                format!("{:.2}", record.hours),
            ]
            .join(","),
        );
    }
    let mut csv = lines.join("\n");
    csv.push('\n');
    csv
}

pub fn write_csv(path: &Path, records: &[WorklogRecord]) -> io::Result<()> {
    fs::write(path, records_to_csv(records))
}

#[cfg(test)]
mod tests {
    use super::{csv_escape, records_to_csv, OutputFormat};
    use chrono::NaiveDate;
    use jiralog_api::WorklogRecord;

    #[test]
    fn format_parses_known_values_only() {
        assert_eq!("table".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn escape_quotes_separators_and_quotes() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_escape("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn escape_neutralizes_spreadsheet_formulas() {
        assert_eq!(csv_escape("=SUM(A1)"), "'=SUM(A1)");
        assert_eq!(csv_escape("@cmd"), "'@cmd");
        assert_eq!(csv_escape("'already quoted"), "'already quoted");
    }

    #[test]
    fn csv_has_header_and_one_row_per_record() {
        let records = vec![WorklogRecord {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            user: "Ada Lovelace".to_string(),
            activity: "Bug".to_string(),
            issue_key: "DEV-1".to_string(),
            summary: "Fix login, again".to_string(),
            hours: 1.5,
        }];

        let csv = records_to_csv(&records);
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("date,user,activity,issue_key,summary,hours")
        );
        assert_eq!(
            lines.next(),
            Some("2024-03-01,Ada Lovelace,Bug,DEV-1,\"Fix login, again\",1.50")
        );
        assert_eq!(lines.next(), None);
        assert!(csv.ends_with('\n'));
    }
}
