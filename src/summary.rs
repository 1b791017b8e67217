//! Aggregation of normalized records into the report metrics.

use jiralog_api::WorklogRecord;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

pub struct UserHours {
    pub user: String,
    pub hours: f64,
}

/// Headline metrics over one record set: total hours, worklog count,
/// distinct issue count and hours per user sorted descending.
pub struct Summary {
    pub total_hours: f64,
    pub entry_count: usize,
    pub issue_count: usize,
    pub per_user: Vec<UserHours>,
}

pub fn summarize(records: &[WorklogRecord]) -> Summary {
    let mut by_user: HashMap<&str, f64> = HashMap::new();
    let mut issues: HashSet<&str> = HashSet::new();
    let mut total = 0.0;

    for record in records {
        total += record.hours;
        *by_user.entry(record.user.as_str()).or_insert(0.0) += record.hours;
        issues.insert(record.issue_key.as_str());
    }

    let mut per_user: Vec<UserHours> = by_user
        .into_iter()
        .map(|(user, hours)| UserHours {
            user: user.to_string(),
            hours: round2(hours),
        })
        .collect();
    per_user.sort_by(|a, b| {
        b.hours
            .partial_cmp(&a.hours)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.user.cmp(&b.user))
    });

    Summary {
        total_hours: round2(total),
        entry_count: records.len(),
        issue_count: issues.len(),
        per_user,
    }
}

pub fn filter_by_user(records: Vec<WorklogRecord>, user: &str) -> Vec<WorklogRecord> {
    records
        .into_iter()
        .filter(|record| record.user == user)
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::{filter_by_user, summarize};
    use chrono::NaiveDate;
    use jiralog_api::WorklogRecord;

    fn record(user: &str, issue_key: &str, hours: f64) -> WorklogRecord {
        WorklogRecord {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            user: user.to_string(),
            activity: "Task".to_string(),
            issue_key: issue_key.to_string(),
            summary: String::new(),
            hours,
        }
    }

    #[test]
    fn summarize_computes_headline_metrics() {
        let records = vec![
            record("Ada", "DEV-1", 2.0),
            record("Ada", "DEV-2", 0.5),
            record("Grace", "DEV-1", 1.0),
        ];

        let summary = summarize(&records);
        assert_eq!(summary.total_hours, 3.5);
        assert_eq!(summary.entry_count, 3);
        assert_eq!(summary.issue_count, 2);
        assert_eq!(summary.per_user.len(), 2);
        assert_eq!(summary.per_user[0].user, "Ada");
        assert_eq!(summary.per_user[0].hours, 2.5);
        assert_eq!(summary.per_user[1].user, "Grace");
    }

    #[test]
    fn summarize_of_empty_set_is_zeroed() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_hours, 0.0);
        assert_eq!(summary.entry_count, 0);
        assert_eq!(summary.issue_count, 0);
        assert!(summary.per_user.is_empty());
    }

    #[test]
    fn equal_hours_are_ordered_by_name() {
        let records = vec![record("Grace", "DEV-1", 1.0), record("Ada", "DEV-2", 1.0)];
        let summary = summarize(&records);
        assert_eq!(summary.per_user[0].user, "Ada");
        assert_eq!(summary.per_user[1].user, "Grace");
    }

    #[test]
    fn filter_keeps_only_matching_user() {
        let records = vec![
            record("Ada", "DEV-1", 2.0),
            record("Grace", "DEV-1", 1.0),
        ];
        let filtered = filter_by_user(records, "Grace");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].user, "Grace");
    }
}
