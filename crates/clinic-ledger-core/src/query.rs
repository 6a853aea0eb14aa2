//! Filtering, sorting, and aggregation over loaded snapshots.
//!
//! Everything here is pure: functions take a snapshot slice and return a new
//! collection, never touching the store. Date comparisons rely on ISO
//! `YYYY-MM-DD` strings ordering chronologically.

use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use thiserror::Error;

use crate::models::{effective_fee, round2, VisitRecord};

/// Time window selecting which records a query considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBucket {
    Day,
    Week,
    Month,
    All,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown range bucket: {0}")]
pub struct UnknownBucket(String);

impl FromStr for RangeBucket {
    type Err = UnknownBucket;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(RangeBucket::Day),
            "week" => Ok(RangeBucket::Week),
            "month" => Ok(RangeBucket::Month),
            "all" => Ok(RangeBucket::All),
            other => Err(UnknownBucket(other.to_string())),
        }
    }
}

/// Count and fee sum over a record subset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Totals {
    pub count: usize,
    pub total_fee: f64,
}

/// Headline figures for the dashboard cards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DashboardStats {
    pub count_all: usize,
    pub fee_all: f64,
    pub count_today: usize,
    pub fee_today: f64,
    pub count_month: usize,
    pub fee_month: f64,
}

/// Records whose visit date matches `date` exactly.
pub fn filter_by_date(records: &[VisitRecord], date: &str) -> Vec<VisitRecord> {
    records
        .iter()
        .filter(|record| record.visit_date == date)
        .cloned()
        .collect()
}

/// Records within the bucket around `reference`.
///
/// `Week` is Monday-start, inclusive, with no upper bound: "this week onward
/// from Monday", so future-dated records are included. `Month` matches the
/// `YYYY-MM` prefix of `reference`.
pub fn filter_by_range(
    records: &[VisitRecord],
    bucket: RangeBucket,
    reference: NaiveDate,
) -> Vec<VisitRecord> {
    match bucket {
        RangeBucket::All => records.to_vec(),
        RangeBucket::Day => filter_by_date(records, &iso_date(reference)),
        RangeBucket::Week => {
            let monday =
                reference - Duration::days(reference.weekday().num_days_from_monday() as i64);
            let monday = iso_date(monday);
            records
                .iter()
                .filter(|record| record.visit_date.as_str() >= monday.as_str())
                .cloned()
                .collect()
        }
        RangeBucket::Month => {
            let prefix = reference.format("%Y-%m").to_string();
            records
                .iter()
                .filter(|record| record.visit_date.starts_with(&prefix))
                .cloned()
                .collect()
        }
    }
}

/// Case-sensitive substring search on the patient name.
pub fn filter_by_name(records: &[VisitRecord], query: &str) -> Vec<VisitRecord> {
    records
        .iter()
        .filter(|record| record.patient_name.contains(query))
        .cloned()
        .collect()
}

/// Composed list-view filter: a non-empty name query means "all matching
/// history" and bypasses range filtering entirely.
pub fn filter_for_view(
    records: &[VisitRecord],
    name: &str,
    bucket: RangeBucket,
    reference: NaiveDate,
) -> Vec<VisitRecord> {
    if name.is_empty() {
        filter_by_range(records, bucket, reference)
    } else {
        filter_by_name(records, name)
    }
}

/// Newest date first; among same-date records, highest id (most recently
/// created) first.
pub fn sort_for_display(mut records: Vec<VisitRecord>) -> Vec<VisitRecord> {
    records.sort_by(|a, b| (b.visit_date.as_str(), b.id).cmp(&(a.visit_date.as_str(), a.id)));
    records
}

/// Count and rounded fee sum over a subset.
pub fn aggregate(records: &[VisitRecord]) -> Totals {
    Totals {
        count: records.len(),
        total_fee: round2(records.iter().map(effective_fee).sum()),
    }
}

/// Dashboard statistics: totals over the full set, today's visits, and the
/// current month.
pub fn compute_dashboard_stats(records: &[VisitRecord], today: NaiveDate) -> DashboardStats {
    let all = aggregate(records);
    let day = aggregate(&filter_by_date(records, &iso_date(today)));
    let month = aggregate(&filter_by_range(records, RangeBucket::Month, today));

    DashboardStats {
        count_all: all.count,
        fee_all: all.total_fee,
        count_today: day.count,
        fee_today: day.total_fee,
        count_month: month.count,
        fee_month: month.total_fee,
    }
}

fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
