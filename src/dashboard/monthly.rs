// src/dashboard/monthly.rs
use chrono::Datelike;
use serde::Serialize;

use crate::model::Article;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MonthCount {
    pub month: &'static str,
    pub count: usize,
}

/// Articles per calendar month, pooled across years, January first.
/// Months without articles and undated articles are left out.
pub fn monthly_counts<'a>(articles: impl IntoIterator<Item = &'a Article>) -> Vec<MonthCount> {
    let mut buckets = [0usize; 12];
    for date in articles.into_iter().filter_map(|a| a.date) {
        buckets[date.month0() as usize] += 1;
    }
    MONTH_NAMES
        .into_iter()
        .zip(buckets)
        .filter(|(_, n)| *n > 0)
        .map(|(month, count)| MonthCount { month, count })
        .collect()
}
