//! Reading statistics shown next to the XP bar.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::{Book, LogEntry};
use crate::util::days_before;

/// Days covered by the streak calendar and the monthly review, today included.
pub const REVIEW_WINDOW_DAYS: u64 = 30;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookInsights {
    pub total_pages_logged: u64,
    /// Per log entry, i.e. per day the book was read.
    pub avg_pages_per_day: f64,
    pub completion_percent: f64,
    pub pages_remaining: u32,
}

pub fn book_insights(book: &Book) -> BookInsights {
    let total = book.logged_pages();
    let avg_pages_per_day = if book.log.is_empty() {
        0.0
    } else {
        total as f64 / book.log.len() as f64
    };
    let completion_percent = if book.total_pages == 0 {
        0.0
    } else {
        book.pages_read as f64 / book.total_pages as f64 * 100.0
    };
    BookInsights {
        total_pages_logged: total,
        avg_pages_per_day,
        completion_percent,
        pages_remaining: book.total_pages.saturating_sub(book.pages_read),
    }
}

/// Longest current streak across the library.
pub fn global_streak(books: &[Book]) -> u32 {
    books.iter().map(|b| b.streak).max().unwrap_or(0)
}

pub fn remaining_today(book: &Book, daily_goal: u32, today: NaiveDate) -> u32 {
    daily_goal.saturating_sub(book.pages_on(today))
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    #[serde(with = "crate::util::day_string")]
    pub date: NaiveDate,
    pub pages: u64,
    pub read: bool,
}

fn pages_on(books: &[Book], date: NaiveDate) -> u64 {
    books
        .iter()
        .filter_map(|b| b.entry_on(date))
        .map(|e| u64::from(e.pages))
        .sum()
}

/// The last [`REVIEW_WINDOW_DAYS`] days, today first.
pub fn streak_calendar(books: &[Book], today: NaiveDate) -> Vec<CalendarDay> {
    (0..REVIEW_WINDOW_DAYS)
        .map(|offset| {
            let date = days_before(today, offset);
            let has_entry = books.iter().any(|b| b.entry_on(date).is_some());
            CalendarDay {
                date,
                pages: pages_on(books, date),
                read: has_entry,
            }
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReview {
    pub pages_read: u64,
    pub days_read: u32,
    pub avg_pages_per_day: f64,
    pub missed_days: u32,
}

fn entries_between(
    books: &[Book],
    start: NaiveDate,
    end: NaiveDate,
) -> impl Iterator<Item = &LogEntry> {
    books
        .iter()
        .flat_map(|b| b.log.iter())
        .filter(move |e| e.date >= start && e.date <= end)
}

/// Library-wide totals over the last [`REVIEW_WINDOW_DAYS`] days.
///
/// An empty window reports zero missed days rather than thirty.
pub fn monthly_review(books: &[Book], today: NaiveDate) -> MonthlyReview {
    let start = days_before(today, REVIEW_WINDOW_DAYS - 1);
    let pages_read: u64 = entries_between(books, start, today)
        .map(|e| u64::from(e.pages))
        .sum();
    let days: BTreeSet<NaiveDate> = entries_between(books, start, today)
        .map(|e| e.date)
        .collect();
    let days_read = days.len() as u32;

    if days.is_empty() {
        return MonthlyReview {
            pages_read: 0,
            days_read: 0,
            avg_pages_per_day: 0.0,
            missed_days: 0,
        };
    }

    MonthlyReview {
        pages_read,
        days_read,
        avg_pages_per_day: pages_read as f64 / days_read as f64,
        missed_days: (REVIEW_WINDOW_DAYS as u32).saturating_sub(days_read),
    }
}
