//! Application state: the library of books, the current selection and the
//! prestige tier. Every log mutation goes through [`recompute_book`], so stored
//! totals never drift from the log.

use chrono::NaiveDate;

use crate::engine::calculator::{compute_new_streak, gained_xp, parse_page_mark};
use crate::engine::{level_of, recompute_book, Prestige};
use crate::error::ValidationError;
use crate::model::{Book, LogEntry, XpBaseline};
use crate::store::LogRecord;
use crate::util::{format_day, round_tenth};

/// Result of a successful "log reading" action.
#[derive(Clone, Debug, PartialEq)]
pub struct ReadingOutcome {
    /// Record to append to the log store.
    pub record: LogRecord,
    pub gained_xp: f64,
    pub prestiged: bool,
}

#[derive(Clone, Debug)]
pub struct AppState {
    books: Vec<Book>,
    selected: Option<String>,
    prestige: Prestige,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            books: Vec::new(),
            selected: None,
            prestige: Prestige::default(),
        }
    }

    /// Rebuilds the library from log store records.
    ///
    /// Records are ordered by date first (stable, so same-day records keep
    /// server order); the store itself guarantees no order. Pages and XP are
    /// summed per book, streak and last read date come from the book's final
    /// record, and same-day records merge into one log entry.
    pub fn from_records(mut records: Vec<LogRecord>, default_total_pages: u32) -> Self {
        records.sort_by_key(|r| r.date);

        let mut state = Self::new();
        for record in records {
            let idx = match state.index_of(&record.book) {
                Some(idx) => idx,
                None => {
                    state.books.push(Book::new(record.book.clone(), default_total_pages));
                    state.books.len() - 1
                }
            };
            let book = &mut state.books[idx];
            book.add_pages(record.date, record.pages);
            book.pages_read = book.pages_read.saturating_add(record.pages);
            book.xp += record.xp;
            book.streak = record.streak;
            book.last_read_date = Some(record.date);
        }

        log::info!("Hydrated {} book(s) from the log store", state.books.len());
        state.check_prestige();
        state
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn book(&self, title: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.title == title)
    }

    pub fn selected_book(&self) -> Option<&Book> {
        self.selected.as_deref().and_then(|t| self.book(t))
    }

    pub fn prestige_tier(&self) -> u32 {
        self.prestige.tier
    }

    pub fn total_xp(&self) -> f64 {
        self.books.iter().map(|b| b.xp).sum()
    }

    pub fn level(&self) -> u32 {
        level_of(self.total_xp())
    }

    fn index_of(&self, title: &str) -> Option<usize> {
        self.books.iter().position(|b| b.title == title)
    }

    fn selected_index(&self) -> Option<usize> {
        self.selected.as_deref().and_then(|t| self.index_of(t))
    }

    /// Adds a book from raw form input and selects it.
    pub fn add_book(&mut self, title: &str, total_pages: &str) -> Result<&Book, ValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.index_of(title).is_some() {
            return Err(ValidationError::DuplicateTitle(title.to_string()));
        }
        let total_pages = match total_pages.trim().parse::<u32>() {
            Ok(n) if n > 0 => n,
            _ => return Err(ValidationError::InvalidTotalPages(total_pages.to_string())),
        };

        self.books.push(Book::new(title, total_pages));
        self.selected = Some(title.to_string());
        Ok(&self.books[self.books.len() - 1])
    }

    /// Returns false, leaving the selection alone, for an unknown title.
    pub fn select_book(&mut self, title: &str) -> bool {
        if self.index_of(title).is_none() {
            return false;
        }
        self.selected = Some(title.to_string());
        true
    }

    /// Logs reading up to `page_mark` for the selected book.
    ///
    /// `Ok(None)` when nothing is selected or the mark equals the current
    /// position.
    pub fn log_reading(
        &mut self,
        page_mark: &str,
        today: NaiveDate,
    ) -> Result<Option<ReadingOutcome>, ValidationError> {
        let Some(idx) = self.selected_index() else {
            return Ok(None);
        };
        let level = self.level();
        let book = &self.books[idx];

        let delta = parse_page_mark(book, page_mark)?;
        if delta == 0 {
            return Ok(None);
        }

        let gained = gained_xp(book, delta, level);
        let incremental_streak = compute_new_streak(book.last_read_date, book.streak, today);

        let mut updated = book.clone();
        updated.add_pages(today, delta);
        let updated = recompute_book(&updated, level, today);
        if updated.streak != incremental_streak {
            log::debug!(
                "Stored streak for {:?} was stale: log says {}, last read date says {}",
                updated.title,
                updated.streak,
                incremental_streak
            );
        }

        let record = LogRecord {
            date: today,
            book: updated.title.clone(),
            pages: delta,
            xp: round_tenth(gained),
            streak: updated.streak,
        };
        log::info!(
            "{:?}: +{} page(s), +{:.1} XP, streak {}",
            updated.title,
            delta,
            gained,
            updated.streak
        );

        self.books[idx] = updated;
        let prestiged = self.check_prestige();
        Ok(Some(ReadingOutcome {
            record,
            gained_xp: gained,
            prestiged,
        }))
    }

    /// Replaces the page count of the selected book's entry on `date`.
    pub fn edit_log_entry(
        &mut self,
        date: NaiveDate,
        pages: u32,
        today: NaiveDate,
    ) -> Result<Option<&Book>, ValidationError> {
        self.mutate_log(date, today, |log, pos| log[pos].pages = pages)
    }

    /// Removes the selected book's entry on `date`.
    pub fn delete_log_entry(
        &mut self,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<Option<&Book>, ValidationError> {
        self.mutate_log(date, today, |log, pos| {
            log.remove(pos);
        })
    }

    fn mutate_log<F>(
        &mut self,
        date: NaiveDate,
        today: NaiveDate,
        change: F,
    ) -> Result<Option<&Book>, ValidationError>
    where
        F: FnOnce(&mut Vec<LogEntry>, usize),
    {
        let Some(idx) = self.selected_index() else {
            return Ok(None);
        };
        let level = self.level();
        let mut updated = self.books[idx].clone();
        let pos = updated
            .log
            .iter()
            .position(|e| e.date == date)
            .ok_or_else(|| ValidationError::UnknownLogDate(format_day(date)))?;

        change(&mut updated.log, pos);
        updated.xp_baseline.clamp_to(&updated.log);
        self.books[idx] = recompute_book(&updated, level, today);
        self.check_prestige();
        Ok(Some(&self.books[idx]))
    }

    /// Runs the prestige gate against the current total. On a crossing every
    /// book's XP drops to zero and its log so far is marked as rewarded.
    pub fn check_prestige(&mut self) -> bool {
        if !self.prestige.check(self.total_xp()) {
            return false;
        }
        for book in &mut self.books {
            book.xp = 0.0;
            book.xp_baseline = XpBaseline::covering(&book.log);
        }
        log::info!("Prestige {} reached; XP reset", self.prestige.tier);
        true
    }
}
