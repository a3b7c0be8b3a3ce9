use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Pages read on one calendar day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(with = "crate::util::day_string")]
    pub date: NaiveDate,
    pub pages: u32,
}

impl LogEntry {
    pub fn new(date: NaiveDate, pages: u32) -> Self {
        Self { date, pages }
    }
}

/// The part of a book's log whose XP was consumed by a prestige reset, kept
/// per log date.
///
/// XP is recomputed from the log after every mutation; without this marker the
/// next recompute would hand back everything the reset took away. Each day's
/// rewarded pages never exceed that day's entry, see [`XpBaseline::clamp_to`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XpBaseline {
    pub rewarded: Vec<LogEntry>,
}

impl XpBaseline {
    /// Marks the whole of `log` as already rewarded.
    pub fn covering(log: &[LogEntry]) -> Self {
        Self {
            rewarded: log.to_vec(),
        }
    }

    fn rewarded_on(&self, date: NaiveDate) -> Option<u32> {
        self.rewarded.iter().find(|e| e.date == date).map(|e| e.pages)
    }

    /// Pages in `log` read after the reset.
    pub fn fresh_pages(&self, log: &[LogEntry]) -> u64 {
        log.iter()
            .map(|e| u64::from(e.pages.saturating_sub(self.rewarded_on(e.date).unwrap_or(0))))
            .sum()
    }

    /// Entries in `log` for days the reset did not cover.
    pub fn fresh_sessions(&self, log: &[LogEntry]) -> u64 {
        log.iter()
            .filter(|e| self.rewarded_on(e.date).is_none())
            .count() as u64
    }

    /// Drops days no longer in `log` and lowers days whose entry shrank.
    pub fn clamp_to(&mut self, log: &[LogEntry]) {
        self.rewarded.retain_mut(|r| match log.iter().find(|e| e.date == r.date) {
            Some(entry) => {
                r.pages = r.pages.min(entry.pages);
                true
            }
            None => false,
        });
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub title: String,
    pub total_pages: u32,
    pub pages_read: u32,
    pub xp: f64,
    pub streak: u32,
    pub log: Vec<LogEntry>,
    #[serde(default, with = "crate::util::day_string_opt")]
    pub last_read_date: Option<NaiveDate>,
    #[serde(default)]
    pub xp_baseline: XpBaseline,
}

impl Book {
    pub fn new(title: impl Into<String>, total_pages: u32) -> Self {
        Self {
            title: title.into(),
            total_pages,
            pages_read: 0,
            xp: 0.0,
            streak: 0,
            log: Vec::new(),
            last_read_date: None,
            xp_baseline: XpBaseline::default(),
        }
    }

    pub fn entry_on(&self, date: NaiveDate) -> Option<&LogEntry> {
        self.log.iter().find(|e| e.date == date)
    }

    pub fn pages_on(&self, date: NaiveDate) -> u32 {
        self.entry_on(date).map_or(0, |e| e.pages)
    }

    /// Sum of every logged page, independent of `total_pages`.
    pub fn logged_pages(&self) -> u64 {
        self.log.iter().map(|e| u64::from(e.pages)).sum()
    }

    /// Adds pages to the entry for `date`, creating it when the day is new.
    pub fn add_pages(&mut self, date: NaiveDate, pages: u32) {
        match self.log.iter_mut().find(|e| e.date == date) {
            Some(entry) => entry.pages = entry.pages.saturating_add(pages),
            None => self.log.push(LogEntry::new(date, pages)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    #[test]
    fn test_add_pages_merges_same_day() {
        let mut book = Book::new("Dune", 412);
        book.add_pages(day(18), 20);
        book.add_pages(day(19), 10);
        book.add_pages(day(19), 15);
        assert_eq!(book.log, vec![LogEntry::new(day(18), 20), LogEntry::new(day(19), 25)]);
        assert_eq!(book.pages_on(day(19)), 25);
        assert_eq!(book.pages_on(day(17)), 0);
        assert_eq!(book.logged_pages(), 45);
    }

    #[test]
    fn test_baseline_counts_only_fresh_reading() {
        let mut log = vec![LogEntry::new(day(1), 30), LogEntry::new(day(2), 12)];
        let baseline = XpBaseline::covering(&log);
        assert_eq!(baseline.fresh_pages(&log), 0);
        assert_eq!(baseline.fresh_sessions(&log), 0);

        log[1].pages = 20;
        log.push(LogEntry::new(day(3), 7));
        assert_eq!(baseline.fresh_pages(&log), 15);
        assert_eq!(baseline.fresh_sessions(&log), 1);
    }

    #[test]
    fn test_baseline_follows_edits_and_deletes() {
        let mut log = vec![LogEntry::new(day(1), 30), LogEntry::new(day(2), 12)];
        let mut baseline = XpBaseline::covering(&log);

        log.remove(0);
        log[0].pages = 5;
        baseline.clamp_to(&log);
        assert_eq!(baseline.rewarded, vec![LogEntry::new(day(2), 5)]);

        log[0].pages = 9;
        log.push(LogEntry::new(day(1), 4));
        assert_eq!(baseline.fresh_pages(&log), 8);
        assert_eq!(baseline.fresh_sessions(&log), 1);
    }

    #[test]
    fn test_book_serializes_for_ui() {
        let mut book = Book::new("Dune", 412);
        book.add_pages(day(19), 50);
        book.last_read_date = Some(day(19));
        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json["totalPages"], 412);
        assert_eq!(json["lastReadDate"], "Mon Oct 19 2026");
        assert_eq!(json["log"][0]["date"], "Mon Oct 19 2026");

        let back: Book = serde_json::from_value(json).unwrap();
        assert_eq!(back, book);
    }
}
