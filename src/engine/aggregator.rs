use chrono::NaiveDate;

use crate::engine::calculator::{streak_multiplier, xp_per_page, SESSION_BONUS_XP};
use crate::model::{Book, LogEntry};

/// Consecutive reading days ending on `today`.
///
/// Walks the log newest-first expecting `today`, `today - 1`, ... and stops at
/// the first entry that breaks the run, so a log last touched yesterday has a
/// streak of 0.
pub fn trailing_streak(log: &[LogEntry], today: NaiveDate) -> u32 {
    let mut dates: Vec<NaiveDate> = log.iter().map(|e| e.date).collect();
    dates.sort_unstable();

    let mut streak = 0;
    let mut expected = Some(today);
    for date in dates.iter().rev() {
        if Some(*date) != expected {
            break;
        }
        streak += 1;
        expected = date.pred_opt();
    }
    streak
}

/// Rebuilds a book's derived fields from its log.
///
/// `reference_level` is the level implied by total XP before the change; XP
/// is not iterated to a fixed point. Pages are summed as logged, without
/// clamping to `total_pages`.
pub fn recompute_book(book: &Book, reference_level: u32, today: NaiveDate) -> Book {
    let logged = book.logged_pages();
    let streak = trailing_streak(&book.log, today);

    let rewarded_pages = book.xp_baseline.fresh_pages(&book.log) as f64;
    let rewarded_sessions = book.xp_baseline.fresh_sessions(&book.log) as f64;
    let xp = (rewarded_pages * xp_per_page(reference_level) + rewarded_sessions * SESSION_BONUS_XP)
        * streak_multiplier(streak);

    Book {
        pages_read: u32::try_from(logged).unwrap_or(u32::MAX),
        xp,
        streak,
        last_read_date: book.log.iter().map(|e| e.date).max(),
        ..book.clone()
    }
}
