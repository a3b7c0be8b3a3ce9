use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::model::Book;

pub const INITIAL_XP_PER_PAGE: f64 = 2.0;
pub const XP_DECAY_RATE: f64 = 0.95;
/// Flat XP for every reading session, whatever its length.
pub const SESSION_BONUS_XP: f64 = 5.0;

/// XP earned per page at `level`. Drops 5% with each level.
pub fn xp_per_page(level: u32) -> f64 {
    INITIAL_XP_PER_PAGE * XP_DECAY_RATE.powi(level as i32)
}

/// Step bonus for consecutive reading days. Lower bounds are inclusive.
pub fn streak_multiplier(streak_days: u32) -> f64 {
    if streak_days >= 30 {
        1.25
    } else if streak_days >= 14 {
        1.15
    } else if streak_days >= 7 {
        1.10
    } else if streak_days >= 3 {
        1.05
    } else {
        1.0
    }
}

/// Streak after reading on `today`, given only the previous read date and streak.
pub fn compute_new_streak(
    last_read_date: Option<NaiveDate>,
    prior_streak: u32,
    today: NaiveDate,
) -> u32 {
    match last_read_date {
        Some(last) if Some(last) == today.pred_opt() => prior_streak.saturating_add(1),
        Some(last) if last == today => prior_streak,
        _ => 1,
    }
}

/// Checks a "finished on page N" mark and returns the pages read since the
/// book's current position.
pub fn validate_page_update(book: &Book, new_page_mark: u32) -> Result<u32, ValidationError> {
    if new_page_mark < book.pages_read || new_page_mark > book.total_pages {
        return Err(ValidationError::PageOutOfRange {
            page_mark: new_page_mark,
            pages_read: book.pages_read,
            total_pages: book.total_pages,
        });
    }
    Ok(new_page_mark - book.pages_read)
}

/// [`validate_page_update`] for raw input text.
pub fn parse_page_mark(book: &Book, input: &str) -> Result<u32, ValidationError> {
    let mark = input
        .trim()
        .parse::<u32>()
        .map_err(|_| ValidationError::NotANumber {
            input: input.to_string(),
            pages_read: book.pages_read,
            total_pages: book.total_pages,
        })?;
    validate_page_update(book, mark)
}

/// Pages of `pages_delta` that fall within the book's declared length.
pub fn effective_pages(book: &Book, pages_delta: u32) -> u32 {
    book.pages_read
        .saturating_add(pages_delta)
        .min(book.total_pages)
        .saturating_sub(book.pages_read)
}

/// XP for a single logging action, before the log is recomputed.
pub fn gained_xp(book: &Book, pages_delta: u32, level: u32) -> f64 {
    let pages = effective_pages(book, pages_delta) as f64;
    (pages * xp_per_page(level) + SESSION_BONUS_XP) * streak_multiplier(book.streak)
}
