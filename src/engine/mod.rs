//! Scoring engine: turns dated page counts into XP, levels, streaks and badges.
//!
//! Everything here is pure. `today` is always passed in so results do not depend
//! on the wall clock.

pub mod aggregator;
pub mod badges;
pub mod calculator;
pub mod leveling;
pub mod prestige;

pub use aggregator::{recompute_book, trailing_streak};
pub use badges::{next_badge_preview, unlocked_badge_count, NextBadge};
pub use calculator::{
    compute_new_streak, gained_xp, streak_multiplier, validate_page_update, xp_per_page,
};
pub use leveling::{level_of, progress_percent, MAX_LEVEL};
pub use prestige::Prestige;
