use chrono::NaiveDate;
use serde::Serialize;

use crate::engine::badges::{self, NextBadge};
use crate::engine::leveling::{daily_goal, display_progress, next_level_xp, progress_percent, threshold};
use crate::model::Book;
use crate::state::AppState;
use crate::stats::{self, BookInsights, CalendarDay, MonthlyReview};

/// Everything the UI renders, computed from one state snapshot.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub prestige: u32,
    pub level: u32,
    pub total_xp: f64,
    pub current_level_xp: u64,
    pub next_level_xp: Option<u64>,
    /// Raw ratio, may leave 0..=100.
    pub progress_percent: f64,
    pub display_progress: f64,
    pub books: Vec<String>,
    pub selected: Option<SelectedBook>,
    pub daily_goal: u32,
    pub global_streak: u32,
    /// Milestone label when the global streak sits exactly on one.
    pub milestone_badge: Option<&'static str>,
    pub badges: BadgeSummary,
    pub calendar: Vec<CalendarDay>,
    pub monthly_review: MonthlyReview,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedBook {
    pub book: Book,
    pub remaining_today: u32,
    pub insights: BookInsights,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeSummary {
    pub unlocked: Vec<&'static str>,
    pub unlocked_count: usize,
    pub total_count: usize,
    pub remaining_count: usize,
    pub next: Option<NextBadge>,
    pub next_label: Option<String>,
}

impl BadgeSummary {
    /// The badge shelf and the next-badge hint follow `global_streak`; the
    /// unlocked/remaining counter follows `book_streak`.
    pub fn evaluate(level: u32, book_streak: u32, global_streak: u32) -> Self {
        let unlocked = badges::unlocked_level_badges(level)
            .iter()
            .map(|b| b.name)
            .chain(badges::reached_milestones(global_streak).map(|m| m.label))
            .collect();
        let next = badges::next_badge_preview(level, global_streak);
        Self {
            unlocked,
            unlocked_count: badges::unlocked_badge_count(level, book_streak),
            total_count: badges::total_badge_count(),
            remaining_count: badges::remaining_badge_count(level, book_streak),
            next_label: next.as_ref().map(ToString::to_string),
            next,
        }
    }
}

impl Dashboard {
    pub fn build(state: &AppState, today: NaiveDate) -> Self {
        let total_xp = state.total_xp();
        let level = state.level();
        let goal = daily_goal(level);
        let global_streak = stats::global_streak(state.books());

        // The counter follows the book on screen; with nothing selected, the best streak.
        let book_streak = state
            .selected_book()
            .map_or(global_streak, |b| b.streak);

        Dashboard {
            prestige: state.prestige_tier(),
            level,
            total_xp,
            current_level_xp: threshold(level),
            next_level_xp: next_level_xp(level),
            progress_percent: progress_percent(total_xp, level),
            display_progress: display_progress(total_xp, level),
            books: state.books().iter().map(|b| b.title.clone()).collect(),
            selected: state.selected_book().map(|book| SelectedBook {
                remaining_today: stats::remaining_today(book, goal, today),
                insights: stats::book_insights(book),
                book: book.clone(),
            }),
            daily_goal: goal,
            global_streak,
            milestone_badge: badges::milestone_for_streak(global_streak),
            badges: BadgeSummary::evaluate(level, book_streak, global_streak),
            calendar: stats::streak_calendar(state.books(), today),
            monthly_review: stats::monthly_review(state.books(), today),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::days_before;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn test_empty_library() {
        let dashboard = Dashboard::build(&AppState::new(), today());
        assert_eq!(dashboard.prestige, 1);
        assert_eq!(dashboard.level, 0);
        assert_eq!(dashboard.next_level_xp, Some(100));
        assert_eq!(dashboard.daily_goal, 10);
        assert!(dashboard.selected.is_none());
        assert_eq!(dashboard.badges.unlocked, vec!["Newbie"]);
        assert_eq!(dashboard.badges.unlocked_count, 1);
        assert_eq!(dashboard.badges.next_label.as_deref(), Some("Curious Reader (Level 1)"));
        assert_eq!(dashboard.calendar.len(), 30);
    }

    #[test]
    fn test_after_first_session() {
        let mut state = AppState::new();
        state.add_book("Dune", "300").unwrap();
        state.log_reading("50", today()).unwrap();

        let dashboard = Dashboard::build(&state, today());
        assert_eq!(dashboard.level, 1);
        assert_eq!(dashboard.total_xp, 105.0);
        assert_eq!(dashboard.current_level_xp, 100);
        assert_eq!(dashboard.next_level_xp, Some(215));
        assert_eq!(dashboard.daily_goal, 12);

        let selected = dashboard.selected.unwrap();
        assert_eq!(selected.book.title, "Dune");
        assert_eq!(selected.remaining_today, 0);
        assert_eq!(selected.insights.pages_remaining, 250);
        assert_eq!(dashboard.global_streak, 1);
        assert_eq!(dashboard.milestone_badge, None);
        assert_eq!(dashboard.badges.unlocked_count, 2);
        assert_eq!(dashboard.monthly_review.pages_read, 50);
    }

    #[test]
    fn test_week_streak_shows_milestone() {
        let mut state = AppState::new();
        state.add_book("Dune", "300").unwrap();
        for ago in (0..7u64).rev() {
            let mark = (7 - ago) * 5;
            state.log_reading(&mark.to_string(), days_before(today(), ago)).unwrap();
        }

        let dashboard = Dashboard::build(&state, today());
        assert_eq!(dashboard.global_streak, 7);
        assert_eq!(dashboard.milestone_badge, Some("📅 7-Day Streaker"));
        assert!(dashboard.badges.unlocked.contains(&"📅 7-Day Streaker"));
    }

    #[test]
    fn test_counter_follows_selected_book() {
        let mut state = AppState::new();
        state.add_book("Dune", "300").unwrap();
        for ago in (0..7u64).rev() {
            let mark = (7 - ago) * 5;
            state.log_reading(&mark.to_string(), days_before(today(), ago)).unwrap();
        }
        state.add_book("Emma", "200").unwrap();

        let dashboard = Dashboard::build(&state, today());
        assert_eq!(dashboard.global_streak, 7);
        // Emma has no streak, so the counter holds level badges only.
        assert_eq!(
            dashboard.badges.unlocked_count,
            badges::unlocked_badge_count(dashboard.level, 0)
        );
        assert!(dashboard.badges.unlocked.contains(&"📅 7-Day Streaker"));
        assert!(matches!(
            dashboard.badges.next,
            Some(NextBadge::Level { .. })
        ));
    }

    #[test]
    fn test_badge_shelf_uses_global_streak() {
        let summary = BadgeSummary::evaluate(9, 0, 10);
        assert_eq!(summary.unlocked_count, 10);
        assert!(summary.unlocked.contains(&"📅 7-Day Streaker"));
        assert_eq!(
            summary.next_label.as_deref(),
            Some("🔥 Two-Week Flame (14-day streak)")
        );
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(Dashboard::build(&AppState::new(), today())).unwrap();
        assert!(json.get("totalXp").is_some());
        assert!(json.get("monthlyReview").is_some());
        assert_eq!(json["badges"]["totalCount"], 14);
    }
}
