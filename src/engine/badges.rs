use std::fmt;

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelBadge {
    pub name: &'static str,
    pub unlock_level: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneBadge {
    pub days: u32,
    pub label: &'static str,
}

const fn level_badge(name: &'static str, unlock_level: u32) -> LevelBadge {
    LevelBadge { name, unlock_level }
}

pub static LEVEL_BADGES: [LevelBadge; 10] = [
    level_badge("Newbie", 0),
    level_badge("Curious Reader", 1),
    level_badge("Investigator", 2),
    level_badge("Page Turner", 3),
    level_badge("Literary Hero", 4),
    level_badge("Scholar", 5),
    level_badge("Page Sage", 6),
    level_badge("Wisdom Walker", 7),
    level_badge("Knowledge Knight", 8),
    level_badge("Book Baron", 9),
];

/// Ordered by `days`.
pub static MILESTONE_BADGES: [MilestoneBadge; 4] = [
    MilestoneBadge { days: 7, label: "📅 7-Day Streaker" },
    MilestoneBadge { days: 14, label: "🔥 Two-Week Flame" },
    MilestoneBadge { days: 21, label: "🏅 Three Weeks Strong" },
    MilestoneBadge { days: 30, label: "🎯 One-Month Master" },
];

pub fn unlocked_level_badges(level: u32) -> &'static [LevelBadge] {
    let count = (level as usize + 1).min(LEVEL_BADGES.len());
    &LEVEL_BADGES[..count]
}

pub fn reached_milestones(streak: u32) -> impl Iterator<Item = &'static MilestoneBadge> {
    MILESTONE_BADGES.iter().filter(move |m| m.days <= streak)
}

pub fn unlocked_badge_count(level: u32, streak: u32) -> usize {
    unlocked_level_badges(level).len() + reached_milestones(streak).count()
}

pub fn total_badge_count() -> usize {
    LEVEL_BADGES.len() + MILESTONE_BADGES.len()
}

pub fn remaining_badge_count(level: u32, streak: u32) -> usize {
    total_badge_count() - unlocked_badge_count(level, streak)
}

/// Label of the milestone hit exactly on this streak day, if any.
pub fn milestone_for_streak(streak: u32) -> Option<&'static str> {
    MILESTONE_BADGES
        .iter()
        .find(|m| m.days == streak)
        .map(|m| m.label)
}

/// The badge a reader should aim for next.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum NextBadge {
    Level { name: &'static str, level: u32 },
    Milestone { label: &'static str, days: u32 },
}

impl fmt::Display for NextBadge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NextBadge::Level { name, level } => write!(f, "{name} (Level {level})"),
            NextBadge::Milestone { label, days } => write!(f, "{label} ({days}-day streak)"),
        }
    }
}

/// Level badges come first; streak milestones only once every level badge is held.
pub fn next_badge_preview(level: u32, streak: u32) -> Option<NextBadge> {
    if let Some(badge) = LEVEL_BADGES.get(level as usize + 1) {
        return Some(NextBadge::Level {
            name: badge.name,
            level: badge.unlock_level,
        });
    }
    MILESTONE_BADGES
        .iter()
        .find(|m| streak < m.days)
        .map(|m| NextBadge::Milestone {
            label: m.label,
            days: m.days,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlock_level_matches_position() {
        for (i, badge) in LEVEL_BADGES.iter().enumerate() {
            assert_eq!(badge.unlock_level as usize, i);
        }
        assert!(MILESTONE_BADGES.windows(2).all(|w| w[0].days < w[1].days));
    }

    #[test]
    fn test_badge_count_level_two_no_streak() {
        assert_eq!(unlocked_badge_count(2, 0), 3);
        assert_eq!(total_badge_count(), 14);
        assert_eq!(remaining_badge_count(2, 0), 11);
    }

    #[test]
    fn test_badge_count_with_milestones() {
        assert_eq!(unlocked_badge_count(0, 7), 2);
        assert_eq!(unlocked_badge_count(0, 20), 3);
        assert_eq!(unlocked_badge_count(50, 45), 14);
        assert_eq!(remaining_badge_count(50, 45), 0);
    }

    #[test]
    fn test_milestone_for_exact_streak() {
        assert_eq!(milestone_for_streak(7), Some("📅 7-Day Streaker"));
        assert_eq!(milestone_for_streak(8), None);
        assert_eq!(milestone_for_streak(0), None);
    }

    #[test]
    fn test_next_badge_prefers_level() {
        let next = next_badge_preview(2, 10).unwrap();
        assert_eq!(
            next,
            NextBadge::Level {
                name: "Page Turner",
                level: 3
            }
        );
        assert_eq!(next.to_string(), "Page Turner (Level 3)");
    }

    #[test]
    fn test_next_badge_falls_back_to_milestone() {
        let next = next_badge_preview(9, 10).unwrap();
        assert_eq!(next.to_string(), "🔥 Two-Week Flame (14-day streak)");
        assert_eq!(
            next_badge_preview(30, 0),
            Some(NextBadge::Milestone {
                label: "📅 7-Day Streaker",
                days: 7
            })
        );
    }

    #[test]
    fn test_no_next_badge_when_all_held() {
        assert_eq!(next_badge_preview(9, 30), None);
        assert_eq!(next_badge_preview(50, 100), None);
    }
}
