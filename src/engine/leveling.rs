use std::sync::OnceLock;

pub const MAX_LEVEL: u32 = 50;
pub const LEVEL_COUNT: usize = MAX_LEVEL as usize + 1;

const BASE_LEVEL_XP: f64 = 100.0;
const LEVEL_GROWTH: f64 = 1.15;

/// Pages-per-day goal by level; levels past the table keep the last goal.
const LEVEL_GOALS: [u32; 11] = [10, 12, 14, 16, 18, 20, 22, 24, 26, 28, 30];

/// Cumulative XP needed to reach each level. Each step is 15% larger than the last.
pub fn build_level_thresholds() -> [u64; LEVEL_COUNT] {
    let mut thresholds = [0u64; LEVEL_COUNT];
    for level in 1..LEVEL_COUNT {
        let step = BASE_LEVEL_XP * LEVEL_GROWTH.powf((level - 1) as f64);
        thresholds[level] = (thresholds[level - 1] as f64 + step).floor() as u64;
    }
    thresholds
}

pub fn level_thresholds() -> &'static [u64; LEVEL_COUNT] {
    static THRESHOLDS: OnceLock<[u64; LEVEL_COUNT]> = OnceLock::new();
    THRESHOLDS.get_or_init(build_level_thresholds)
}

/// XP at which `level` starts. Levels above the cap read as the cap.
pub fn threshold(level: u32) -> u64 {
    level_thresholds()[level.min(MAX_LEVEL) as usize]
}

/// XP at which the level after `level` starts, or `None` at the cap.
pub fn next_level_xp(level: u32) -> Option<u64> {
    level_thresholds().get(level as usize + 1).copied()
}

/// Largest level whose threshold `total_xp` has reached.
pub fn level_of(total_xp: f64) -> u32 {
    level_thresholds()
        .iter()
        .rposition(|&t| total_xp >= t as f64)
        .map_or(0, |i| i as u32)
}

/// Percentage of the way from `level` to the next one.
///
/// Not clamped: XP and level are passed separately and an inconsistent pair
/// yields a ratio outside 0..=100. Always 0 at the cap.
pub fn progress_percent(total_xp: f64, level: u32) -> f64 {
    match next_level_xp(level) {
        Some(next) => {
            let current = threshold(level) as f64;
            (total_xp - current) / (next as f64 - current) * 100.0
        }
        None => 0.0,
    }
}

/// [`progress_percent`] clamped for a progress bar.
pub fn display_progress(total_xp: f64, level: u32) -> f64 {
    let raw = progress_percent(total_xp, level);
    if raw.is_nan() {
        0.0
    } else {
        raw.clamp(0.0, 100.0)
    }
}

pub fn daily_goal(level: u32) -> u32 {
    LEVEL_GOALS
        .get(level as usize)
        .copied()
        .unwrap_or(LEVEL_GOALS[LEVEL_GOALS.len() - 1])
}
