use serde::Serialize;

use crate::engine::leveling::{level_of, threshold, MAX_LEVEL};

/// True once total XP has reached the level cap's threshold.
pub fn prestige_due(total_xp: f64) -> bool {
    level_of(total_xp) == MAX_LEVEL && total_xp >= threshold(MAX_LEVEL) as f64
}

/// Prestige tier plus the edge trigger that advances it.
///
/// The gate disarms when it fires and re-arms only after total XP has been
/// observed below the cap, so holding at the cap across many checks counts
/// once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prestige {
    pub tier: u32,
    #[serde(skip)]
    armed: bool,
}

impl Default for Prestige {
    fn default() -> Self {
        Self {
            tier: 1,
            armed: true,
        }
    }
}

impl Prestige {
    /// Returns true if this observation crossed the cap; the caller then
    /// resets every book's XP.
    pub fn check(&mut self, total_xp: f64) -> bool {
        if !prestige_due(total_xp) {
            self.armed = true;
            return false;
        }
        if !self.armed {
            return false;
        }
        self.armed = false;
        self.tier += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cap() -> f64 {
        threshold(MAX_LEVEL) as f64
    }

    #[test]
    fn test_starts_at_tier_one() {
        let prestige = Prestige::default();
        assert_eq!(prestige.tier, 1);
        assert!(prestige.armed);
    }

    #[test]
    fn test_fires_at_exact_cap() {
        let mut prestige = Prestige::default();
        assert!(!prestige.check(cap() - 0.5));
        assert!(prestige.check(cap()));
        assert_eq!(prestige.tier, 2);
    }

    #[test]
    fn test_fires_once_per_crossing() {
        let mut prestige = Prestige::default();
        assert!(prestige.check(cap() + 10.0));
        assert!(!prestige.check(cap() + 10.0));
        assert!(!prestige.check(cap() + 500.0));
        assert_eq!(prestige.tier, 2);

        assert!(!prestige.check(0.0));
        assert!(prestige.check(cap()));
        assert_eq!(prestige.tier, 3);
    }
}
