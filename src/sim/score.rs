//! Kill-streak combo scoring with time decay.

use crate::consts::*;
use crate::secs_to_ticks;

/// Tracks the current kill streak. Kills landing within the combo window of
/// the previous kill grow the streak; the streak value multiplies the base
/// kill score. An idle window resets the displayed streak to zero without
/// touching banked score.
#[derive(Debug, Clone, Default)]
pub struct ComboTracker {
    streak: u32,
    last_kill_tick: u64,
}

impl ComboTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a kill at `now` and return the points it awards.
    pub fn register_kill(&mut self, now: u64) -> u64 {
        let window = secs_to_ticks(COMBO_WINDOW);
        if self.streak > 0 && now.saturating_sub(self.last_kill_tick) < window {
            self.streak += 1;
        } else {
            self.streak = 1;
        }
        self.last_kill_tick = now;
        KILL_SCORE * u64::from(self.streak)
    }

    /// Decay pass, called once per tick.
    pub fn update(&mut self, now: u64) {
        if self.streak > 0 && now.saturating_sub(self.last_kill_tick) > secs_to_ticks(COMBO_WINDOW) {
            self.streak = 0;
        }
    }

    /// Current streak value (0 when idle), for the HUD.
    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn reset(&mut self) {
        self.streak = 0;
        self.last_kill_tick = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chained_kills_multiply() {
        let mut combo = ComboTracker::new();
        let step = secs_to_ticks(0.5);
        let mut total = 0;
        for i in 0..3 {
            total += combo.register_kill(1 + i * step);
        }
        // 10 + 20 + 30
        assert_eq!(total, 60);
        assert_eq!(combo.streak(), 3);
    }

    #[test]
    fn test_streak_resets_outside_window() {
        let mut combo = ComboTracker::new();
        let first = combo.register_kill(1);
        let second = combo.register_kill(1 + secs_to_ticks(3.0));
        assert_eq!(first, 10);
        assert_eq!(second, 10);
        assert_eq!(combo.streak(), 1);
    }

    #[test]
    fn test_display_streak_decays_to_zero() {
        let mut combo = ComboTracker::new();
        combo.register_kill(1);
        combo.update(1 + secs_to_ticks(1.0));
        assert_eq!(combo.streak(), 1);
        combo.update(1 + secs_to_ticks(2.5));
        assert_eq!(combo.streak(), 0);
    }
}
