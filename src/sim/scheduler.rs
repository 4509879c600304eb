//! Deferred one-shot and repeating callbacks, polled once per tick.
//!
//! Every "do X after N seconds" effect in the game goes through here: delayed
//! boss explosions, level-transition sequencing, power-up expiries, fire
//! cadences. Actions are plain data interpreted by the tick loop, so there is
//! no closure capturing simulation state and nothing can dangle. Each callback
//! carries a tag naming its origin; leaving the mode that scheduled a set of
//! callbacks cancels them by tag.

use glam::Vec2;

use super::state::PowerUpKind;
use crate::consts::*;
use crate::secs_to_ticks;

/// What to do when a callback fires. Interpreted in `tick::execute_action`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScheduledAction {
    /// A random formation enemy fires.
    EnemyVolley,
    /// The boss fires its spread.
    BossVolley,
    /// A timed power-up effect lapses.
    ExpireEffect(PowerUpKind),
    /// One staged explosion of the boss defeat sequence.
    BossExplosion { pos: Vec2 },
    /// Boss defeat sequence settled; advance the level.
    FinishBossDefeat,
    /// Level transition finished; spawn the next level.
    FinishTransition,
}

/// Origin tag for cancellation sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackTag {
    /// Session-lifetime cadence timers.
    Session,
    /// Expiry for one timed power-up kind.
    Effect(PowerUpKind),
    /// Boss encounter callbacks (fire cadence, defeat staging).
    Boss,
    /// Level-transition sequencing.
    Transition,
}

#[derive(Debug, Clone)]
struct Callback {
    seq: u64,
    fire_tick: u64,
    /// Repeat interval in ticks; `None` for one-shots.
    interval: Option<u64>,
    tag: CallbackTag,
    action: ScheduledAction,
}

/// Tick-driven callback queue. Due callbacks execute in registration order.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    callbacks: Vec<Callback>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a one-shot callback firing `delay_secs` from `now`.
    pub fn after(&mut self, now: u64, delay_secs: f32, tag: CallbackTag, action: ScheduledAction) {
        self.push(Callback {
            seq: 0,
            fire_tick: now + secs_to_ticks(delay_secs),
            interval: None,
            tag,
            action,
        });
    }

    /// Register a repeating callback, first firing one interval from `now`.
    pub fn every(
        &mut self,
        now: u64,
        interval_secs: f32,
        tag: CallbackTag,
        action: ScheduledAction,
    ) {
        let interval = secs_to_ticks(interval_secs).max(1);
        self.push(Callback {
            seq: 0,
            fire_tick: now + interval,
            interval: Some(interval),
            tag,
            action,
        });
    }

    /// Cancel every callback with the given origin tag.
    pub fn cancel(&mut self, tag: CallbackTag) {
        self.callbacks.retain(|cb| cb.tag != tag);
    }

    /// Cancel everything (restart).
    pub fn clear(&mut self) {
        self.callbacks.clear();
    }

    pub fn pending(&self) -> usize {
        self.callbacks.len()
    }

    pub fn pending_with_tag(&self, tag: CallbackTag) -> usize {
        self.callbacks.iter().filter(|cb| cb.tag == tag).count()
    }

    /// Collect every action due at `now`, in registration order. Repeating
    /// callbacks re-arm relative to `now`; one-shots are consumed.
    pub fn poll(&mut self, now: u64) -> Vec<ScheduledAction> {
        let mut due: Vec<(u64, ScheduledAction)> = Vec::new();
        self.callbacks.retain_mut(|cb| {
            if cb.fire_tick > now {
                return true;
            }
            due.push((cb.seq, cb.action));
            match cb.interval {
                Some(interval) => {
                    cb.fire_tick = now + interval;
                    true
                }
                None => false,
            }
        });
        due.sort_by_key(|&(seq, _)| seq);
        due.into_iter().map(|(_, action)| action).collect()
    }

    fn push(&mut self, mut cb: Callback) {
        if self.callbacks.len() >= MAX_PENDING_CALLBACKS {
            // Shed the oldest one-shot (oldest overall if none) instead of
            // failing the tick.
            let victim = self
                .callbacks
                .iter()
                .enumerate()
                .filter(|(_, c)| c.interval.is_none())
                .map(|(i, _)| i)
                .next()
                .unwrap_or(0);
            let dropped = self.callbacks.remove(victim);
            log::warn!(
                "scheduler full ({} pending), dropping {:?}",
                MAX_PENDING_CALLBACKS,
                dropped.action
            );
        }
        cb.seq = self.next_seq;
        self.next_seq += 1;
        self.callbacks.push(cb);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_shots_fire_once_in_registration_order() {
        let mut sched = Scheduler::new();
        sched.after(0, 0.5, CallbackTag::Transition, ScheduledAction::FinishTransition);
        sched.after(0, 0.5, CallbackTag::Boss, ScheduledAction::FinishBossDefeat);

        assert!(sched.poll(secs_to_ticks(0.4)).is_empty());
        let fired = sched.poll(secs_to_ticks(0.5));
        assert_eq!(
            fired,
            vec![
                ScheduledAction::FinishTransition,
                ScheduledAction::FinishBossDefeat
            ]
        );
        assert!(sched.poll(secs_to_ticks(10.0)).is_empty());
    }

    #[test]
    fn test_repeating_rearms() {
        let mut sched = Scheduler::new();
        sched.every(0, 1.0, CallbackTag::Session, ScheduledAction::EnemyVolley);

        let mut fired = 0;
        for now in 0..=secs_to_ticks(3.0) {
            fired += sched.poll(now).len();
        }
        assert_eq!(fired, 3);
        assert_eq!(sched.pending(), 1);
    }

    #[test]
    fn test_cancel_by_tag() {
        let mut sched = Scheduler::new();
        sched.every(0, 2.0, CallbackTag::Boss, ScheduledAction::BossVolley);
        sched.after(0, 0.1, CallbackTag::Boss, ScheduledAction::FinishBossDefeat);
        sched.after(0, 0.1, CallbackTag::Transition, ScheduledAction::FinishTransition);

        sched.cancel(CallbackTag::Boss);
        assert_eq!(sched.pending(), 1);
        let fired = sched.poll(secs_to_ticks(1.0));
        assert_eq!(fired, vec![ScheduledAction::FinishTransition]);
    }

    #[test]
    fn test_rearm_leaves_single_expiry() {
        let kind = PowerUpKind::Shield;
        let mut sched = Scheduler::new();
        sched.after(0, 10.0, CallbackTag::Effect(kind), ScheduledAction::ExpireEffect(kind));

        // Re-arm: cancel then reinstall, the way the tick loop does it.
        sched.cancel(CallbackTag::Effect(kind));
        let now = secs_to_ticks(5.0);
        sched.after(now, 10.0, CallbackTag::Effect(kind), ScheduledAction::ExpireEffect(kind));

        assert_eq!(sched.pending_with_tag(CallbackTag::Effect(kind)), 1);
        assert!(sched.poll(secs_to_ticks(12.0)).is_empty());
        assert_eq!(sched.poll(secs_to_ticks(15.0)).len(), 1);
    }

    #[test]
    fn test_cap_sheds_oldest_one_shot() {
        let mut sched = Scheduler::new();
        sched.every(0, 1.0, CallbackTag::Session, ScheduledAction::EnemyVolley);
        for _ in 0..MAX_PENDING_CALLBACKS + 4 {
            sched.after(0, 60.0, CallbackTag::Transition, ScheduledAction::FinishTransition);
        }
        assert_eq!(sched.pending(), MAX_PENDING_CALLBACKS);
        // The repeating cadence timer survives the shedding.
        assert_eq!(sched.pending_with_tag(CallbackTag::Session), 1);
    }
}
