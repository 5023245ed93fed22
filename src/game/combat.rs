//! Attack timing shared by the player and golem state machines.
//!
//! An attack runs a repeating short-period counter; one configured frame of
//! that counter is the damage frame, where damage is applied exactly once
//! per cycle. The counter advances on the simulation loop's own delta-time
//! accumulation rather than a wall-clock timer, so damage timing stays in
//! step with the rest of the tick even when frame times vary.

use std::collections::VecDeque;

/// Period of the attack frame counter.
pub const ATTACK_TICK_PERIOD: f32 = 0.05;

/// Tolerance for the accumulator drain. Summing f32 deltas leaves residues
/// just under the period at exact multiples, which would count a frame one
/// period late.
const PERIOD_EPSILON: f32 = 1e-6;

/// HP-changed notification emitted whenever damage is applied.
///
/// Consumed by overlay listeners such as the health bar; the simulation only
/// queues these.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HpEvent {
    pub max_hp: f32,
    pub current_hp: f32,
}

/// Queue of HP events owned by the simulation context.
pub type HpEvents = VecDeque<HpEvent>;

/// The repeating tick counter behind one actor's attack state.
///
/// The legitimate exit from an attack is the `"attack"` animation-finished
/// signal, delivered by the animation subsystem and answered with
/// [`AttackCycle::finish`]. The timeout passed to [`AttackCycle::start`] is
/// a defensive guard for the case where that signal can never arrive (an
/// actor whose attack clip failed to load plays nothing, so nothing
/// finishes); without it the actor would be stuck attacking forever.
#[derive(Debug, Clone)]
pub struct AttackCycle {
    damage_frame: u32,
    frame_counter: u32,
    accumulator: f32,
    elapsed: f32,
    timeout: f32,
    running: bool,
    damage_applied: bool,
}

impl AttackCycle {
    pub fn new(damage_frame: u32) -> Self {
        Self {
            damage_frame,
            frame_counter: 0,
            accumulator: 0.0,
            elapsed: 0.0,
            timeout: f32::INFINITY,
            running: false,
            damage_applied: false,
        }
    }

    /// Starts the counter for a fresh attack. `timeout` is the defensive
    /// upper bound on the cycle's lifetime.
    pub fn start(&mut self, timeout: f32) {
        self.frame_counter = 0;
        self.accumulator = 0.0;
        self.elapsed = 0.0;
        self.timeout = timeout;
        self.running = true;
        self.damage_applied = false;
    }

    /// Advances the counter by `delta_time`.
    ///
    /// Returns `true` exactly once per cycle: on the call where the counter
    /// reaches the damage frame.
    pub fn advance(&mut self, delta_time: f32) -> bool {
        if !self.running {
            return false;
        }

        self.elapsed += delta_time;
        self.accumulator += delta_time;

        let mut damage_frame_hit = false;
        while self.accumulator >= ATTACK_TICK_PERIOD - PERIOD_EPSILON {
            self.accumulator -= ATTACK_TICK_PERIOD;
            self.frame_counter += 1;

            if self.frame_counter == self.damage_frame && !self.damage_applied {
                self.damage_applied = true;
                damage_frame_hit = true;
            }
        }

        damage_frame_hit
    }

    /// Stops the counter and resets the frame count; the response to the
    /// `"attack"` animation-finished signal.
    pub fn finish(&mut self) {
        self.running = false;
        self.frame_counter = 0;
        self.accumulator = 0.0;
        self.elapsed = 0.0;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether the defensive timeout has elapsed without a finish signal.
    pub fn timed_out(&self) -> bool {
        self.running && self.elapsed >= self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_frame_fires_exactly_once_per_cycle() {
        let mut cycle = AttackCycle::new(12);
        cycle.start(10.0);

        let mut hits = 0;
        // 1.5 s of 60 Hz ticks comfortably passes frame 12 (0.6 s).
        for _ in 0..90 {
            if cycle.advance(1.0 / 60.0) {
                hits += 1;
            }
        }
        assert_eq!(hits, 1);
    }

    #[test]
    fn damage_frame_lands_at_the_configured_tick_count() {
        let mut cycle = AttackCycle::new(10);
        cycle.start(10.0);

        // Nine full periods: no damage yet.
        assert!(!cycle.advance(ATTACK_TICK_PERIOD * 9.0));
        // The tenth period crosses the damage frame.
        assert!(cycle.advance(ATTACK_TICK_PERIOD));
    }

    #[test]
    fn exact_period_deltas_each_count_one_frame() {
        let mut cycle = AttackCycle::new(12);
        cycle.start(10.0);

        // Float residue must not push the damage frame a period late.
        for _ in 0..11 {
            assert!(!cycle.advance(ATTACK_TICK_PERIOD));
        }
        assert!(cycle.advance(ATTACK_TICK_PERIOD));
    }

    #[test]
    fn a_single_large_delta_still_applies_damage_once() {
        let mut cycle = AttackCycle::new(12);
        cycle.start(10.0);
        assert!(cycle.advance(2.0));
        assert!(!cycle.advance(2.0));
    }

    #[test]
    fn finish_resets_for_the_next_cycle() {
        let mut cycle = AttackCycle::new(10);
        cycle.start(10.0);
        assert!(cycle.advance(1.0));
        cycle.finish();
        assert!(!cycle.is_running());

        cycle.start(10.0);
        assert!(cycle.advance(1.0));
    }

    #[test]
    fn timeout_guard_trips_without_a_finish_signal() {
        let mut cycle = AttackCycle::new(10);
        cycle.start(1.5);
        cycle.advance(1.0);
        assert!(!cycle.timed_out());
        cycle.advance(0.6);
        assert!(cycle.timed_out());
    }
}
