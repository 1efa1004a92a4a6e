//! The shared simulated clock.
//!
//! Simulated time is accumulated from wall-clock deltas scaled by a speed
//! multiplier. Every thread of a simulation (the scheduler and each node)
//! samples the same [`Clock`], so the accumulated value is kept behind a
//! lock and each call to [`Clock::now`] folds the wall time elapsed since
//! the previous call.

use crate::time::SimTime;
use std::{
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};
use thiserror::Error;

/// Source of monotonic wall-clock time for a [`Clock`].
///
/// The returned value is the time elapsed since an arbitrary, fixed origin.
/// It must never go backward.
pub trait WallClock: Send + Sync + 'static {
    fn elapsed(&self) -> Duration;
}

/// [`WallClock`] backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemWallClock {
    origin: Instant,
}

/// [`WallClock`] that only moves when told to.
///
/// Useful for deterministic tests: share it (it is cheap to clone) between
/// the [`Clock`] and the test driving the simulation and call
/// [`ManualWallClock::advance`].
///
/// ```
/// # use p2psim_core::clock::{Clock, ManualWallClock};
/// # use std::time::Duration;
/// let wall = ManualWallClock::new();
/// let clock = Clock::with_wall_clock(wall.clone());
///
/// wall.advance(Duration::from_secs(2));
/// assert_eq!(clock.now().as_secs_f64(), 2.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualWallClock(Arc<Mutex<Duration>>);

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ClockError {
    #[error("Speed multiplier must be finite and non-negative, got {0}")]
    InvalidSpeed(f64),
}

#[derive(Debug)]
struct State {
    accumulated: f64,
    last_sample: Duration,
    speed: f64,
}

/// Process-wide simulated clock.
///
/// * time is monotonic non-decreasing, including across speed changes;
/// * a speed of `0` freezes the simulated time (pause).
pub struct Clock {
    wall: Box<dyn WallClock>,
    state: Mutex<State>,
}

impl SystemWallClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemWallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl WallClock for SystemWallClock {
    fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }
}

impl ManualWallClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        let mut elapsed = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        *elapsed += by;
    }
}

impl WallClock for ManualWallClock {
    fn elapsed(&self) -> Duration {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clock {
    /// create a clock running at real-time speed (`1.0`)
    pub fn new() -> Self {
        Self::with_wall_clock(SystemWallClock::new())
    }

    pub fn with_wall_clock<W: WallClock>(wall: W) -> Self {
        let last_sample = wall.elapsed();
        Self {
            wall: Box::new(wall),
            state: Mutex::new(State {
                accumulated: 0.0,
                last_sample,
                speed: 1.0,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// sample the simulated time
    pub fn now(&self) -> SimTime {
        let mut state = self.lock();
        self.fold(&mut state);
        SimTime::from_secs_f64(state.accumulated)
    }

    fn fold(&self, state: &mut State) {
        let sample = self.wall.elapsed();
        let delta = sample.saturating_sub(state.last_sample);
        state.accumulated += delta.as_secs_f64() * state.speed;
        state.last_sample = state.last_sample.max(sample);
    }

    pub fn speed(&self) -> f64 {
        self.lock().speed
    }

    /// replace the speed multiplier.
    ///
    /// The time elapsed so far is accounted at the previous speed before
    /// the new one applies.
    pub fn set_speed(&self, speed: f64) -> Result<(), ClockError> {
        if !speed.is_finite() || speed < 0.0 {
            return Err(ClockError::InvalidSpeed(speed));
        }

        let mut state = self.lock();
        self.fold(&mut state);
        state.speed = speed;

        Ok(())
    }

    /// multiply the current speed by `factor`, returns the new speed
    pub fn adjust_speed(&self, factor: f64) -> Result<f64, ClockError> {
        let mut state = self.lock();
        let speed = state.speed * factor;
        if !speed.is_finite() || speed < 0.0 {
            return Err(ClockError::InvalidSpeed(speed));
        }
        self.fold(&mut state);
        state.speed = speed;

        Ok(speed)
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manual() -> (ManualWallClock, Clock) {
        let wall = ManualWallClock::new();
        let clock = Clock::with_wall_clock(wall.clone());
        (wall, clock)
    }

    #[test]
    fn starts_at_zero() {
        let (_, clock) = manual();
        assert_eq!(clock.now(), SimTime::ZERO);
        assert_eq!(clock.speed(), 1.0);
    }

    #[test]
    fn scaled_by_speed() {
        let (wall, clock) = manual();

        wall.advance(Duration::from_secs(1));
        assert_eq!(clock.now().as_secs_f64(), 1.0);

        clock.set_speed(2.0).unwrap();
        wall.advance(Duration::from_secs(1));
        assert_eq!(clock.now().as_secs_f64(), 3.0);
    }

    #[test]
    fn speed_change_accounts_elapsed_time_first() {
        let (wall, clock) = manual();

        // 1s elapses at speed 1 but nobody samples the clock before the
        // speed changes: that second must still count at speed 1.
        wall.advance(Duration::from_secs(1));
        clock.set_speed(10.0).unwrap();
        assert_eq!(clock.now().as_secs_f64(), 1.0);

        wall.advance(Duration::from_secs(1));
        clock.set_speed(0.0).unwrap();
        assert_eq!(clock.now().as_secs_f64(), 11.0);
    }

    #[test]
    fn paused_clock_does_not_move() {
        let (wall, clock) = manual();
        clock.set_speed(0.0).unwrap();

        wall.advance(Duration::from_secs(60));
        assert_eq!(clock.now(), SimTime::ZERO);
    }

    #[test]
    fn adjust_speed_multiplies() {
        let (_, clock) = manual();

        assert_eq!(clock.adjust_speed(2.0).unwrap(), 2.0);
        assert_eq!(clock.adjust_speed(0.5).unwrap(), 1.0);
    }

    #[test]
    fn invalid_speed_rejected() {
        let (_, clock) = manual();

        assert_eq!(clock.set_speed(-1.0), Err(ClockError::InvalidSpeed(-1.0)));
        assert!(clock.set_speed(f64::NAN).is_err());
        assert!(clock.adjust_speed(f64::INFINITY).is_err());
        assert_eq!(clock.speed(), 1.0);
    }

    #[test]
    fn monotonic_under_concurrent_readers() {
        let clock = Arc::new(Clock::new());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let clock = Arc::clone(&clock);
                std::thread::spawn(move || {
                    let mut last = SimTime::ZERO;
                    for _ in 0..1_000 {
                        let now = clock.now();
                        assert!(now >= last);
                        last = now;
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
