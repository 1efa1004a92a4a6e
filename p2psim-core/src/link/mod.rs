mod id;

use crate::{
    measure::{FlowLimiter, Latency},
    time::SimTime,
};

pub use self::id::LinkId;

/// A directed channel between two nodes.
///
/// The link adds its fixed [`Latency`] on top of the delay induced by its
/// own [`FlowLimiter`]: a request that fits in the bucket arrives exactly
/// `latency` after it was sent, a larger one arrives later by the time
/// needed to refill the shortfall.
///
/// ```
/// # use p2psim_core::{link::Link, measure::{FlowLimiter, Latency, Rate}, time::SimTime};
/// # use std::time::Duration;
/// let limiter = FlowLimiter::with_burst(Rate::new(30.0).unwrap(), 10.0, SimTime::ZERO);
/// let mut link = Link::new(Latency::new(Duration::from_secs(1)), limiter);
///
/// let arrival = link.schedule_send(10, SimTime::from_secs_f64(2.0));
/// assert_eq!(arrival.as_secs_f64(), 3.0);
/// ```
#[derive(Debug, Clone)]
pub struct Link {
    latency: Latency,
    limiter: FlowLimiter,
    last_arrival: Option<SimTime>,
}

impl Link {
    pub fn new(latency: Latency, limiter: FlowLimiter) -> Self {
        Self {
            latency,
            limiter,
            last_arrival: None,
        }
    }

    #[inline]
    pub fn latency(&self) -> Latency {
        self.latency
    }

    #[inline]
    pub fn limiter(&self) -> &FlowLimiter {
        &self.limiter
    }

    /// the arrival time of the most recent transmission scheduled on the link
    #[inline]
    pub fn last_arrival(&self) -> Option<SimTime> {
        self.last_arrival
    }

    /// reserve `size` bytes on the link at `request_time` and return the
    /// time the message arrives at the other end.
    pub fn schedule_send(&mut self, size: u64, request_time: SimTime) -> SimTime {
        let arrival = self.limiter.reserve(size, request_time) + self.latency.into_duration();
        self.last_arrival = Some(arrival);
        arrival
    }

    /// `true` if a transmission arrived (or will arrive) less than `window`
    /// seconds before `now`
    pub fn is_active(&self, now: SimTime, window: f64) -> bool {
        self.last_arrival
            .is_some_and(|arrival| now.secs_since(arrival) < window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::Rate;
    use std::time::Duration;

    fn link(latency_ms: u64, rate: f64) -> Link {
        let limiter = FlowLimiter::with_burst(Rate::new(rate).unwrap(), 10.0, SimTime::ZERO);
        Link::new(Latency::new(Duration::from_millis(latency_ms)), limiter)
    }

    fn at(secs: f64) -> SimTime {
        SimTime::from_secs_f64(secs)
    }

    #[test]
    fn full_bucket_arrives_after_latency() {
        let mut link = link(250, 30.0);

        let arrival = link.schedule_send(300, at(1.0));
        assert_eq!(arrival, at(1.25));
        assert_eq!(link.last_arrival(), Some(arrival));
    }

    #[test]
    fn arrival_never_before_latency() {
        let mut link = link(100, 10.0);

        for (i, size) in [5u64, 500, 10, 0, 2_000].into_iter().enumerate() {
            let sent = at(i as f64);
            let arrival = link.schedule_send(size, sent);
            assert!(arrival.secs_since(sent) >= 0.1 - 1e-12);
        }
    }

    #[test]
    fn bandwidth_delay_adds_to_latency() {
        let mut link = link(1_000, 10.0);

        // 100 tokens, 150 requested: 5 seconds of refill on top of latency
        let arrival = link.schedule_send(150, SimTime::ZERO);
        assert_eq!(arrival, at(6.0));
    }

    #[test]
    fn activity_window() {
        let mut link = link(500, 30.0);
        assert!(!link.is_active(at(0.0), 2.0));

        link.schedule_send(1, at(1.0));
        assert!(link.is_active(at(1.0), 2.0));
        assert!(link.is_active(at(3.0), 2.0));
        assert!(!link.is_active(at(3.5), 2.0));
    }
}
