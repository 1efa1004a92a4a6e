use super::Rate;
use crate::time::SimTime;

/// # Token bucket
///
/// Models the bandwidth of a [`Link`] or the inbound capacity of a node.
///
/// Tokens (bytes) refill continuously at [`Rate`] up to `capacity`. A
/// request is never rejected: when it is larger than the available tokens
/// it completes later, proportionally to the shortfall, and the bucket goes
/// into debt (negative tokens) which delays the following requests.
///
/// ```
/// # use p2psim_core::{measure::{FlowLimiter, Rate}, time::SimTime};
/// let rate = Rate::new(10.0).unwrap();
/// let mut limiter = FlowLimiter::new(rate, 100.0, SimTime::ZERO);
///
/// // fits in the bucket: no delay
/// assert_eq!(limiter.reserve(60, SimTime::ZERO), SimTime::ZERO);
/// // 40 tokens left, 60 requested: 20 bytes short at 10 bytes/s
/// assert_eq!(limiter.reserve(60, SimTime::ZERO).as_secs_f64(), 2.0);
/// assert_eq!(limiter.tokens(), -20.0);
/// ```
///
/// [`Link`]: crate::link::Link
#[derive(Debug, Clone)]
pub struct FlowLimiter {
    tokens: f64,
    capacity: f64,
    rate: Rate,
    last_update: SimTime,
}

impl FlowLimiter {
    /// create a full bucket
    pub fn new(rate: Rate, capacity: f64, now: SimTime) -> Self {
        let capacity = capacity.max(0.0);
        Self {
            tokens: capacity,
            capacity,
            rate,
            last_update: now,
        }
    }

    /// create a full bucket holding `burst` seconds worth of `rate`
    pub fn with_burst(rate: Rate, burst: f64, now: SimTime) -> Self {
        Self::new(rate, rate.bytes_per_sec() * burst, now)
    }

    #[inline]
    pub fn tokens(&self) -> f64 {
        self.tokens
    }

    #[inline]
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    #[inline]
    pub fn rate(&self) -> Rate {
        self.rate
    }

    #[inline]
    pub fn last_update(&self) -> SimTime {
        self.last_update
    }

    /// refill the bucket up to `time`.
    ///
    /// A `time` older than the last update refills nothing and the last
    /// update is left untouched.
    pub fn refresh(&mut self, time: SimTime) {
        self.tokens = self.tokens_at(time);
        self.last_update = self.last_update.max(time);
    }

    /// the token level the bucket would have at `time`, without updating it
    pub fn tokens_at(&self, time: SimTime) -> f64 {
        let elapsed = time.secs_since(self.last_update).max(0.0);
        let refilled = self.tokens + self.rate.bytes_per_sec() * elapsed;
        refilled.min(self.capacity)
    }

    /// take `size` bytes from the bucket at `request_time` and return the
    /// time at which the request completes.
    pub fn reserve(&mut self, size: u64, request_time: SimTime) -> SimTime {
        self.refresh(request_time);

        let size = size as f64;
        let deficit = (size - self.tokens).max(0.0);
        self.tokens -= size;

        request_time.offset(self.rate.transfer_secs(deficit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate(bytes_per_sec: f64) -> Rate {
        Rate::new(bytes_per_sec).unwrap()
    }

    fn at(secs: f64) -> SimTime {
        SimTime::from_secs_f64(secs)
    }

    #[test]
    fn starts_full() {
        let limiter = FlowLimiter::with_burst(rate(30.0), 10.0, SimTime::ZERO);

        assert_eq!(limiter.capacity(), 300.0);
        assert_eq!(limiter.tokens(), 300.0);
    }

    #[test]
    fn refresh_never_exceeds_capacity() {
        let mut limiter = FlowLimiter::new(rate(30.0), 300.0, SimTime::ZERO);

        limiter.reserve(100, SimTime::ZERO);
        for secs in [0.5, 1.0, 10.0, 1_000.0] {
            limiter.refresh(at(secs));
            assert!(limiter.tokens() <= limiter.capacity());
        }
        assert_eq!(limiter.tokens(), 300.0);
    }

    #[test]
    fn refresh_refills_at_rate() {
        let mut limiter = FlowLimiter::new(rate(10.0), 100.0, SimTime::ZERO);

        limiter.reserve(100, SimTime::ZERO);
        assert_eq!(limiter.tokens(), 0.0);

        limiter.refresh(at(2.5));
        assert_eq!(limiter.tokens(), 25.0);
        assert_eq!(limiter.last_update(), at(2.5));
    }

    #[test]
    fn refresh_in_the_past_is_ignored() {
        let mut limiter = FlowLimiter::new(rate(10.0), 100.0, at(5.0));
        limiter.reserve(50, at(5.0));

        limiter.refresh(at(4.0));
        assert_eq!(limiter.tokens(), 50.0);
        assert_eq!(limiter.last_update(), at(5.0));
    }

    #[test]
    fn reserve_within_capacity_is_immediate() {
        let mut limiter = FlowLimiter::new(rate(20.0), 200.0, SimTime::ZERO);

        assert_eq!(limiter.reserve(10, at(1.0)), at(1.0));
        assert_eq!(limiter.tokens(), 190.0);
    }

    #[test]
    fn debt_delays_next_request() {
        let mut limiter = FlowLimiter::new(rate(10.0), 100.0, SimTime::ZERO);

        // 150 bytes with 100 tokens: 50 short, 5 seconds late
        assert_eq!(limiter.reserve(150, SimTime::ZERO), at(5.0));
        assert_eq!(limiter.tokens(), -50.0);

        // one second later the debt is down to 40; 10 more bytes is 50 short
        assert_eq!(limiter.reserve(10, at(1.0)), at(6.0));
        assert_eq!(limiter.tokens(), -50.0);
    }

    #[test]
    fn completion_never_before_request() {
        let mut limiter = FlowLimiter::new(rate(1.0), 5.0, SimTime::ZERO);

        for (i, size) in [0u64, 1, 5, 20, 3].into_iter().enumerate() {
            let t = at(i as f64 * 0.1);
            assert!(limiter.reserve(size, t) >= t);
        }
    }

    #[test]
    fn tokens_at_does_not_mutate() {
        let mut limiter = FlowLimiter::new(rate(10.0), 100.0, SimTime::ZERO);
        limiter.reserve(100, SimTime::ZERO);

        assert_eq!(limiter.tokens_at(at(3.0)), 30.0);
        assert_eq!(limiter.tokens(), 0.0);
        assert_eq!(limiter.last_update(), SimTime::ZERO);
    }
}
