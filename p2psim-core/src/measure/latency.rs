use std::{fmt, str::FromStr, time::Duration};

/// The time a message takes to travel a [`Link`], on top of any
/// bandwidth-induced delay.
///
/// # truncation
///
/// The latency is precise up to the micro second. Anything below is
/// truncated.
///
/// ```
/// # use p2psim_core::measure::Latency;
/// # use std::time::Duration;
/// let latency: Latency = "1s 50ms".parse().unwrap();
/// assert_eq!(latency.into_duration(), Duration::from_millis(1_050));
/// assert_eq!(latency.to_string(), "1.05s");
/// ```
///
/// [`Link`]: crate::link::Link
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Latency(u64);

impl Latency {
    pub const ZERO: Self = Self::new(Duration::ZERO);

    /// durations beyond `u64::MAX` microseconds saturate
    #[inline(always)]
    pub const fn new(duration: Duration) -> Self {
        let micros = duration.as_micros();
        if micros > u64::MAX as u128 {
            Self(u64::MAX)
        } else {
            Self(micros as u64)
        }
    }

    /// create a latency from a number of simulated seconds.
    ///
    /// Negative and `NaN` values give [`Latency::ZERO`], values too large
    /// to be represented saturate.
    pub fn from_secs_f64(secs: f64) -> Self {
        Self((secs * 1_000_000.0) as u64)
    }

    #[inline(always)]
    pub fn into_duration(self) -> Duration {
        Duration::from_micros(self.0)
    }

    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }
}

impl From<Latency> for Duration {
    fn from(value: Latency) -> Self {
        value.into_duration()
    }
}

impl From<Duration> for Latency {
    fn from(value: Duration) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Latency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.into_duration(), f)
    }
}

impl FromStr for Latency {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let duration = crate::time::parse_duration(s)?;
        let micros = u64::try_from(duration.as_micros())
            .map_err(|_| anyhow::anyhow!("Latency out of range: {s}"))?;
        Ok(Self(micros))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate() {
        assert_eq!(
            Latency::new(Duration::from_nanos(9_876_543_210)).into_duration(),
            Duration::from_micros(9_876_543),
        )
    }

    #[test]
    fn from_secs() {
        assert_eq!(
            Latency::from_secs_f64(1.25).into_duration(),
            Duration::from_millis(1_250)
        );
        assert_eq!(Latency::from_secs_f64(-3.0), Latency::ZERO);
        assert_eq!(Latency::from_secs_f64(f64::NAN), Latency::ZERO);
        assert_eq!(Latency::from_secs_f64(0.5).as_secs_f64(), 0.5);
    }

    #[test]
    fn display() {
        assert_eq!(Latency::new(Duration::from_millis(150)).to_string(), "150ms");
        assert_eq!(Latency::new(Duration::from_nanos(1_542)).to_string(), "1µs");
    }

    #[test]
    fn parse() {
        assert_eq!(
            Latency::new(Duration::from_millis(100)),
            "100ms".parse().unwrap(),
        );
        assert!("100".parse::<Latency>().is_err());
        assert!("abc".parse::<Latency>().is_err());
    }

    #[test]
    fn parse_out_of_range() {
        assert!("18446744073709551615s 1s".parse::<Latency>().is_err());
        assert!("30000000000000s".parse::<Latency>().is_err());
        assert_eq!(
            "18446744073709s".parse::<Latency>().unwrap(),
            Latency::new(Duration::from_secs(18_446_744_073_709))
        );
    }

    #[test]
    fn new_saturates() {
        assert_eq!(
            Latency::new(Duration::from_secs(30_000_000_000_000)),
            Latency::new(Duration::from_micros(u64::MAX))
        );
    }
}
