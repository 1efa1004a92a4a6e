use anyhow::{Result, anyhow, bail, ensure};
use logos::{Lexer, Logos};
use std::{cmp::Ordering, fmt, ops::Add, time::Duration};

/// A point on the simulated timeline, in seconds.
///
/// The simulated timeline starts at [`SimTime::ZERO`] when the [`Clock`] is
/// created and advances at the pace set by the clock's speed multiplier.
/// A node's local time may sit *before* zero (clock offsets are signed), so
/// the value is kept as a signed floating point number of seconds.
///
/// [`SimTime`] has a total order (see [`f64::total_cmp`]) so it can be used
/// directly as a priority key.
///
/// ```
/// # use p2psim_core::time::SimTime;
/// # use std::time::Duration;
/// let sent = SimTime::from_secs_f64(1.5);
/// let arrival = sent + Duration::from_millis(250);
///
/// assert_eq!(arrival.secs_since(sent), 0.25);
/// assert!(sent < arrival);
/// ```
///
/// [`Clock`]: crate::clock::Clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SimTime(f64);

impl SimTime {
    pub const ZERO: Self = Self(0.0);

    #[inline]
    pub const fn from_secs_f64(secs: f64) -> Self {
        Self(secs)
    }

    #[inline]
    pub const fn as_secs_f64(self) -> f64 {
        self.0
    }

    /// shift this time by a signed number of seconds
    #[must_use = "function does not modify the current value"]
    #[inline]
    pub fn offset(self, secs: f64) -> Self {
        Self(self.0 + secs)
    }

    /// the signed number of seconds between `earlier` and `self`
    #[inline]
    pub fn secs_since(self, earlier: Self) -> f64 {
        self.0 - earlier.0
    }
}

impl Add<Duration> for SimTime {
    type Output = Self;
    fn add(self, rhs: Duration) -> Self::Output {
        self.offset(rhs.as_secs_f64())
    }
}

impl PartialEq for SimTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SimTime {}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.0)
    }
}

/// parse human readable durations such as `"150ms"` or `"1s 500ms"`.
///
/// Every component is a number immediately followed by one of the units
/// `ns`, `us` (or `µs`), `ms`, `s` and `m`. Components are summed.
pub(crate) fn parse_duration(s: &str) -> Result<Duration> {
    let mut lex = Lexer::<'_, Token>::new(s);
    let mut total = Duration::ZERO;
    let mut components = 0;

    while let Some(next) = lex.next() {
        let token = next.map_err(|()| anyhow!("Failed to parse duration: {s}"))?;
        ensure!(
            token == Token::Value,
            "Expecting duration to start with a number. Cannot parse {s}"
        );
        let number: u64 = lex.slice().parse()?;

        let Some(Ok(unit)) = lex.next() else {
            bail!("Expecting a unit, failed to parse: {s}")
        };
        let component = match unit {
            Token::NanoSeconds => Duration::from_nanos(number),
            Token::MicroSeconds => Duration::from_micros(number),
            Token::MilliSeconds => Duration::from_millis(number),
            Token::Seconds => Duration::from_secs(number),
            Token::Minutes => number
                .checked_mul(60)
                .map(Duration::from_secs)
                .ok_or_else(|| anyhow!("Duration out of range: {s}"))?,
            Token::Value => bail!("Failed to parse `{s}', expecting a unit."),
        };
        total = total
            .checked_add(component)
            .ok_or_else(|| anyhow!("Duration out of range: {s}"))?;
        components += 1;
    }

    ensure!(components > 0, "Cannot parse an empty duration");

    Ok(total)
}

#[derive(Logos, Debug, PartialEq)]
#[logos(skip r"[ \t\n\f]+")]
enum Token {
    #[token("ns")]
    NanoSeconds,
    #[regex("us|µs|μs")]
    MicroSeconds,
    #[token("ms")]
    MilliSeconds,
    #[token("s")]
    Seconds,
    #[token("m")]
    Minutes,

    #[regex("[0-9]+")]
    Value,
}
