use logos::{Lexer, Logos};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Refill rate of a [`FlowLimiter`], in bytes per simulated second.
///
/// The rate is strictly positive and finite: a zero rate would make every
/// request in debt complete at infinity.
///
/// # Parsing
///
/// ```
/// # use p2psim_core::measure::Rate;
/// let rate: Rate = "30B/s".parse().unwrap();
/// assert_eq!(rate.bytes_per_sec(), 30.0);
///
/// let rate: Rate = "2KB/s".parse().unwrap();
/// assert_eq!(rate.bytes_per_sec(), 2_048.0);
///
/// let rate: Rate = "0.5 B/s".parse().unwrap();
/// assert_eq!(rate.to_string(), "0.5B/s");
/// ```
///
/// [`FlowLimiter`]: super::FlowLimiter
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Rate(f64);

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RateError {
    #[error("Rate must be positive and finite, got {0}")]
    NotPositive(f64),
    #[error("Expecting to parse a number")]
    MissingNumber,
    #[error("Expecting to parse a unit (B/s, KB/s, MB/s, GB/s)")]
    MissingUnit,
    #[error("Not expecting any other tokens to parse a rate")]
    TrailingTokens,
}

const K: f64 = 1_024.0;
const M: f64 = K * K;
const G: f64 = M * K;

impl Rate {
    /// create a new rate, in bytes per simulated second
    pub fn new(bytes_per_sec: f64) -> Result<Self, RateError> {
        if bytes_per_sec.is_finite() && bytes_per_sec > 0.0 {
            Ok(Self(bytes_per_sec))
        } else {
            Err(RateError::NotPositive(bytes_per_sec))
        }
    }

    /// for constants only, the value must be positive and finite
    pub(crate) const fn new_unchecked(bytes_per_sec: f64) -> Self {
        Self(bytes_per_sec)
    }

    #[inline]
    pub fn bytes_per_sec(self) -> f64 {
        self.0
    }

    /// seconds needed to transfer `bytes` at this rate
    #[inline]
    pub fn transfer_secs(self, bytes: f64) -> f64 {
        bytes / self.0
    }
}

impl Default for Rate {
    fn default() -> Self {
        crate::defaults::DEFAULT_LINK_RATE
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        if v >= G && (v % G) == 0.0 {
            write!(f, "{}GB/s", v / G)
        } else if v >= M && (v % M) == 0.0 {
            write!(f, "{}MB/s", v / M)
        } else if v >= K && (v % K) == 0.0 {
            write!(f, "{}KB/s", v / K)
        } else {
            write!(f, "{v}B/s")
        }
    }
}

#[derive(Logos, Debug, PartialEq)]
#[logos(skip r"[ \t\n\f]+")]
enum RateToken {
    #[token("B/s")]
    Bytes,
    #[token("KB/s")]
    KiloBytes,
    #[token("MB/s")]
    MegaBytes,
    #[token("GB/s")]
    GigaBytes,

    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Value,
}

impl FromStr for Rate {
    type Err = RateError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lex = Lexer::<'_, RateToken>::new(s);

        let Some(Ok(RateToken::Value)) = lex.next() else {
            return Err(RateError::MissingNumber);
        };
        let number: f64 = lex.slice().parse().map_err(|_| RateError::MissingNumber)?;

        let multiplier = match lex.next() {
            Some(Ok(RateToken::Bytes)) => 1.0,
            Some(Ok(RateToken::KiloBytes)) => K,
            Some(Ok(RateToken::MegaBytes)) => M,
            Some(Ok(RateToken::GigaBytes)) => G,
            _ => return Err(RateError::MissingUnit),
        };

        if lex.next().is_some() {
            return Err(RateError::TrailingTokens);
        }

        Self::new(number * multiplier)
    }
}
