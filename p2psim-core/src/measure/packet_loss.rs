use rand_core::Rng;
use std::{fmt, str::FromStr};

/// Probability that a transmission is lost in the network.
///
/// The decision is taken once, when the transmission is scheduled. A lost
/// transmission still travels (it is visible to the renderer) but it is
/// never delivered.
///
/// ```
/// use p2psim_core::measure::PacketLoss;
///
/// let lossy = PacketLoss::new(0.2).unwrap();
/// assert_eq!(lossy.to_string(), "20%");
///
/// let parsed: PacketLoss = "20%".parse().unwrap();
/// assert_eq!(parsed, lossy);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PacketLoss(f64);

/// Error returned when constructing a [`PacketLoss`] with a value
/// outside `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("packet loss probability must be in [0.0, 1.0], got {0}")]
pub struct PacketLossRateError(f64);

/// Error returned when parsing a [`PacketLoss`] from a string.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PacketLossParseError {
    #[error("expected '%' suffix")]
    MissingSuffix,
    #[error("invalid number before '%'")]
    InvalidNumber,
    #[error("{0}")]
    OutOfRange(#[from] PacketLossRateError),
}

impl PacketLoss {
    /// never drop anything
    pub const NONE: Self = Self(0.0);

    pub fn new(probability: f64) -> Result<Self, PacketLossRateError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(PacketLossRateError(probability));
        }
        Ok(Self(probability))
    }

    pub(crate) const fn new_unchecked(probability: f64) -> Self {
        Self(probability)
    }

    #[inline]
    pub fn probability(self) -> f64 {
        self.0
    }

    /// Bernoulli trial: `true` if this transmission is to be dropped.
    pub fn should_drop<R: Rng>(&self, rng: &mut R) -> bool {
        self.0 > 0.0 && crate::random::chance(rng, self.0)
    }
}

impl fmt::Display for PacketLoss {
    /// Formats as a percentage with up to 2 decimal places.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pct = self.0 * 100.0;
        if (pct - pct.round()).abs() < 1e-9 {
            write!(f, "{}%", pct.round() as u64)
        } else {
            write!(f, "{pct:.2}%")
        }
    }
}

impl FromStr for PacketLoss {
    type Err = PacketLossParseError;

    /// Parses a percentage such as `"0%"`, `"5%"` or `"12.5%"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(num) = s.trim().strip_suffix('%') else {
            return Err(PacketLossParseError::MissingSuffix);
        };
        let pct: f64 = num
            .trim()
            .parse()
            .map_err(|_| PacketLossParseError::InvalidNumber)?;

        Ok(Self::new(pct / 100.0)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaChaRng;
    use rand_core::SeedableRng as _;

    fn rng() -> ChaChaRng {
        ChaChaRng::seed_from_u64(42)
    }

    #[test]
    fn none_never_drops() {
        let mut rng = rng();
        for _ in 0..1000 {
            assert!(!PacketLoss::NONE.should_drop(&mut rng));
        }
    }

    #[test]
    fn one_always_drops() {
        let mut rng = rng();
        let loss = PacketLoss::new(1.0).unwrap();
        for _ in 0..1000 {
            assert!(loss.should_drop(&mut rng));
        }
    }

    #[test]
    fn observed_fraction_converges() {
        // 10_000 trials at p = 0.2: the standard deviation of the observed
        // fraction is 0.004, allow 5 of them
        let loss = PacketLoss::new(0.2).unwrap();
        let mut rng = rng();
        let drops = (0..10_000).filter(|_| loss.should_drop(&mut rng)).count();
        let fraction = drops as f64 / 10_000.0;
        assert!(
            (fraction - 0.2).abs() < 0.02,
            "drop fraction was {fraction}"
        );
    }

    #[test]
    fn out_of_range_rejected() {
        assert!(PacketLoss::new(f64::NAN).is_err());
        assert!(PacketLoss::new(-0.1).is_err());
        assert!(PacketLoss::new(1.1).is_err());
    }

    #[test]
    fn display() {
        assert_eq!(PacketLoss::NONE.to_string(), "0%");
        assert_eq!(PacketLoss::new(0.05).unwrap().to_string(), "5%");
        assert_eq!(PacketLoss::new(0.123).unwrap().to_string(), "12.30%");
    }

    #[test]
    fn parse() {
        assert_eq!("0%".parse::<PacketLoss>().unwrap(), PacketLoss::NONE);
        assert_eq!(
            "12.5%".parse::<PacketLoss>().unwrap(),
            PacketLoss::new(0.125).unwrap()
        );
        assert_eq!(
            "5".parse::<PacketLoss>(),
            Err(PacketLossParseError::MissingSuffix)
        );
        assert_eq!(
            "abc%".parse::<PacketLoss>(),
            Err(PacketLossParseError::InvalidNumber)
        );
        assert!(matches!(
            "150%".parse::<PacketLoss>(),
            Err(PacketLossParseError::OutOfRange(_))
        ));
    }
}
