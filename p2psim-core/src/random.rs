//! Sampling helpers on top of [`rand_core`].
//!
//! The whole simulation draws from a single seedable generator owned by the
//! network, these helpers only shape its raw output.

use rand_core::Rng;

/// uniform sample in `[0, 1)`
pub fn unit<R: Rng>(rng: &mut R) -> f64 {
    // 53 bits of precision: the mantissa width of an `f64`
    let bits = rng.next_u64() >> 11;
    bits as f64 * (1.0 / (1u64 << 53) as f64)
}

/// uniform sample in `[low, high)`
///
/// returns `low` if the range is empty.
pub fn uniform<R: Rng>(rng: &mut R, low: f64, high: f64) -> f64 {
    if high <= low {
        return low;
    }
    low + unit(rng) * (high - low)
}

/// uniform index in `0..len`, `None` if `len == 0`
pub fn index<R: Rng>(rng: &mut R, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let i = (unit(rng) * len as f64) as usize;
    Some(i.min(len - 1))
}

/// Bernoulli trial succeeding with the given `probability`
pub fn chance<R: Rng>(rng: &mut R, probability: f64) -> bool {
    unit(rng) < probability
}
