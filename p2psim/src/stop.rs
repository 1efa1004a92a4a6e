use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative stop signal of a node or of the whole network.
///
/// The running thread polls [`Stop::get`] at every iteration of its loop.
/// Once set the signal cannot be cleared.
#[derive(Debug, Default)]
pub(crate) struct Stop(AtomicBool);

const ORDERING: Ordering = Ordering::SeqCst;

impl Stop {
    pub(crate) fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    #[inline]
    pub(crate) fn get(&self) -> bool {
        self.0.load(ORDERING)
    }

    /// set the stop signal, returns `true` if it was not already set
    #[inline]
    pub(crate) fn toggle(&self) -> bool {
        !self.0.swap(true, ORDERING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // allow bool assert comparison because we want to highlight
    // what we are actually expecting to have
    #[allow(clippy::bool_assert_comparison)]
    #[test]
    fn default() {
        assert_eq!(Stop::new().get(), false);
        assert_eq!(Stop::default().get(), false);
    }

    #[allow(clippy::bool_assert_comparison)]
    #[test]
    fn toggle_once() {
        let stop = Stop::new();

        assert_eq!(stop.toggle(), true);
        assert_eq!(stop.get(), true);
        assert_eq!(stop.toggle(), false);
        assert_eq!(stop.get(), true);
    }
}
