use crate::{node::NodeAddress, time::SimTime};

/// A message in flight between two nodes.
///
/// Created by the network when a node sends, with its arrival time already
/// computed and its loss already decided. It leaves the scheduler's queue
/// exactly once, at or after `arrival`, whether it is delivered or not.
#[derive(Debug, Clone)]
pub struct Transmission<T> {
    from: NodeAddress,
    to: NodeAddress,
    sent: SimTime,
    arrival: SimTime,
    dropped: bool,
    payload: T,
}

/// A delivered message, as found in a node's inbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message<T> {
    from: NodeAddress,
    payload: T,
}

impl<T> Transmission<T> {
    pub fn new(
        from: NodeAddress,
        to: NodeAddress,
        payload: T,
        sent: SimTime,
        arrival: SimTime,
        dropped: bool,
    ) -> Self {
        Self {
            from,
            to,
            sent,
            arrival: arrival.max(sent),
            dropped,
            payload,
        }
    }

    #[inline]
    pub fn from(&self) -> &NodeAddress {
        &self.from
    }

    #[inline]
    pub fn to(&self) -> &NodeAddress {
        &self.to
    }

    #[inline]
    pub fn sent(&self) -> SimTime {
        self.sent
    }

    #[inline]
    pub fn arrival(&self) -> SimTime {
        self.arrival
    }

    #[inline]
    pub fn is_dropped(&self) -> bool {
        self.dropped
    }

    #[inline]
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// how far along its way the transmission is at `now`, within `[0, 1]`
    pub fn progress(&self, now: SimTime) -> f64 {
        let total = self.arrival.secs_since(self.sent);
        if total <= 0.0 {
            return 1.0;
        }
        (now.secs_since(self.sent) / total).clamp(0.0, 1.0)
    }

    /// turn the transmission into the message that lands in the inbox
    pub fn into_message(self) -> Message<T> {
        Message {
            from: self.from,
            payload: self.payload,
        }
    }
}

impl<T> Message<T> {
    pub fn new(from: NodeAddress, payload: T) -> Self {
        Self { from, payload }
    }

    #[inline]
    pub fn from(&self) -> &NodeAddress {
        &self.from
    }

    #[inline]
    pub fn payload(&self) -> &T {
        &self.payload
    }

    pub fn into_inner(self) -> (NodeAddress, T) {
        (self.from, self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: f64) -> SimTime {
        SimTime::from_secs_f64(secs)
    }

    fn transmission(sent: f64, arrival: f64) -> Transmission<()> {
        Transmission::new("a".into(), "b".into(), (), at(sent), at(arrival), false)
    }

    #[test]
    fn progress() {
        let t = transmission(1.0, 3.0);

        assert_eq!(t.progress(at(0.0)), 0.0);
        assert_eq!(t.progress(at(1.0)), 0.0);
        assert_eq!(t.progress(at(2.0)), 0.5);
        assert_eq!(t.progress(at(3.0)), 1.0);
        assert_eq!(t.progress(at(10.0)), 1.0);
    }

    #[test]
    fn instant_transmission_is_complete() {
        assert_eq!(transmission(1.0, 1.0).progress(at(1.0)), 1.0);
    }

    #[test]
    fn arrival_not_before_sent() {
        let t = transmission(2.0, 1.0);
        assert_eq!(t.arrival(), at(2.0));
    }

    #[test]
    fn into_message() {
        let t = Transmission::new("a".into(), "b".into(), 42u8, at(0.0), at(1.0), false);
        let (from, payload) = t.into_message().into_inner();

        assert_eq!(from.as_str(), "a");
        assert_eq!(payload, 42);
    }
}
