use crate::{time::SimTime, transmission::Transmission};
use core::cmp::Reverse;
use std::{cmp::Ordering, collections::BinaryHeap};

/// Pending [`Transmission`]s ordered by arrival time.
///
/// The order is exact and total: arrival times are compared with
/// [`SimTime`]'s total order, and transmissions arriving at the very same
/// time leave the queue in the order they were pushed.
pub struct TimeQueue<T> {
    heap: BinaryHeap<Reverse<OrderedByTime<T>>>,
    sequence: u64,
}

struct OrderedByTime<T> {
    sequence: u64,
    transmission: Transmission<T>,
}

impl<T> OrderedByTime<T> {
    fn key(&self) -> (SimTime, u64) {
        (self.transmission.arrival(), self.sequence)
    }
}

impl<T> PartialEq for OrderedByTime<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl<T> Eq for OrderedByTime<T> {}

impl<T> PartialOrd for OrderedByTime<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for OrderedByTime<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl<T> TimeQueue<T> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            sequence: 0,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// arrival time of the next transmission due
    #[inline]
    pub fn next_arrival(&self) -> Option<SimTime> {
        self.heap.peek().map(|v| v.0.transmission.arrival())
    }

    pub fn push(&mut self, transmission: Transmission<T>) {
        let sequence = self.sequence;
        self.sequence = self.sequence.wrapping_add(1);
        self.heap.push(Reverse(OrderedByTime {
            sequence,
            transmission,
        }));
    }

    pub fn pop(&mut self) -> Option<Transmission<T>> {
        self.heap.pop().map(|v| v.0.transmission)
    }

    /// remove every transmission with an arrival time `<= time`, earliest
    /// first
    pub fn pop_all_elapsed(&mut self, time: SimTime) -> Vec<Transmission<T>> {
        let mut due = Vec::new();
        while self.next_arrival().is_some_and(|arrival| arrival <= time) {
            if let Some(transmission) = self.pop() {
                due.push(transmission);
            }
        }
        due
    }

    /// visit the pending transmissions, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &Transmission<T>> {
        self.heap.iter().map(|v| &v.0.transmission)
    }
}

impl<T> Default for TimeQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
