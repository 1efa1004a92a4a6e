/// Trait for the payload carried by a [`Transmission`].
///
/// Payloads are never serialised, only their size matters: it is the
/// number of tokens taken from the link's and the recipient's
/// [`FlowLimiter`].
///
/// [`Transmission`]: crate::transmission::Transmission
/// [`FlowLimiter`]: crate::measure::FlowLimiter
pub trait Data: Send + 'static {
    /// the size of the payload on the wire, in bytes
    ///
    /// # case for `0` bytes data
    ///
    /// An empty payload still travels: it is only subject to the link's
    /// latency.
    fn bytes_size(&self) -> u64;
}

impl Data for () {
    fn bytes_size(&self) -> u64 {
        0
    }
}
impl<const S: usize> Data for [u8; S] {
    fn bytes_size(&self) -> u64 {
        S as u64
    }
}
impl Data for Box<[u8]> {
    fn bytes_size(&self) -> u64 {
        self.len() as u64
    }
}
impl Data for Vec<u8> {
    fn bytes_size(&self) -> u64 {
        self.len() as u64
    }
}
impl Data for &'static str {
    fn bytes_size(&self) -> u64 {
        self.len() as u64
    }
}
impl Data for String {
    fn bytes_size(&self) -> u64 {
        self.len() as u64
    }
}
