mod flow_limiter;
mod latency;
mod packet_loss;
mod rate;

pub use self::{
    flow_limiter::FlowLimiter,
    latency::Latency,
    packet_loss::{PacketLoss, PacketLossParseError, PacketLossRateError},
    rate::{Rate, RateError},
};
