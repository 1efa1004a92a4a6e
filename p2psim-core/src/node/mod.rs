mod address;
mod appearance;

pub use self::{
    address::NodeAddress,
    appearance::{Color, Position, UNREACHABLE_DISTANCE},
};
