//! Rendering-only attributes of a node.
//!
//! None of these values influence delivery, with one exception: the
//! [`Position`] of two nodes is used to derive the latency of a lazily
//! created link.

/// Distance reported between two nodes when one of them is unknown.
///
/// Used as-is to derive link latency, so a link towards an unknown node
/// degenerates to "effectively unreachable".
pub const UNREACHABLE_DISTANCE: f64 = 99_999_999.0;

/// Coordinates of a node on the rendering plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Display color of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// euclidean distance
    pub fn distance(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// the `index`-th of `count` points evenly spread on a circle
    pub fn on_ring(center: Self, radius: f64, index: usize, count: usize) -> Self {
        let count = count.max(1) as f64;
        let angle = index as f64 * std::f64::consts::TAU / count;
        Self {
            x: center.x + angle.sin() * radius,
            y: center.y + angle.cos() * radius,
        }
    }
}

impl Color {
    pub const BLACK: Self = Self::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(60.0, 80.0);

        assert_eq!(a.distance(&b), 100.0);
        assert_eq!(b.distance(&a), 100.0);
        assert_eq!(a.distance(&a), 0.0);
    }

    #[test]
    fn ring() {
        let center = Position::new(300.0, 300.0);

        let first = Position::on_ring(center, 200.0, 0, 8);
        assert_eq!(first, Position::new(300.0, 500.0));

        for i in 0..8 {
            let p = Position::on_ring(center, 200.0, i, 8);
            assert!((p.distance(&center) - 200.0).abs() < 1e-9);
        }
    }
}
