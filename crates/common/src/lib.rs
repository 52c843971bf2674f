//! Shared types and scalar helpers for the hazeframe crates.
//!
//! # Invariants
//! - Colors are linear RGB; blends are convex so inputs in [0,1] stay in [0,1].
//! - Bounding boxes are axis-aligned and never mutated after construction.

pub mod math;
mod types;

pub use glam::Vec3;
pub use types::{BoundingBox, Color, ColorParseError, Transform};

pub fn crate_info() -> &'static str {
    "hazeframe-common v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("common"));
    }
}
