//! Fog composition: animated ground fog and a sky gradient as per-fragment fields.
//!
//! # Invariants
//! - Fields are pure; the time uniform is the only input that changes between frames.
//! - Fog density lies in [0, 1] and peaks at the configured alpha.
//! - Colors are produced by convex blends, so they never leave the displayable range.
//!
//! Fields are expression trees ([`Node`]) rather than closures, so they can be
//! inspected, printed and evaluated on any backend.

mod composer;
pub mod node;
pub mod noise;
mod time;

pub use composer::{
    ColorField, FogComposer, FogConfig, FogError, FogFields, FogSample, NoiseOctave, ScalarField,
    apply_fog,
};
pub use node::{EvalContext, Node, Value, ValueKind};
pub use time::{TimeSource, TimeUniform};

pub fn crate_info() -> &'static str {
    "hazeframe-fog v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("fog"));
    }

    #[test]
    fn time_uniform_feeds_evaluation() {
        let fields = FogComposer::new(FogConfig::default(), 1000.0)
            .unwrap()
            .compose();
        let mut clock = TimeUniform::new();
        let ctx = |t: &TimeUniform| {
            EvalContext::at_time(t.now())
                .with_world_position(glam::Vec3::new(10.0, 1.0, 10.0))
                .with_view_z(-3.0)
        };
        let first = fields.fog(&ctx(&clock));
        clock.advance(25.0);
        let second = fields.fog(&ctx(&clock));
        assert_ne!(first.color, second.color);
        assert_eq!(first.density, second.density);
    }
}
