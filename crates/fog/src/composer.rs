use glam::Vec3;
use hazeframe_common::Color;
use hazeframe_common::math::saturate;
use serde::{Deserialize, Serialize};

use crate::node::{EvalContext, Node, ValueKind, color, float, mix, smoothstep, tri_noise};

/// Errors raised while building the fog graph.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FogError {
    #[error("invalid fog config: {0}")]
    InvalidConfig(String),
}

/// One layer of animated noise in the fog color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseOctave {
    /// World-space position scale.
    pub frequency: f32,
    pub speed: f32,
    /// Multiplier on the time uniform.
    pub time_scale: f32,
}

/// Fog and sky parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FogConfig {
    pub sky: Color,
    pub ground: Color,
    /// The distance ramp saturates this many units before the far plane.
    pub ramp_offset: f32,
    pub ground_fog_height_scale: f32,
    /// Lower bound on the ground fog reference height.
    pub ground_fog_min_distance: f32,
    pub ground_fog_exponent: f32,
    /// Peak fog opacity.
    pub alpha: f32,
    pub octaves: Vec<NoiseOctave>,
}

impl Default for FogConfig {
    fn default() -> Self {
        Self {
            sky: Color::from_hex(0xf0f5f5),
            ground: Color::from_hex(0xd0dee7),
            ramp_offset: 300.0,
            ground_fog_height_scale: 20.0,
            ground_fog_min_distance: 4.0,
            ground_fog_exponent: 3.0,
            alpha: 0.98,
            octaves: vec![
                NoiseOctave {
                    frequency: 0.005,
                    speed: 0.2,
                    time_scale: 1.0,
                },
                NoiseOctave {
                    frequency: 0.01,
                    speed: 0.2,
                    time_scale: 1.2,
                },
            ],
        }
    }
}

impl FogConfig {
    pub fn validate(&self, far_plane: f32) -> Result<(), FogError> {
        let invalid = |msg: String| -> Result<(), FogError> { Err(FogError::InvalidConfig(msg)) };
        if !far_plane.is_finite() || far_plane <= self.ramp_offset {
            return invalid(format!(
                "far plane {far_plane} must exceed ramp offset {}",
                self.ramp_offset
            ));
        }
        if !self.ramp_offset.is_finite() || self.ramp_offset < 0.0 {
            return invalid(format!("ramp offset {} must be >= 0", self.ramp_offset));
        }
        if !(0.0..=1.0).contains(&self.alpha) {
            return invalid(format!("alpha {} outside [0, 1]", self.alpha));
        }
        if !(self.ground_fog_min_distance.is_finite() && self.ground_fog_min_distance > 0.0) {
            return invalid(format!(
                "ground fog min distance {} must be positive",
                self.ground_fog_min_distance
            ));
        }
        if !(self.ground_fog_height_scale.is_finite() && self.ground_fog_height_scale > 0.0) {
            return invalid(format!(
                "ground fog height scale {} must be positive",
                self.ground_fog_height_scale
            ));
        }
        if !(self.ground_fog_exponent.is_finite() && self.ground_fog_exponent > 0.0) {
            return invalid(format!(
                "ground fog exponent {} must be positive",
                self.ground_fog_exponent
            ));
        }
        if !(self.sky.is_finite() && self.ground.is_finite()) {
            return invalid("colors must be finite".into());
        }
        if self.octaves.is_empty() {
            return invalid("at least one noise octave is required".into());
        }
        let finite_octaves = self
            .octaves
            .iter()
            .all(|o| o.frequency.is_finite() && o.speed.is_finite() && o.time_scale.is_finite());
        if !finite_octaves {
            return invalid("noise octave parameters must be finite".into());
        }
        Ok(())
    }
}

/// Fog color and opacity at one fragment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FogSample {
    pub color: Color,
    /// Opacity in [0, 1].
    pub density: f32,
}

/// Blend a shaded surface toward the fog color by the fog density.
pub fn apply_fog(surface: Color, fog: FogSample) -> Color {
    surface.mix(fog.color, fog.density)
}

/// A field whose output is read as an RGB color.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorField(Node);

impl ColorField {
    pub fn node(&self) -> &Node {
        &self.0
    }

    pub fn sample(&self, ctx: &EvalContext) -> Color {
        self.0.evaluate(ctx).as_vec3().into()
    }
}

/// A field whose output is read as a scalar.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField(Node);

impl ScalarField {
    pub fn node(&self) -> &Node {
        &self.0
    }

    pub fn sample(&self, ctx: &EvalContext) -> f32 {
        self.0.evaluate(ctx).as_scalar()
    }
}

/// The scene's background and fog evaluations, handed to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct FogFields {
    pub background: ColorField,
    pub fog_color: ColorField,
    pub fog_density: ScalarField,
}

impl FogFields {
    pub fn fog(&self, ctx: &EvalContext) -> FogSample {
        FogSample {
            color: self.fog_color.sample(ctx),
            density: saturate(self.fog_density.sample(ctx)),
        }
    }

    /// Sky gradient seen along `direction`.
    pub fn background(&self, direction: Vec3) -> Color {
        let ctx = EvalContext::default().with_view_direction(direction);
        self.background.sample(&ctx)
    }
}

/// Builds the fog and background expression graphs from a [`FogConfig`].
#[derive(Debug, Clone)]
pub struct FogComposer {
    config: FogConfig,
    far_plane: f32,
}

impl FogComposer {
    pub fn new(config: FogConfig, far_plane: f32) -> Result<Self, FogError> {
        config.validate(far_plane)?;
        Ok(Self { config, far_plane })
    }

    pub fn config(&self) -> &FogConfig {
        &self.config
    }

    pub fn far_plane(&self) -> f32 {
        self.far_plane
    }

    /// 0 at the camera, rising smoothly to 1 at `far - ramp_offset`.
    pub fn distance_ramp(&self) -> Node {
        smoothstep(0.0, self.far_plane - self.config.ramp_offset, -Node::ViewZ)
    }

    /// Reference height for ground fog: grows with distance, never below the minimum.
    pub fn ground_fog_distance(&self, ramp: Node) -> Node {
        (ramp * self.config.ground_fog_height_scale).max(self.config.ground_fog_min_distance)
    }

    /// Density that is `alpha` at ground level and falls off with a power of
    /// normalized height. The base is clamped at zero above the reference height.
    pub fn ground_fog_area(&self, distance: Node) -> Node {
        ((distance.clone() - Node::WorldPosition.y()) / distance)
            .max(0.0)
            .pow(self.config.ground_fog_exponent)
            .saturate()
            * self.config.alpha
    }

    /// Sum of the noise octaves, tinted by the ground color.
    pub fn noise_color(&self) -> Node {
        let noise = self
            .config
            .octaves
            .iter()
            .map(|o| {
                tri_noise(
                    Node::WorldPosition * o.frequency,
                    o.speed,
                    Node::Time * o.time_scale,
                )
            })
            .reduce(|acc, n| acc + n)
            .unwrap_or_else(|| float(0.0));
        (noise * color(self.config.ground)).saturate()
    }

    pub fn background(&self) -> Node {
        mix(self.config.ground, self.config.sky, Node::ViewDirection.y().saturate())
    }

    pub fn compose(&self) -> FogFields {
        let _span = tracing::debug_span!("compose_fog").entered();

        let fog_color = mix(
            self.config.ground,
            self.noise_color(),
            self.distance_ramp().one_minus(),
        );
        let fog_density = self.ground_fog_area(self.ground_fog_distance(self.distance_ramp()));
        let background = self.background();

        debug_assert_eq!(fog_color.kind(), ValueKind::Vector);
        debug_assert_eq!(fog_density.kind(), ValueKind::Scalar);
        tracing::debug!(
            fog_color_nodes = fog_color.node_count(),
            fog_density_nodes = fog_density.node_count(),
            background_nodes = background.node_count(),
            "fog graph composed"
        );

        FogFields {
            background: ColorField(background),
            fog_color: ColorField(fog_color),
            fog_density: ScalarField(fog_density),
        }
    }
}
