use glam::Vec3;
use hazeframe_common::{BoundingBox, Transform};
use serde::{Deserialize, Serialize};

use crate::camera::CameraPose;

/// Errors from framing inputs. Callers skip auto-framing and keep a default pose.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FramingError {
    #[error("invalid bounds: min={min:?} max={max:?} (inverted or non-finite)")]
    InvalidBounds { min: Vec3, max: Vec3 },
    #[error("vertical field of view must lie in (0, pi) radians, got {0}")]
    InvalidFov(f32),
    #[error("margin factor must be finite and positive, got {0}")]
    InvalidMargin(f32),
    #[error("minimum camera distance must be finite and positive, got {0} (check near plane)")]
    InvalidNearPlane(f32),
    #[error("camera elevation must be finite, got {0}")]
    InvalidElevation(f32),
}

/// Tunables for auto-framing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FramingConfig {
    /// Scales the fitted distance: below 1 tightens the shot, above 1 loosens it.
    pub margin: f32,
    /// Camera height above the ground plane.
    pub elevation: f32,
    /// Near clip plane of the framed camera. Supplied by the camera
    /// settings, never read from a config file.
    #[serde(skip)]
    pub near: f32,
    /// The distance never drops below `near * min_distance_multiple`.
    pub min_distance_multiple: f32,
    /// Far clip plane of the framed camera, supplied like `near`.
    #[serde(skip)]
    pub far: f32,
}

impl Default for FramingConfig {
    fn default() -> Self {
        Self {
            margin: 0.5,
            elevation: 2.0,
            near: 0.1,
            min_distance_multiple: 2.0,
            far: 1000.0,
        }
    }
}

impl FramingConfig {
    pub fn min_distance(&self) -> f32 {
        self.near * self.min_distance_multiple
    }
}

/// Translation that puts a model's lowest point on y = 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundAlignment {
    /// Apply to the model's root transform.
    pub translation: Vec3,
    /// The model's bounds after the translation.
    pub bounds: BoundingBox,
}

/// Combined result of re-centering a model and framing it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelFraming {
    pub object_transform: Transform,
    pub bounds: BoundingBox,
    pub pose: CameraPose,
    pub distance: f32,
}

fn validate_bounds(bounds: &BoundingBox) -> Result<(), FramingError> {
    if bounds.is_valid() {
        Ok(())
    } else {
        tracing::warn!(min = ?bounds.min, max = ?bounds.max, "rejecting bounds");
        Err(FramingError::InvalidBounds {
            min: bounds.min,
            max: bounds.max,
        })
    }
}

/// Translate the model so its lowest point rests on the ground plane.
pub fn center_on_ground(bounds: &BoundingBox) -> Result<GroundAlignment, FramingError> {
    validate_bounds(bounds)?;
    let translation = Vec3::new(0.0, -bounds.min.y, 0.0);
    Ok(GroundAlignment {
        translation,
        bounds: bounds.translated(translation),
    })
}

/// Distance at which the largest box edge fills the vertical field of view,
/// scaled by the margin and clamped to the configured minimum.
///
/// Uses half the largest extent over the sine of the half angle, so the
/// default margin of 0.5 frames tighter than a full-extent fit: a 2-unit cube
/// at 45 degrees lands about 1.307 units away, half the full-extent distance.
pub fn framing_distance(
    bounds: &BoundingBox,
    vertical_fov: f32,
    config: &FramingConfig,
) -> Result<f32, FramingError> {
    validate_bounds(bounds)?;
    if !(vertical_fov > 0.0 && vertical_fov < std::f32::consts::PI) {
        return Err(FramingError::InvalidFov(vertical_fov));
    }
    if !(config.margin.is_finite() && config.margin > 0.0) {
        return Err(FramingError::InvalidMargin(config.margin));
    }
    let min_distance = config.min_distance();
    if !(min_distance.is_finite() && min_distance > 0.0) {
        tracing::warn!(
            near = config.near,
            multiple = config.min_distance_multiple,
            "rejecting minimum distance"
        );
        return Err(FramingError::InvalidNearPlane(min_distance));
    }

    let max_dim = bounds.max_dimension();
    let fitted = (max_dim / (2.0 * (vertical_fov * 0.5).sin())).abs() * config.margin;
    if fitted < min_distance {
        tracing::debug!(fitted, min_distance, "framing distance clamped");
    }
    Ok(fitted.max(min_distance))
}

/// Elevated front-facing pose looking at the origin, far enough back to fit `bounds`.
pub fn compute_framing(
    bounds: &BoundingBox,
    vertical_fov: f32,
    config: &FramingConfig,
) -> Result<CameraPose, FramingError> {
    if !config.elevation.is_finite() {
        return Err(FramingError::InvalidElevation(config.elevation));
    }
    let distance = framing_distance(bounds, vertical_fov, config)?;
    let pose = CameraPose {
        position: Vec3::new(0.0, config.elevation, distance),
        target: Vec3::ZERO,
        vertical_fov,
        near: config.near,
        far: config.far,
    };
    tracing::debug!(distance, position = ?pose.position, "computed framing");
    Ok(pose)
}

/// Re-center a freshly loaded model on the ground, then frame it.
pub fn frame_model(
    bounds: &BoundingBox,
    vertical_fov: f32,
    config: &FramingConfig,
) -> Result<ModelFraming, FramingError> {
    let aligned = center_on_ground(bounds)?;
    let pose = compute_framing(&aligned.bounds, vertical_fov, config)?;
    Ok(ModelFraming {
        object_transform: Transform::from_translation(aligned.translation),
        bounds: aligned.bounds,
        distance: pose.position.z,
        pose,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_3, FRAC_PI_4, PI};

    fn cube(half: f32) -> BoundingBox {
        BoundingBox::new(Vec3::splat(-half), Vec3::splat(half))
    }

    fn closed_form(max_dim: f32, fov: f32, margin: f32) -> f32 {
        max_dim / (2.0 * (fov / 2.0).sin()) * margin
    }

    #[test]
    fn config_defaults() {
        let config = FramingConfig::default();
        assert_eq!(config.margin, 0.5);
        assert_eq!(config.elevation, 2.0);
        assert!((config.min_distance() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn unit_cube_at_45_degrees() {
        let pose = compute_framing(&cube(1.0), FRAC_PI_4, &FramingConfig::default()).unwrap();
        assert!((pose.position.z - 1.307).abs() < 1e-3);
        assert_eq!(pose.position.x, 0.0);
        assert_eq!(pose.position.y, 2.0);
        assert_eq!(pose.target, Vec3::ZERO);
        assert_eq!(pose.vertical_fov, FRAC_PI_4);
    }

    #[test]
    fn distance_matches_closed_form() {
        let boxes = [
            BoundingBox::new(Vec3::ZERO, Vec3::new(4.0, 1.0, 2.0)),
            BoundingBox::new(Vec3::new(-10.0, 0.0, -3.0), Vec3::new(10.0, 5.0, 3.0)),
            BoundingBox::new(Vec3::new(0.0, -7.0, 0.0), Vec3::new(1.0, 30.0, 1.0)),
        ];
        for bounds in boxes {
            for fov in [FRAC_PI_4, FRAC_PI_3, FRAC_PI_2, 2.5] {
                for margin in [0.5, 1.0, 1.5] {
                    let config = FramingConfig {
                        margin,
                        ..FramingConfig::default()
                    };
                    let d = framing_distance(&bounds, fov, &config).unwrap();
                    let expected = closed_form(bounds.max_dimension(), fov, margin);
                    assert!((d - expected).abs() <= expected * 1e-5);
                }
            }
        }
    }

    #[test]
    fn largest_extent_fits_vertical_frustum() {
        let bounds = cube(3.0);
        let fov = FRAC_PI_3;
        let config = FramingConfig {
            margin: 1.0,
            ..FramingConfig::default()
        };
        let d = framing_distance(&bounds, fov, &config).unwrap();
        // Half-extent over distance must not exceed the sine of the half-angle.
        assert!(bounds.max_dimension() * 0.5 / d <= (fov * 0.5).sin() + 1e-6);
    }

    #[test]
    fn degenerate_box_clamps_to_minimum() {
        let point = BoundingBox::new(Vec3::splat(0.5), Vec3::splat(0.5));
        let config = FramingConfig::default();
        let pose = compute_framing(&point, FRAC_PI_4, &config).unwrap();
        assert!(pose.position.z > 0.0);
        assert!(pose.position.z >= config.min_distance());
    }

    #[test]
    fn inverted_box_is_rejected() {
        let inverted = BoundingBox::new(Vec3::ONE, Vec3::ZERO);
        let err = compute_framing(&inverted, FRAC_PI_4, &FramingConfig::default()).unwrap_err();
        assert!(matches!(err, FramingError::InvalidBounds { .. }));
    }

    #[test]
    fn non_finite_box_is_rejected() {
        let bad = BoundingBox::new(Vec3::ZERO, Vec3::new(f32::INFINITY, 1.0, 1.0));
        assert!(compute_framing(&bad, FRAC_PI_4, &FramingConfig::default()).is_err());
        let nan = BoundingBox::new(Vec3::new(0.0, f32::NAN, 0.0), Vec3::ONE);
        assert!(center_on_ground(&nan).is_err());
    }

    #[test]
    fn fov_outside_open_interval_is_rejected() {
        let config = FramingConfig::default();
        for fov in [0.0, -1.0, PI, 4.0, f32::NAN] {
            assert!(matches!(
                compute_framing(&cube(1.0), fov, &config),
                Err(FramingError::InvalidFov(_))
            ));
        }
    }

    #[test]
    fn non_positive_margin_is_rejected() {
        let config = FramingConfig {
            margin: 0.0,
            ..FramingConfig::default()
        };
        assert!(matches!(
            compute_framing(&cube(1.0), FRAC_PI_4, &config),
            Err(FramingError::InvalidMargin(_))
        ));
    }

    #[test]
    fn degenerate_box_needs_positive_minimum_distance() {
        let point = BoundingBox::new(Vec3::ZERO, Vec3::ZERO);
        for (near, multiple) in [(0.0, 2.0), (-0.1, 2.0), (0.1, f32::NAN), (f32::INFINITY, 2.0)] {
            let config = FramingConfig {
                near,
                min_distance_multiple: multiple,
                ..FramingConfig::default()
            };
            assert!(matches!(
                compute_framing(&point, FRAC_PI_4, &config),
                Err(FramingError::InvalidNearPlane(_))
            ));
        }
    }

    #[test]
    fn non_finite_elevation_is_rejected() {
        let config = FramingConfig {
            elevation: f32::NAN,
            ..FramingConfig::default()
        };
        assert!(matches!(
            compute_framing(&cube(1.0), FRAC_PI_4, &config),
            Err(FramingError::InvalidElevation(_))
        ));
    }

    #[test]
    fn repeated_calls_are_bit_identical() {
        let bounds = BoundingBox::new(Vec3::new(-1.3, 0.2, -0.7), Vec3::new(2.9, 1.1, 0.4));
        let config = FramingConfig::default();
        let a = compute_framing(&bounds, 0.8, &config).unwrap();
        let b = compute_framing(&bounds, 0.8, &config).unwrap();
        assert_eq!(a.position.z.to_bits(), b.position.z.to_bits());
        assert_eq!(a, b);
    }

    #[test]
    fn center_on_ground_lifts_lowest_point_to_zero() {
        let bounds = BoundingBox::new(Vec3::new(-1.0, -3.0, -1.0), Vec3::new(1.0, 2.0, 1.0));
        let aligned = center_on_ground(&bounds).unwrap();
        assert_eq!(aligned.translation, Vec3::new(0.0, 3.0, 0.0));
        assert_eq!(aligned.bounds.min.y, 0.0);
        assert_eq!(aligned.bounds.max.y, 5.0);
        assert_eq!(aligned.bounds.size(), bounds.size());
    }

    #[test]
    fn frame_model_combines_both_steps() {
        let bounds = BoundingBox::new(Vec3::new(-2.0, 1.0, -1.0), Vec3::new(2.0, 3.0, 1.0));
        let config = FramingConfig::default();
        let framed = frame_model(&bounds, FRAC_PI_4, &config).unwrap();
        assert_eq!(framed.object_transform.position, Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(framed.bounds.min.y, 0.0);
        assert_eq!(framed.distance, framed.pose.position.z);
        // Framing is translation-invariant: only the size matters.
        let direct = compute_framing(&bounds, FRAC_PI_4, &config).unwrap();
        assert_eq!(direct.position, framed.pose.position);
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: FramingConfig = serde_json::from_str(r#"{"margin": 0.75}"#).unwrap();
        assert_eq!(config.margin, 0.75);
        assert_eq!(config.elevation, 2.0);
    }

    #[test]
    fn clip_planes_are_not_read_from_config() {
        let config: FramingConfig =
            serde_json::from_str(r#"{"near": 0.0, "far": 5.0, "elevation": 3.0}"#).unwrap();
        assert_eq!(config.near, 0.1);
        assert_eq!(config.far, 1000.0);
        assert_eq!(config.elevation, 3.0);
    }
}
