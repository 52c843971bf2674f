use std::path::{Path, PathBuf};

use glam::Vec3;
use hazeframe_common::{BoundingBox, Color, Transform};
use hazeframe_fog::{FogComposer, FogConfig, FogError, FogFields};
use hazeframe_framing::{CameraPose, FramingConfig, frame_model};
use serde::{Deserialize, Serialize};

/// Errors from loading a scene configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config format: {0} (expected .yaml, .yml or .json)")]
    UnsupportedFormat(PathBuf),
}

/// Static camera settings supplied by the render loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Pose used until a model is framed, and when framing fails.
    pub default_position: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.1,
            far: 1000.0,
            default_position: Vec3::new(0.0, 2.0, 10.0),
        }
    }
}

impl CameraConfig {
    pub fn vertical_fov(&self) -> f32 {
        self.fov_degrees.to_radians()
    }

    pub fn default_pose(&self) -> CameraPose {
        CameraPose {
            position: self.default_position,
            target: Vec3::ZERO,
            vertical_fov: self.vertical_fov(),
            near: self.near,
            far: self.far,
        }
    }
}

/// Surface colors used by the reference renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub model: Color,
    pub ground: Color,
    /// Draw the y = 0 ground plane.
    pub ground_plane: bool,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            model: Color::from_hex(0x3a4a5c),
            ground: Color::from_hex(0x8c9196),
            ground_plane: true,
        }
    }
}

/// Everything needed to assemble a scene, loadable from YAML or JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub camera: CameraConfig,
    pub framing: FramingConfig,
    pub fog: FogConfig,
    pub surface: SurfaceConfig,
}

impl SceneConfig {
    /// Load from a `.yaml`, `.yml` or `.json` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let data = std::fs::read_to_string(path)?;
        let config = match ext.as_deref() {
            Some("yaml" | "yml") => Self::from_yaml_str(&data)?,
            Some("json") => Self::from_json_str(&data)?,
            _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        };
        tracing::debug!(path = %path.display(), "loaded scene config");
        Ok(config)
    }

    pub fn from_yaml_str(data: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(data)?)
    }

    pub fn from_json_str(data: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(data)?)
    }

    /// Framing settings with the clip planes taken from the camera.
    pub fn framing_config(&self) -> FramingConfig {
        FramingConfig {
            near: self.camera.near,
            far: self.camera.far,
            ..self.framing
        }
    }
}

/// A loaded model after it has been placed on the ground.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedModel {
    pub transform: Transform,
    /// World-space bounds after the transform.
    pub bounds: BoundingBox,
}

/// Scene state read by renderers: fog fields, surfaces and the placed model.
#[derive(Debug, Clone)]
pub struct Scene {
    pub config: SceneConfig,
    pub fields: FogFields,
    pub model: Option<PlacedModel>,
}

impl Scene {
    /// Compose the fog fields once at startup.
    pub fn new(config: SceneConfig) -> Result<Self, FogError> {
        let fields = FogComposer::new(config.fog.clone(), config.camera.far)?.compose();
        Ok(Self {
            config,
            fields,
            model: None,
        })
    }

    /// Model-load completion: put the model on the ground and frame it.
    ///
    /// Invalid bounds leave the model out of the scene and return the
    /// configured default pose.
    pub fn place_model(&mut self, bounds: BoundingBox) -> CameraPose {
        let framing = self.config.framing_config();
        match frame_model(&bounds, self.config.camera.vertical_fov(), &framing) {
            Ok(framed) => {
                tracing::info!(
                    distance = framed.distance,
                    lift = framed.object_transform.position.y,
                    "model framed"
                );
                self.model = Some(PlacedModel {
                    transform: framed.object_transform,
                    bounds: framed.bounds,
                });
                framed.pose
            }
            Err(err) => {
                tracing::warn!(%err, "auto-framing skipped, using default camera");
                self.model = None;
                self.config.camera.default_pose()
            }
        }
    }
}
