//! Rendering Adapter: renderer-agnostic interface over the fog fields and framed camera.
//!
//! # Invariants
//! - Renderers never mutate the scene.
//! - The time uniform advances once per frame, before any field evaluation.
//!
//! The GPU backend lives outside this workspace. [`SoftwareRenderer`] is a
//! CPU reference that evaluates the fields once per pixel, and
//! [`DebugTextRenderer`] prints a summary for logs and the CLI.

mod frame;
mod renderer;
mod scene;

pub use frame::{FrameLoop, FrameStats};
pub use renderer::{DebugTextRenderer, Image, RenderView, Renderer, SoftwareRenderer};
pub use scene::{CameraConfig, ConfigError, PlacedModel, Scene, SceneConfig, SurfaceConfig};

pub fn crate_info() -> &'static str {
    "hazeframe-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
