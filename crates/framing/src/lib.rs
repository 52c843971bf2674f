//! Camera framing: place a camera so an arbitrarily sized model fills the view.
//!
//! # Invariants
//! - Framing is a pure function of the bounding box, field of view and config.
//! - The camera distance is never zero or negative; degenerate boxes clamp to
//!   a minimum distance derived from the near plane.
//! - Re-centering the object and positioning the camera are separate steps.

mod camera;
mod framing;

pub use camera::CameraPose;
pub use framing::{
    FramingConfig, FramingError, GroundAlignment, ModelFraming, center_on_ground,
    compute_framing, frame_model, framing_distance,
};

pub fn crate_info() -> &'static str {
    "hazeframe-framing v0.1.0"
}
