use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Look-at camera pose handed to the rendering side.
///
/// Framing computes `position` once after a model loads; `target` stays at
/// the world origin because the model is re-centered onto the ground plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in radians.
    pub vertical_fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 2.0, 10.0),
            target: Vec3::ZERO,
            vertical_fov: 45.0_f32.to_radians(),
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl CameraPose {
    /// Unit vector from the eye toward the target. Falls back to -Z when
    /// the two coincide.
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position)
            .try_normalize()
            .unwrap_or(Vec3::NEG_Z)
    }

    pub fn right(&self) -> Vec3 {
        self.forward()
            .cross(Vec3::Y)
            .try_normalize()
            .unwrap_or(Vec3::X)
    }

    pub fn up(&self) -> Vec3 {
        self.right().cross(self.forward())
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.vertical_fov, aspect, self.near, self.far)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    /// Signed view-space z of a world point; negative in front of the camera.
    pub fn view_space_z(&self, world: Vec3) -> f32 {
        self.view_matrix().transform_point3(world).z
    }

    /// World-space direction through a point on the image plane.
    ///
    /// `ndc_x`/`ndc_y` are in [-1, 1] with +y up.
    pub fn ray_direction(&self, ndc_x: f32, ndc_y: f32, aspect: f32) -> Vec3 {
        let half_height = (self.vertical_fov * 0.5).tan();
        let half_width = half_height * aspect;
        (self.forward() + self.right() * ndc_x * half_width + self.up() * ndc_y * half_height)
            .normalize()
    }
}
