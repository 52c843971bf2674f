use std::fmt::Write as _;

use glam::Vec3;
use hazeframe_common::{BoundingBox, Color};
use hazeframe_fog::{EvalContext, apply_fog};
use hazeframe_framing::CameraPose;
use sha2::{Digest, Sha256};

use crate::scene::Scene;

/// Camera and output size for one rendered frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderView {
    pub pose: CameraPose,
    pub width: u32,
    pub height: u32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            pose: CameraPose::default(),
            width: 80,
            height: 40,
        }
    }
}

impl RenderView {
    pub fn new(pose: CameraPose, width: u32, height: u32) -> Self {
        Self {
            pose,
            width,
            height,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// A renderer reads the scene, a view and the frame's time uniform. It never
/// mutates the scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame at the given shading time.
    fn render(&self, scene: &Scene, view: &RenderView, time: f32) -> Self::Output;
}

/// Human-readable frame summary: camera, model and a few field samples.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene, view: &RenderView, time: f32) -> String {
        let pose = &view.pose;
        let mut out = String::new();
        let _ = writeln!(out, "=== Scene (time={time:.2}s) ===");
        let _ = writeln!(
            out,
            "Camera: eye=({:.3}, {:.3}, {:.3}) target=({:.1}, {:.1}, {:.1}) fov={:.0} far={:.0}",
            pose.position.x,
            pose.position.y,
            pose.position.z,
            pose.target.x,
            pose.target.y,
            pose.target.z,
            pose.vertical_fov.to_degrees(),
            pose.far
        );

        match &scene.model {
            Some(model) => {
                let b = model.bounds;
                let _ = writeln!(
                    out,
                    "Model: min=({:.2}, {:.2}, {:.2}) max=({:.2}, {:.2}, {:.2}) lift={:.2}",
                    b.min.x,
                    b.min.y,
                    b.min.z,
                    b.max.x,
                    b.max.y,
                    b.max.z,
                    model.transform.position.y
                );
            }
            None => out.push_str("Model: none\n"),
        }

        let horizon = scene.fields.background(Vec3::Z);
        let zenith = scene.fields.background(Vec3::Y);
        let _ = writeln!(out, "Background: horizon={} zenith={}", hex(horizon), hex(zenith));

        let sample_point = scene.model.map_or(Vec3::ZERO, |m| m.bounds.center());
        let ctx = EvalContext::at_time(time)
            .with_world_position(sample_point)
            .with_view_z(pose.view_space_z(sample_point))
            .with_view_direction((sample_point - pose.position).normalize_or_zero());
        let fog = scene.fields.fog(&ctx);
        let _ = writeln!(
            out,
            "Fog @ ({:.2}, {:.2}, {:.2}): color={} density={:.3}",
            sample_point.x,
            sample_point.y,
            sample_point.z,
            hex(fog.color),
            fog.density
        );

        out
    }
}

fn hex(c: Color) -> String {
    let [r, g, b] = c.to_rgb8();
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Linear RGB frame produced by [`SoftwareRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

const ASCII_RAMP: &[u8] = b" .:-=+*#%@";

impl Image {
    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Packed 8-bit RGB, row-major.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|c| c.to_rgb8()).collect()
    }

    /// Binary PPM (P6).
    pub fn to_ppm(&self) -> Vec<u8> {
        let mut out = format!("P6\n{} {}\n255\n", self.width, self.height).into_bytes();
        out.extend(self.to_rgb8());
        out
    }

    /// One character per pixel, darker pixels map to denser glyphs.
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width as usize + 1) * self.height as usize);
        for row in self.pixels.chunks(self.width.max(1) as usize) {
            for c in row {
                let shade = 1.0 - hazeframe_common::math::saturate(c.luminance());
                let idx = (shade * (ASCII_RAMP.len() - 1) as f32).round() as usize;
                out.push(ASCII_RAMP[idx] as char);
            }
            out.push('\n');
        }
        out
    }

    /// SHA-256 of the 8-bit pixel data, hex encoded.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.width.to_le_bytes());
        hasher.update(self.height.to_le_bytes());
        hasher.update(self.to_rgb8());
        format!("{:x}", hasher.finalize())
    }
}

/// CPU reference renderer: one primary ray per pixel against the placed
/// model's box and the ground plane, fogged surfaces, background elsewhere.
#[derive(Debug, Clone, Copy)]
pub struct SoftwareRenderer {
    /// Direction toward the key light.
    pub light_direction: Vec3,
    pub ambient: f32,
}

impl Default for SoftwareRenderer {
    fn default() -> Self {
        Self {
            light_direction: Vec3::new(0.0, 5.0, 10.0).normalize(),
            ambient: 0.35,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Hit {
    t: f32,
    normal: Vec3,
    albedo: Color,
}

impl SoftwareRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn trace(&self, scene: &Scene, origin: Vec3, dir: Vec3) -> Option<Hit> {
        let surface = &scene.config.surface;
        let model_hit = scene.model.and_then(|m| {
            m.bounds.intersect_ray(origin, dir).map(|t| Hit {
                t,
                normal: box_normal(&m.bounds, origin + dir * t),
                albedo: surface.model,
            })
        });

        let ground_hit = (surface.ground_plane && dir.y < 0.0 && origin.y > 0.0).then(|| {
            let t = -origin.y / dir.y;
            let p = origin + dir * t;
            // Checker every unit, like a grid helper on the floor
            let checker = (p.x.floor() + p.z.floor()).rem_euclid(2.0) < 1.0;
            let albedo = if checker {
                surface.ground
            } else {
                surface.ground.mix(Color::WHITE, 0.15)
            };
            Hit {
                t,
                normal: Vec3::Y,
                albedo,
            }
        });

        match (model_hit, ground_hit) {
            (Some(a), Some(b)) => Some(if a.t <= b.t { a } else { b }),
            (a, b) => a.or(b),
        }
    }

    fn shade_pixel(&self, scene: &Scene, pose: &CameraPose, dir: Vec3, time: f32) -> Color {
        let origin = pose.position;
        let hit = self.trace(scene, origin, dir).and_then(|hit| {
            let p = origin + dir * hit.t;
            let view_z = pose.view_space_z(p);
            // Beyond the far plane the fragment is clipped
            (-view_z <= pose.far).then_some((hit, p, view_z))
        });

        match hit {
            Some((hit, p, view_z)) => {
                let diffuse = hit.normal.dot(self.light_direction).max(0.0);
                let lighting = self.ambient + diffuse * (1.0 - self.ambient);
                let lit = Color::from(hit.albedo.to_vec3() * lighting);
                let ctx = EvalContext::at_time(time)
                    .with_world_position(p)
                    .with_view_z(view_z)
                    .with_view_direction(dir);
                apply_fog(lit, scene.fields.fog(&ctx))
            }
            None => scene.fields.background(dir),
        }
    }
}

impl Renderer for SoftwareRenderer {
    type Output = Image;

    fn render(&self, scene: &Scene, view: &RenderView, time: f32) -> Image {
        let _span = tracing::debug_span!("software_render", width = view.width, height = view.height)
            .entered();
        let aspect = view.aspect();
        let (w, h) = (view.width as f32, view.height as f32);

        let mut pixels = Vec::with_capacity(view.width as usize * view.height as usize);
        for y in 0..view.height {
            for x in 0..view.width {
                let ndc_x = (x as f32 + 0.5) / w * 2.0 - 1.0;
                let ndc_y = 1.0 - (y as f32 + 0.5) / h * 2.0;
                let dir = view.pose.ray_direction(ndc_x, ndc_y, aspect);
                pixels.push(self.shade_pixel(scene, &view.pose, dir, time));
            }
        }

        tracing::trace!(pixels = pixels.len(), "frame rendered");
        Image {
            width: view.width,
            height: view.height,
            pixels,
        }
    }
}

/// Outward normal of the box face closest to `p`.
fn box_normal(bounds: &BoundingBox, p: Vec3) -> Vec3 {
    let candidates = [
        ((p.x - bounds.min.x).abs(), Vec3::NEG_X),
        ((p.x - bounds.max.x).abs(), Vec3::X),
        ((p.y - bounds.min.y).abs(), Vec3::NEG_Y),
        ((p.y - bounds.max.y).abs(), Vec3::Y),
        ((p.z - bounds.min.z).abs(), Vec3::NEG_Z),
        ((p.z - bounds.max.z).abs(), Vec3::Z),
    ];
    candidates
        .into_iter()
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map_or(Vec3::Y, |(_, n)| n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{SceneConfig, SurfaceConfig};

    fn scene_with_cube() -> (Scene, RenderView) {
        let mut scene = Scene::new(SceneConfig::default()).unwrap();
        let pose = scene.place_model(BoundingBox::new(Vec3::splat(-1.0), Vec3::splat(1.0)));
        (scene, RenderView::new(pose, 32, 18))
    }

    #[test]
    fn render_view_default() {
        let view = RenderView::default();
        assert_eq!(view.pose.target, Vec3::ZERO);
        assert_eq!(view.aspect(), 2.0);
    }

    #[test]
    fn debug_renderer_without_model() {
        let scene = Scene::new(SceneConfig::default()).unwrap();
        let output = DebugTextRenderer::new().render(&scene, &RenderView::default(), 0.0);
        assert!(output.contains("time=0.00s"));
        assert!(output.contains("Model: none"));
        assert!(output.contains("zenith=#f0f5f5"));
    }

    #[test]
    fn debug_renderer_with_model() {
        let (scene, view) = scene_with_cube();
        let output = DebugTextRenderer::new().render(&scene, &view, 1.5);
        assert!(output.contains("Model: min="));
        assert!(output.contains("lift=1.00"));
        assert!(output.contains("density="));
    }

    #[test]
    fn software_render_has_requested_size() {
        let (scene, view) = scene_with_cube();
        let image = SoftwareRenderer::new().render(&scene, &view, 0.0);
        assert_eq!(image.pixels.len(), 32 * 18);
        assert!(image.get(31, 17).is_some());
        assert!(image.get(32, 0).is_none());
        let ppm = image.to_ppm();
        assert!(ppm.starts_with(b"P6\n32 18\n255\n"));
        assert_eq!(ppm.len(), "P6\n32 18\n255\n".len() + 32 * 18 * 3);
    }

    #[test]
    fn framed_model_is_visible_at_center() {
        let (scene, view) = scene_with_cube();
        let image = SoftwareRenderer::new().render(&scene, &view, 0.0);
        let center = image.get(16, 9).unwrap();
        let ground_bg = scene.config.fog.ground;
        let sky_bg = scene.config.fog.sky;
        assert_ne!(center, ground_bg);
        assert_ne!(center, sky_bg);
    }

    #[test]
    fn empty_scene_shows_background_above_horizon() {
        let config = SceneConfig {
            surface: SurfaceConfig {
                ground_plane: false,
                ..SurfaceConfig::default()
            },
            ..SceneConfig::default()
        };
        let scene = Scene::new(config).unwrap();
        let pose = CameraPose {
            position: Vec3::new(0.0, 2.0, 10.0),
            target: Vec3::new(0.0, 2.0, 0.0),
            ..CameraPose::default()
        };
        let view = RenderView::new(pose, 8, 8);
        let image = SoftwareRenderer::new().render(&scene, &view, 0.0);
        // Top row looks upward: strictly between ground and sky.
        let top = image.get(4, 0).unwrap();
        let ground = scene.config.fog.ground;
        assert!(top.r >= ground.r.min(scene.config.fog.sky.r));
        // Bottom row looks downward with no floor: pure ground color.
        assert_eq!(image.get(4, 7).unwrap(), ground);
    }

    #[test]
    fn same_time_gives_same_digest() {
        let (scene, view) = scene_with_cube();
        let renderer = SoftwareRenderer::new();
        let a = renderer.render(&scene, &view, 2.0);
        let b = renderer.render(&scene, &view, 2.0);
        assert_eq!(a.digest(), b.digest());
        assert_eq!(a.digest().len(), 64);
    }

    #[test]
    fn pixel_lookup_does_not_overflow_for_large_sizes() {
        let image = Image {
            width: 1 << 17,
            height: 1 << 17,
            pixels: vec![Color::WHITE],
        };
        assert_eq!(image.get(0, 0), Some(Color::WHITE));
        assert_eq!(image.get(1, 1 << 16), None);
        assert_eq!(image.get(u32::MAX, 0), None);
    }

    #[test]
    fn ascii_output_has_one_line_per_row() {
        let (scene, view) = scene_with_cube();
        let text = SoftwareRenderer::new().render(&scene, &view, 0.0).to_ascii();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 18);
        assert!(lines.iter().all(|l| l.len() == 32));
    }

    #[test]
    fn box_normal_picks_nearest_face() {
        let b = BoundingBox::new(Vec3::ZERO, Vec3::ONE);
        assert_eq!(box_normal(&b, Vec3::new(0.5, 1.0, 0.5)), Vec3::Y);
        assert_eq!(box_normal(&b, Vec3::new(0.0, 0.4, 0.5)), Vec3::NEG_X);
        assert_eq!(box_normal(&b, Vec3::new(0.5, 0.5, 1.0)), Vec3::Z);
    }
}
