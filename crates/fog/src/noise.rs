//! Triangle-wave 3D noise.
//!
//! Cheap, continuous and stateless, so it can be evaluated independently for
//! every fragment. Output of [`tri_noise_3d`] lies in `[0, ~0.573]`.

use glam::Vec3;
use hazeframe_common::math::fract;

const ITERATIONS: usize = 4;

/// Symmetric triangle wave with period 1, in [0, 0.5].
pub fn tri(x: f32) -> f32 {
    (fract(x) - 0.5).abs()
}

/// Per-axis nested triangle waves used as a domain warp.
pub fn tri3(p: Vec3) -> Vec3 {
    Vec3::new(
        tri(p.z + tri(p.y)),
        tri(p.z + tri(p.x)),
        tri(p.y + tri(p.x)),
    )
}

/// Layered, domain-warped triangle noise animated by `time * speed`.
pub fn tri_noise_3d(position: Vec3, speed: f32, time: f32) -> f32 {
    let drift = Vec3::splat(time * 0.1 * speed);
    let mut p = position;
    let mut bp = position;
    let mut z = 1.4_f32;
    let mut rz = 0.0_f32;

    for _ in 0..ITERATIONS {
        let dg = tri3(bp * 2.0);
        p += dg + drift;
        bp *= 1.8;
        z *= 1.5;
        p *= 1.2;
        rz += tri(p.z + tri(p.x + tri(p.y))) / z;
        bp += Vec3::splat(0.14);
    }

    rz
}
