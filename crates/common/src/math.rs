//! Scalar shading helpers shared by the fog graph and the renderer.

/// Clamp to [0, 1]. NaN maps to 0 so downstream blends stay defined.
pub fn saturate(x: f32) -> f32 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

/// Hermite ramp from 0 at `edge0` to 1 at `edge1`, clamped outside.
///
/// Equal edges degrade to a step at `edge0`.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge0 == edge1 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = saturate((x - edge0) / (edge1 - edge0));
    t * t * (3.0 - 2.0 * t)
}

/// Linear blend `a * (1 - t) + b * t`, exact at both endpoints.
/// Callers pass `t` in [0, 1] for a convex mix.
pub fn mix(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Map `x` from `[in_lo, in_hi]` onto `[out_lo, out_hi]` without clamping.
pub fn remap(x: f32, in_lo: f32, in_hi: f32, out_lo: f32, out_hi: f32) -> f32 {
    if in_hi == in_lo {
        return out_lo;
    }
    mix(out_lo, out_hi, (x - in_lo) / (in_hi - in_lo))
}

/// GLSL-style fractional part: always in [0, 1), also for negative inputs.
pub fn fract(x: f32) -> f32 {
    x - x.floor()
}
