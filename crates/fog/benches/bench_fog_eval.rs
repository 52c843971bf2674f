use std::hint::black_box;
use std::time::Instant;

use glam::Vec3;
use hazeframe_fog::{EvalContext, FogComposer, FogConfig, noise::tri_noise_3d};

fn bench_noise(iterations: usize) {
    let start = Instant::now();
    for i in 0..iterations {
        let p = Vec3::new(i as f32 * 0.1, 0.5, i as f32 * -0.07);
        let _ = black_box(tri_noise_3d(black_box(p), 0.2, black_box(1.5)));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  tri_noise_3d ({iterations} iters): {per_iter:?}/iter, total {elapsed:?}");
}

fn bench_fog_field(width: usize, height: usize, frames: usize) {
    let fields = FogComposer::new(FogConfig::default(), 1000.0)
        .expect("default fog config is valid")
        .compose();

    let start = Instant::now();
    for frame in 0..frames {
        let time = frame as f32 / 60.0;
        for y in 0..height {
            for x in 0..width {
                // Fake a ground-plane fragment receding into the distance
                let depth = 1.0 + y as f32 * 2.0;
                let ctx = EvalContext::at_time(time)
                    .with_world_position(Vec3::new(x as f32 - width as f32 * 0.5, 0.0, -depth))
                    .with_view_z(-depth);
                let _ = black_box(fields.fog(black_box(&ctx)));
            }
        }
    }
    let elapsed = start.elapsed();
    let fragments = width * height * frames;
    let per_fragment = elapsed / fragments as u32;
    println!(
        "  fog field ({width}x{height}, {frames} frames): {per_fragment:?}/fragment, total {elapsed:?}"
    );
}

fn bench_background(iterations: usize) {
    let fields = FogComposer::new(FogConfig::default(), 1000.0)
        .expect("default fog config is valid")
        .compose();

    let start = Instant::now();
    for i in 0..iterations {
        let dir = Vec3::new(0.3, (i as f32 * 0.01).sin(), -1.0).normalize();
        let _ = black_box(fields.background(black_box(dir)));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  background ({iterations} iters): {per_iter:?}/iter, total {elapsed:?}");
}

fn main() {
    println!("=== Fog Field Benchmarks ===\n");

    println!("Noise:");
    bench_noise(100_000);
    bench_noise(1_000_000);

    println!("\nFog field:");
    bench_fog_field(160, 90, 10);
    bench_fog_field(320, 180, 4);

    println!("\nBackground:");
    bench_background(100_000);

    println!("\n=== Done ===");
}
