use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glam::Vec3;
use hazeframe_common::BoundingBox;
use hazeframe_fog::{EvalContext, FogComposer};
use hazeframe_framing::frame_model;
use hazeframe_render::{
    DebugTextRenderer, FrameLoop, RenderView, Renderer, Scene, SceneConfig, SoftwareRenderer,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hazeframe-cli", about = "Frame models and sample procedural fog")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Scene config file (.yaml, .yml or .json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Compute the camera pose that frames a bounding box
    Frame {
        /// Box minimum corner
        #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true,
              default_values = ["-1", "-1", "-1"])]
        min: Vec<f32>,
        /// Box maximum corner
        #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true,
              default_values = ["1", "1", "1"])]
        max: Vec<f32>,
        /// Vertical field of view in degrees (overrides config)
        #[arg(long)]
        fov: Option<f32>,
        /// Framing margin factor (overrides config)
        #[arg(long)]
        margin: Option<f32>,
    },
    /// Evaluate the fog and background fields at one point
    Sample {
        /// World-space position
        #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true,
              default_values = ["0", "0", "0"])]
        position: Vec<f32>,
        /// Signed view-space z (negative in front of the camera)
        #[arg(long, allow_negative_numbers = true, default_value = "-10")]
        view_z: f32,
        /// View direction for the background sample
        #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true,
              default_values = ["0", "0", "-1"])]
        direction: Vec<f32>,
        /// Shading time in seconds
        #[arg(short, long, default_value = "0")]
        time: f32,
    },
    /// Frame a box and render it through the fog with the CPU renderer
    Render {
        #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true,
              default_values = ["-1", "-1", "-1"])]
        min: Vec<f32>,
        #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true,
              default_values = ["1", "1", "1"])]
        max: Vec<f32>,
        #[arg(long, default_value = "80")]
        width: u32,
        #[arg(long, default_value = "40")]
        height: u32,
        /// Number of frames to simulate
        #[arg(short, long, default_value = "1")]
        frames: u32,
        /// Simulated frame rate
        #[arg(long, default_value = "60")]
        fps: f32,
        /// Print the last frame as ASCII art
        #[arg(long)]
        ascii: bool,
        /// Write the last frame as a binary PPM
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn vec3(values: &[f32]) -> Result<Vec3> {
    match values {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => anyhow::bail!("expected 3 components, got {}", values.len()),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<SceneConfig> {
    match path {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("loading scene config from {}", path.display())),
        None => Ok(SceneConfig::default()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Info => {
            println!("hazeframe-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", hazeframe_common::crate_info());
            println!("framing: {}", hazeframe_framing::crate_info());
            println!("fog: {}", hazeframe_fog::crate_info());
            println!("render: {}", hazeframe_render::crate_info());
        }
        Commands::Frame {
            min,
            max,
            fov,
            margin,
        } => {
            if let Some(fov) = fov {
                config.camera.fov_degrees = fov;
            }
            if let Some(margin) = margin {
                config.framing.margin = margin;
            }
            let bounds = BoundingBox::new(vec3(&min)?, vec3(&max)?);
            println!(
                "Box: min={:?} max={:?} max_dim={:.3}",
                bounds.min,
                bounds.max,
                bounds.max_dimension()
            );

            match frame_model(
                &bounds,
                config.camera.vertical_fov(),
                &config.framing_config(),
            ) {
                Ok(framed) => {
                    let p = framed.pose.position;
                    println!(
                        "Object translation: ({:.3}, {:.3}, {:.3})",
                        framed.object_transform.position.x,
                        framed.object_transform.position.y,
                        framed.object_transform.position.z
                    );
                    println!("Camera distance: {:.3}", framed.distance);
                    println!("Camera position: ({:.3}, {:.3}, {:.3})", p.x, p.y, p.z);
                    println!("Camera target: (0, 0, 0)");
                }
                Err(err) => {
                    tracing::warn!(%err, "framing failed");
                    let p = config.camera.default_pose().position;
                    println!("Framing failed: {err}");
                    println!(
                        "Default camera position: ({:.3}, {:.3}, {:.3})",
                        p.x, p.y, p.z
                    );
                }
            }
        }
        Commands::Sample {
            position,
            view_z,
            direction,
            time,
        } => {
            let fields = FogComposer::new(config.fog.clone(), config.camera.far)
                .context("building fog fields")?
                .compose();
            let position = vec3(&position)?;
            let direction = vec3(&direction)?.normalize_or_zero();

            let ctx = EvalContext::at_time(time)
                .with_world_position(position)
                .with_view_z(view_z)
                .with_view_direction(direction);
            let fog = fields.fog(&ctx);
            let bg = fields.background(direction);

            println!("Fog color node: {}", fields.fog_color.node());
            println!("Fog density node: {}", fields.fog_density.node());
            println!(
                "Fog: color=({:.4}, {:.4}, {:.4}) density={:.4}",
                fog.color.r, fog.color.g, fog.color.b, fog.density
            );
            println!("Background: ({:.4}, {:.4}, {:.4})", bg.r, bg.g, bg.b);
        }
        Commands::Render {
            min,
            max,
            width,
            height,
            frames,
            fps,
            ascii,
            output,
        } => {
            anyhow::ensure!(width > 0 && height > 0, "image size must be non-zero");
            anyhow::ensure!(fps > 0.0, "fps must be positive");

            let mut scene = Scene::new(config).context("building scene")?;
            let pose = scene.place_model(BoundingBox::new(vec3(&min)?, vec3(&max)?));
            let view = RenderView::new(pose, width, height);

            let renderer = SoftwareRenderer::new();
            let mut frame_loop = FrameLoop::default();
            let mut last = None;
            for _ in 0..frames.max(1) {
                last = Some(frame_loop.run_frame(&renderer, &scene, &view, 1.0 / fps));
            }
            let image = last.context("no frame rendered")?;
            let time = frame_loop.clock().seconds();

            print!("{}", DebugTextRenderer::new().render(&scene, &view, time));
            println!(
                "Frames: {} avg={:?} max={:?}",
                frame_loop.clock().frame(),
                frame_loop.stats().average(),
                frame_loop.stats().max()
            );
            println!("Digest: {}", image.digest());

            if ascii {
                print!("{}", image.to_ascii());
            }
            if let Some(path) = output {
                std::fs::write(&path, image.to_ppm())
                    .with_context(|| format!("writing {}", path.display()))?;
                println!("Wrote {}", path.display());
            }
        }
    }

    Ok(())
}
