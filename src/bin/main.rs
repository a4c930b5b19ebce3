//! sdf-march CLI
//!
//! Renders scene descriptions and compares marching strategies.

#![allow(clippy::uninlined_format_args, clippy::needless_pass_by_value, clippy::cast_precision_loss)]

#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use std::time::Instant;

#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand};
#[cfg(feature = "cli")]
use rayon::prelude::*;
#[cfg(feature = "cli")]
use sdf_march::prelude::*;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "sdf-march")]
#[command(version = sdf_march::VERSION)]
#[command(about = "Raymarch SDF scenes and compare traversal strategies", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Summarize a scene and its acceleration structures
    Info {
        /// Scene description (.json); built-in demo scene if omitted
        file: Option<PathBuf>,
    },

    /// Write the built-in demo scene description
    Demo {
        /// Output file
        #[arg(short, long, default_value = "scene.json")]
        output: PathBuf,
    },

    /// Render one frame and report per-pixel statistics
    Render {
        #[command(flatten)]
        view: ViewArgs,
        /// Marching algorithm
        #[arg(short, long, default_value = "sphere-tracer")]
        algorithm: String,
        /// Acceleration structure (none, octree, bvh); scene setting if omitted
        #[arg(long)]
        accel: Option<String>,
        /// Row bands rendered in parallel, each with its own scene copy
        #[arg(long, default_value = "4")]
        bands: u32,
        /// Write the raw output buffers as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render every algorithm with every acceleration structure
    Compare {
        #[command(flatten)]
        view: ViewArgs,
    },
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct ViewArgs {
    /// Scene description (.json); built-in demo scene if omitted
    #[arg(short, long)]
    scene: Option<PathBuf>,
    /// Frame width
    #[arg(long, default_value = "160")]
    width: u32,
    /// Frame height
    #[arg(long, default_value = "120")]
    height: u32,
    /// Camera pitch in radians
    #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
    pitch: f32,
    /// Camera yaw in radians
    #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
    yaw: f32,
    /// Camera distance from the origin
    #[arg(long, default_value = "5.0")]
    distance: f32,
    /// Animation time
    #[arg(long, default_value = "0.0")]
    time: f32,
    /// Inflation factor of the adaptive algorithms
    #[arg(long, default_value = "1.2")]
    overshoot: f32,
    /// Step length of the fixed-step algorithm
    #[arg(long, default_value = "0.1")]
    step: f32,
}

#[cfg(feature = "cli")]
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Info { file } => cmd_info(file),
        Commands::Demo { output } => cmd_demo(output),
        Commands::Render {
            view,
            algorithm,
            accel,
            bands,
            output,
        } => cmd_render(view, algorithm, accel, bands, output),
        Commands::Compare { view } => cmd_compare(view),
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI not enabled. Build with --features cli");
    std::process::exit(1);
}

#[cfg(feature = "cli")]
fn fail(context: &str, e: impl std::fmt::Display) -> ! {
    eprintln!("{}: {}", context, e);
    std::process::exit(1);
}

/// Spheres, a twisted torus, a carved box and a small animated bulb
#[cfg(feature = "cli")]
fn demo_scene() -> SceneDescription {
    let mut primitives = Vec::new();
    for i in 0..3 {
        for j in 0..3 {
            primitives.push(
                Primitive::sphere(0.25)
                    .translate(Vec3::new(i as f32 - 1.0, j as f32 - 1.0, -1.5)),
            );
        }
    }
    primitives.push(
        Primitive::torus(0.6, 0.15)
            .twist(1.5)
            .translate(Vec3::new(1.6, 0.0, 0.5)),
    );
    primitives.push(
        Primitive::box3d(Vec3::splat(0.45))
            .round(0.05)
            .smooth_subtract(Primitive::sphere(0.55), 0.05)
            .translate(Vec3::new(-1.6, 0.0, 0.5)),
    );
    primitives.push(
        Primitive::animated_mandelbulb(0.5)
            .scale(Vec3::splat(0.4))
            .oscillate(Vec3::Y, 0.3, 1.0),
    );
    SceneDescription::new(primitives)
}

#[cfg(feature = "cli")]
fn load_or_demo(path: Option<&PathBuf>) -> SceneDescription {
    match path {
        Some(path) => load_scene(path).unwrap_or_else(|e| fail("Load error", e)),
        None => demo_scene(),
    }
}

#[cfg(feature = "cli")]
fn cmd_info(file: Option<PathBuf>) {
    let desc = load_or_demo(file.as_ref());
    let nodes: u32 = desc.primitives.iter().map(Primitive::node_count).sum();
    let animated = desc.primitives.iter().filter(|p| p.is_animated()).count();

    println!("Primitives: {} ({} nodes, {} animated)", desc.primitives.len(), nodes, animated);
    for (i, prim) in desc.primitives.iter().enumerate() {
        let at = prim.world_position();
        println!(
            "  [{}] {:<20} at ({:.2}, {:.2}, {:.2})",
            i,
            prim.kind_name(),
            at.x,
            at.y,
            at.z
        );
    }

    for kind in AccelKind::ALL {
        let start = Instant::now();
        let scene = desc.build(Some(kind));
        let elapsed = start.elapsed();
        let bounds = scene.bounds();
        println!(
            "{:<7} nodes={:<5} build={:.3}ms bounds=[{:.2}, {:.2}, {:.2}]..[{:.2}, {:.2}, {:.2}]",
            kind.name(),
            scene.acceleration().node_count(),
            elapsed.as_secs_f64() * 1000.0,
            bounds.min.x,
            bounds.min.y,
            bounds.min.z,
            bounds.max.x,
            bounds.max.y,
            bounds.max.z
        );
    }
}

#[cfg(feature = "cli")]
fn cmd_demo(output: PathBuf) {
    let desc = demo_scene();
    match save_scene(&desc, &output) {
        Ok(()) => println!(
            "Wrote demo scene with {} primitives to {}",
            desc.primitives.len(),
            output.display()
        ),
        Err(e) => fail("Save error", e),
    }
}

#[cfg(feature = "cli")]
fn parse_algorithm(name: &str, view: &ViewArgs) -> Algorithm {
    name.parse::<Algorithm>()
        .unwrap_or_else(|e| fail("Argument error", e))
        .with_overshoot(view.overshoot)
        .with_step(view.step)
}

/// Render a frame as parallel row bands, one scene copy per band
#[cfg(feature = "cli")]
fn render_banded(
    scene: &Scene,
    algorithm: Algorithm,
    config: &RaymarchConfig,
    view: &ViewArgs,
    bands: u32,
) -> Result<(FrameBuffers, FrameStats), MarchError> {
    let camera = Camera::orbit(view.pitch, view.yaw, view.distance);
    let bands = bands.clamp(1, view.height.max(1));
    let per_band = view.height.div_ceil(bands);

    let ranges: Vec<std::ops::Range<u32>> = (0..bands)
        .map(|b| (b * per_band).min(view.height)..((b + 1) * per_band).min(view.height))
        .filter(|r| !r.is_empty())
        .collect();

    let rendered: Vec<Result<(FrameBuffers, FrameStats), MarchError>> = ranges
        .into_par_iter()
        .map(|rows| {
            let mut local = scene.clone();
            let mut buffers = FrameBuffers::new(view.width, rows.end - rows.start);
            let stats = render_rows(
                &mut local,
                algorithm,
                config,
                &camera,
                view.width,
                view.height,
                view.time,
                rows,
                &mut buffers,
            )?;
            Ok((buffers, stats))
        })
        .collect();

    let mut frame = FrameBuffers::default();
    let mut total = FrameStats::default();
    for band in rendered {
        let (buffers, stats) = band?;
        frame.append(buffers)?;
        total = total.merge(stats);
    }
    Ok((frame, total))
}

#[cfg(feature = "cli")]
fn cmd_render(
    view: ViewArgs,
    algorithm: String,
    accel: Option<String>,
    bands: u32,
    output: Option<PathBuf>,
) {
    let desc = load_or_demo(view.scene.as_ref());
    let algorithm = parse_algorithm(&algorithm, &view);
    let kind = accel.map(|a| a.parse::<AccelKind>().unwrap_or_else(|e| fail("Argument error", e)));
    let scene = desc.build(kind);

    let start = Instant::now();
    let (frame, stats) = render_banded(&scene, algorithm, &desc.raymarch, &view, bands)
        .unwrap_or_else(|e| fail("Render error", e));
    let elapsed = start.elapsed();

    println!("{} / {} ({}x{})", algorithm, scene.accel_kind(), view.width, view.height);
    print_stats(&stats, elapsed);

    if let Some(path) = output {
        let json = serde_json::to_string(&frame).unwrap_or_else(|e| fail("Serialization error", e));
        match std::fs::write(&path, json) {
            Ok(()) => println!("Wrote buffers to {}", path.display()),
            Err(e) => fail("Write error", e),
        }
    }
}

#[cfg(feature = "cli")]
fn print_stats(stats: &FrameStats, elapsed: std::time::Duration) {
    println!("  hit ratio      : {:.3}", stats.hit_ratio());
    println!(
        "  sdf evaluations: mean {:.2}, max {}",
        stats.mean_evaluations(),
        stats.max_evaluations
    );
    println!(
        "  iterations     : mean {:.2}, max {}",
        stats.mean_iterations(),
        stats.max_iterations
    );
    println!("  skips          : {}", stats.total_skips);
    println!("  time           : {:.3}ms", elapsed.as_secs_f64() * 1000.0);
}

#[cfg(feature = "cli")]
fn cmd_compare(view: ViewArgs) {
    let desc = load_or_demo(view.scene.as_ref());
    let camera = Camera::orbit(view.pitch, view.yaw, view.distance);

    let combos: Vec<(Algorithm, AccelKind)> = Algorithm::ALL
        .iter()
        .flat_map(|&a| AccelKind::ALL.iter().map(move |&k| (a, k)))
        .map(|(a, k)| (a.with_overshoot(view.overshoot).with_step(view.step), k))
        .collect();

    let rows: Vec<(Algorithm, AccelKind, Result<FrameStats, MarchError>, f64)> = combos
        .into_par_iter()
        .map(|(algorithm, kind)| {
            let mut scene = desc.build(Some(kind));
            let start = Instant::now();
            let result = render_frame(
                &mut scene,
                algorithm,
                &desc.raymarch,
                &camera,
                view.width,
                view.height,
                view.time,
            )
            .map(|(_, stats)| stats);
            (algorithm, kind, result, start.elapsed().as_secs_f64() * 1000.0)
        })
        .collect();

    println!(
        "{:<18} {:<7} {:>6} {:>10} {:>10} {:>8} {:>10}",
        "algorithm", "accel", "hits", "mean sdf", "mean iter", "skips", "time ms"
    );
    for (algorithm, kind, result, ms) in rows {
        match result {
            Ok(s) => println!(
                "{:<18} {:<7} {:>6.3} {:>10.2} {:>10.2} {:>8} {:>10.3}",
                algorithm.name(),
                kind.name(),
                s.hit_ratio(),
                s.mean_evaluations(),
                s.mean_iterations(),
                s.total_skips,
                ms
            ),
            Err(e) => println!("{:<18} {:<7} error: {}", algorithm.name(), kind.name(), e),
        }
    }
}
