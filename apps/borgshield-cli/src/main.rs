use anyhow::Context;
use borgshield_input::{fire, scene_targets};
use borgshield_kernel::{SceneConfig, ShieldParameters, ShieldScene};
use borgshield_render::{DebugTextRenderer, RenderView, Renderer, SoftwareShieldRenderer, shield};
use clap::{Parser, Subcommand};
use glam::{Vec2, Vec3};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "borgshield-cli", about = "Headless tools for the shield effect")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate info and the effective scene configuration
    Info,
    /// Step the scene over time and report ripple intensity at a probe point
    Simulate {
        /// Impact as "x,y,z@t"; repeatable. Defaults to one centre shot at t=0.
        #[arg(long = "hit", value_parser = parse_hit)]
        hits: Vec<HitArg>,
        /// Probe point as "x,y,z"
        #[arg(long, value_parser = parse_vec3, default_value = "0.5,0,1.6")]
        probe: Vec3,
        /// Seconds to simulate
        #[arg(long, default_value = "2.5")]
        duration: f32,
        /// Seconds per frame
        #[arg(long, default_value = "0.25")]
        step: f32,
    },
    /// Render the shield from the default camera as ASCII art
    Frame {
        /// Scene time of the frame
        #[arg(short, long, default_value = "0.4")]
        time: f32,
        /// Impact as "x,y,z@t"; repeatable. Defaults to one centre shot at t=0.
        #[arg(long = "hit", value_parser = parse_hit)]
        hits: Vec<HitArg>,
        #[arg(
            long,
            default_value = "72",
            value_parser = clap::value_parser!(u32).range(1..=MAX_FRAME_SIDE)
        )]
        width: u32,
        #[arg(
            long,
            default_value = "36",
            value_parser = clap::value_parser!(u32).range(1..=MAX_FRAME_SIDE)
        )]
        height: u32,
    },
}

/// Largest ASCII frame side, in cells.
const MAX_FRAME_SIDE: i64 = 4096;

/// Most frames a single run may step through.
const MAX_FRAMES: f32 = 1_000_000.0;

#[derive(Debug, Clone, Copy)]
struct HitArg {
    position: Vec3,
    time: f32,
}

fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let parts: Vec<f32> = s
        .split(',')
        .map(|p| p.trim().parse::<f32>().map_err(|e| format!("{p:?}: {e}")))
        .collect::<Result<_, _>>()?;
    match parts.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(format!("expected x,y,z, got {s:?}")),
    }
}

fn parse_hit(s: &str) -> Result<HitArg, String> {
    let (pos, time) = s
        .split_once('@')
        .ok_or_else(|| format!("expected x,y,z@t, got {s:?}"))?;
    Ok(HitArg {
        position: parse_vec3(pos)?,
        time: time
            .trim()
            .parse()
            .map_err(|e| format!("bad time {time:?}: {e}"))?,
    })
}

/// Impacts in time order; with none given, one shot down the default view axis at t=0.
fn resolve_hits(scene: &ShieldScene, view: &RenderView, mut hits: Vec<HitArg>) -> Vec<HitArg> {
    if hits.is_empty() {
        let config = scene.config();
        let targets = scene_targets(
            config.cube_edge,
            &scene.cube_transform(),
            config.shield_edge,
            &scene.shield_transform(),
        );
        if let Some(position) = fire(&view.ray(Vec2::ZERO, 1.0), &targets) {
            hits.push(HitArg {
                position,
                time: 0.0,
            });
        }
    }
    hits.sort_by(|a, b| a.time.total_cmp(&b.time));
    hits
}

/// Reject clocks that would never let [`run_until`] finish.
fn check_timing(until: f32, step: f32) -> anyhow::Result<()> {
    anyhow::ensure!(until.is_finite(), "time must be finite, got {until}");
    anyhow::ensure!(step.is_finite() && step > 0.0, "step must be positive and finite, got {step}");
    anyhow::ensure!(
        until / step <= MAX_FRAMES,
        "{until}s at {step}s per frame exceeds {MAX_FRAMES} frames"
    );
    Ok(())
}

/// Drive the scene frame by frame, recording each impact once its time is reached.
///
/// Returns the frame times visited.
fn run_until(
    scene: &mut ShieldScene,
    hits: &[HitArg],
    until: f32,
    step: f32,
    mut on_frame: impl FnMut(&ShieldScene, &ShieldParameters),
) -> Vec<f32> {
    let mut pending = hits.iter().peekable();
    let mut times = Vec::new();
    let mut frame = 0u32;
    loop {
        let t = frame as f32 * step;
        // A NaN clock never compares greater, so stop on it explicitly.
        if t.is_nan() || until.is_nan() || t > until + 1e-6 {
            break;
        }
        while let Some(hit) = pending.next_if(|h| h.time <= t) {
            scene.on_hit(hit.position, hit.time);
        }
        let params = scene.on_frame(t);
        on_frame(scene, &params);
        times.push(t);
        frame += 1;
    }
    times
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = SceneConfig::load_or_default(cli.config.as_deref())
        .context("loading scene config")?;

    match cli.command {
        Commands::Info => {
            println!("borgshield-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", borgshield_common::crate_info());
            println!("render: {}", borgshield_render::crate_info());
            println!("input: {}", borgshield_input::crate_info());
            println!("config:\n{}", config.to_json_pretty()?);
        }
        Commands::Simulate {
            hits,
            probe,
            duration,
            step,
        } => {
            check_timing(duration, step)?;
            let view = RenderView::default();
            let mut scene = ShieldScene::new(config);
            let hits = resolve_hits(&scene, &view, hits);
            tracing::info!(impacts = hits.len(), duration, step, "starting simulation");
            println!(
                "Simulating {} impact(s) for {duration}s, probe=({:.2}, {:.2}, {:.2})",
                hits.len(),
                probe.x,
                probe.y,
                probe.z
            );

            run_until(&mut scene, &hits, duration, step, |scene, params| {
                let intensity = shield::ripple_intensity(probe, params.time, &params.impacts);
                println!(
                    "t={:6.2}s active={} ripple={intensity:.3}",
                    params.time,
                    scene.impacts().active_count(params.time)
                );
            });
        }
        Commands::Frame {
            time,
            hits,
            width,
            height,
        } => {
            let step = time.max(1e-3) / 4.0;
            check_timing(time, step)?;
            let view = RenderView::default();
            let mut scene = ShieldScene::new(config);
            let hits = resolve_hits(&scene, &view, hits);
            tracing::info!(impacts = hits.len(), time, width, height, "rendering frame");
            run_until(&mut scene, &hits, time, step, |_, _| {});
            let frame = SoftwareShieldRenderer::for_terminal(width, height).render(&scene, &view);
            print!("{}", frame.to_ascii());
            print!("{}", DebugTextRenderer::new().render(&scene, &view));
            println!("coverage: {} px, peak alpha {:.2}", frame.covered(), frame.max_alpha());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hit_spec() {
        let h = parse_hit("1, 0, 1.6@2.5").unwrap();
        assert_eq!(h.position, Vec3::new(1.0, 0.0, 1.6));
        assert_eq!(h.time, 2.5);
        assert!(parse_hit("1,0,1.6").is_err());
        assert!(parse_hit("1,0@2").is_err());
    }

    #[test]
    fn default_hit_lands_on_shield_face() {
        let scene = ShieldScene::default();
        let hits = resolve_hits(&scene, &RenderView::default(), Vec::new());
        assert_eq!(hits.len(), 1);
        assert!((hits[0].position - Vec3::new(0.0, 0.0, 1.6)).length() < 1e-4);
    }

    #[test]
    fn hits_are_sorted_by_time() {
        let scene = ShieldScene::default();
        let given = vec![
            HitArg { position: Vec3::X, time: 2.0 },
            HitArg { position: Vec3::Y, time: 1.0 },
        ];
        let hits = resolve_hits(&scene, &RenderView::default(), given);
        assert_eq!(hits[0].time, 1.0);
    }

    #[test]
    fn run_until_records_due_hits() {
        let mut scene = ShieldScene::default();
        let hits = [
            HitArg { position: Vec3::X, time: 0.3 },
            HitArg { position: Vec3::Y, time: 5.0 },
        ];
        let mut frames = 0;
        let times = run_until(&mut scene, &hits, 1.0, 0.25, |_, _| frames += 1);
        assert_eq!(frames, 5);
        assert_eq!(times.len(), 5);
        assert_eq!(scene.impacts().latest().map(|e| e.position), Some(Vec3::X));
        assert_eq!(scene.elapsed(), 1.0);
    }

    #[test]
    fn non_finite_clocks_are_rejected() {
        assert!(check_timing(f32::NAN, 0.25).is_err());
        assert!(check_timing(f32::INFINITY, 0.25).is_err());
        assert!(check_timing(2.5, f32::INFINITY).is_err());
        assert!(check_timing(2.5, f32::NAN).is_err());
        assert!(check_timing(2.5, 0.0).is_err());
        assert!(check_timing(1e9, 1e-3).is_err());
        assert!(check_timing(2.5, 0.25).is_ok());

        let cli = Cli::try_parse_from(["borgshield-cli", "simulate", "--duration", "NaN"]);
        let Ok(Cli {
            command: Commands::Simulate { duration, step, .. },
            ..
        }) = cli
        else {
            panic!("simulate should parse");
        };
        assert!(check_timing(duration, step).is_err());
    }

    #[test]
    fn run_until_stops_on_nan_clock() {
        let mut scene = ShieldScene::default();
        assert!(run_until(&mut scene, &[], f32::NAN, 0.25, |_, _| {}).is_empty());
        assert!(run_until(&mut scene, &[], 1.0, f32::INFINITY, |_, _| {}).is_empty());
        assert_eq!(scene.frame(), 0);
    }

    #[test]
    fn frame_size_is_capped() {
        let too_wide = ["borgshield-cli", "frame", "--width", "70000"];
        assert!(Cli::try_parse_from(too_wide).is_err());
        assert!(Cli::try_parse_from(["borgshield-cli", "frame", "--height", "0"]).is_err());
        assert!(Cli::try_parse_from(["borgshield-cli", "frame", "--width", "4096"]).is_ok());
    }
}
