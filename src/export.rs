//! Exporters - PNG stills, headless animation frames and point dumps
//!
//! The headless animation runs the same `Explorer` pipeline as the
//! viewer; a tokio timer paces the ticks and Ctrl-C cancels the run.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

use crate::animation::Tick;
use crate::curve::symbols_to_string;
use crate::render::RasterSurface;
use crate::state::Explorer;
use crate::walk::{Point2, Point3};

/// Draw the static view into a PNG
pub fn render_png(explorer: &Explorer, width: u32, height: u32, path: &Path) -> anyhow::Result<usize> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut surface = RasterSurface::new(width, height);
    let drawn = explorer.draw(&mut surface);
    surface.save(path)?;
    info!("Rendered {} segments to {}", drawn, path.display());
    Ok(drawn)
}

/// How a headless run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Finished,
    Cancelled,
}

#[derive(Debug, Serialize)]
struct FrameEntry {
    file: String,
    revealed: usize,
}

/// Play the animation, writing a frame every `every` ticks
///
/// The final frame is always the full static view, whether the run
/// finished or was cancelled.
pub async fn animate_to_dir(
    explorer: &mut Explorer,
    output_dir: &Path,
    width: u32,
    height: u32,
    every: usize,
) -> anyhow::Result<RunOutcome> {
    std::fs::create_dir_all(output_dir)?;
    let every = every.max(1);

    if !explorer.start_animation(Instant::now())? {
        anyhow::bail!("Animation already running");
    }
    let total = explorer.segment_count();
    println!(
        "Animating {} segments at {} segments/s (Ctrl-C to cancel)...",
        total,
        explorer.params().speed
    );

    let mut frames: Vec<FrameEntry> = Vec::new();
    let mut surface = RasterSurface::new(width, height);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let outcome = loop {
        // The next tick is only scheduled once the previous frame is written
        let wait = explorer.animation().until_next(Instant::now()).unwrap_or_default();
        tokio::select! {
            _ = tokio::time::sleep(wait) => {
                match explorer.poll_animation(Instant::now())? {
                    Some(Tick::Frame(n)) if n % every == 0 => {
                        let file = format!("frame_{:06}.png", n);
                        explorer.draw(&mut surface);
                        surface.save(&output_dir.join(&file))?;
                        frames.push(FrameEntry { file, revealed: n });
                        print!("\r[{}/{}]", n, total);
                    }
                    Some(Tick::Frame(_)) | None => {}
                    Some(Tick::Finished) => break RunOutcome::Finished,
                }
            }
            _ = &mut ctrl_c => {
                explorer.cancel_animation();
                break RunOutcome::Cancelled;
            }
        }
    };
    println!();

    let file = "final.png".to_string();
    explorer.draw(&mut surface);
    surface.save(&output_dir.join(&file))?;
    frames.push(FrameEntry { file, revealed: total });

    write_index(explorer, output_dir, &frames, outcome);
    info!("Animation {:?}: {} frames in {}", outcome, frames.len(), output_dir.display());
    Ok(outcome)
}

fn write_index(explorer: &Explorer, output_dir: &Path, frames: &[FrameEntry], outcome: RunOutcome) {
    let index = serde_json::json!({
        "generated": chrono::Local::now().to_rfc3339(),
        "params": explorer.params(),
        "segments": explorer.segment_count(),
        "outcome": outcome,
        "frames": frames,
    });
    let index_path = output_dir.join("index.json");
    match serde_json::to_string_pretty(&index) {
        Ok(text) => match std::fs::write(&index_path, text) {
            Ok(()) => info!("Wrote {}", index_path.display()),
            Err(e) => warn!("Failed to write {}: {}", index_path.display(), e),
        },
        Err(e) => warn!("Failed to serialize frame index: {}", e),
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Points {
    Flat(Vec<Point2>),
    Spatial(Vec<Point3>),
}

/// Point sequence (and optionally the symbol string) as JSON
pub fn points_json(explorer: &Explorer, spatial: bool, with_symbols: bool) -> serde_json::Value {
    let points = if spatial {
        Points::Spatial(explorer.points_3d().to_vec())
    } else {
        Points::Flat(explorer.points_2d().to_vec())
    };

    let mut value = serde_json::json!({
        "params": explorer.params(),
        "dimension": if spatial { 3 } else { 2 },
        "num_points": explorer.points_2d().len(),
        "points": points,
    });
    if with_symbols {
        value["symbols"] = serde_json::Value::String(symbols_to_string(explorer.symbols()));
    }
    value
}

/// Write JSON to a file or stdout
pub fn write_json(value: &serde_json::Value, output: Option<&PathBuf>) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(path, text)?;
            info!("Wrote {}", path.display());
        }
        None => println!("{}", text),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderSettings;
    use crate::curve::CurveParams;

    fn explorer() -> Explorer {
        let params = CurveParams { iterations: 2, ..Default::default() };
        Explorer::new(params, &RenderSettings::default(), false, 2).unwrap()
    }

    #[test]
    fn test_points_json_shape() {
        let e = explorer();
        let flat = points_json(&e, false, true);
        assert_eq!(flat["dimension"], 2);
        assert_eq!(flat["num_points"], 5);
        assert_eq!(flat["symbols"], "A+B+A-B");
        assert_eq!(flat["points"][0], serde_json::json!([0.0, 0.0]));

        let spatial = points_json(&e, true, false);
        assert_eq!(spatial["points"][4].as_array().unwrap().len(), 3);
        assert!(spatial.get("symbols").is_none());
        assert_eq!(spatial["params"]["iterations"], 2);
    }

    #[test]
    fn test_render_png_writes_file() {
        let dir = std::env::temp_dir().join(format!("dragon_walker_test_{}", std::process::id()));
        let path = dir.join("still.png");
        let drawn = render_png(&explorer(), 64, 48, &path).unwrap();
        assert_eq!(drawn, 4);
        assert!(path.exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_animate_to_dir_finishes() {
        let dir = std::env::temp_dir().join(format!("dragon_walker_anim_{}", std::process::id()));
        let params = CurveParams { iterations: 2, speed: 1000, ..Default::default() };
        let mut e = Explorer::new(params, &RenderSettings::default(), false, 2).unwrap();

        let outcome = animate_to_dir(&mut e, &dir, 32, 32, 2).await.unwrap();
        assert_eq!(outcome, RunOutcome::Finished);
        assert!(e.controls_enabled());
        assert!(dir.join("frame_000000.png").exists());
        assert!(dir.join("frame_000002.png").exists());
        assert!(!dir.join("frame_000001.png").exists());
        assert!(dir.join("final.png").exists());
        assert!(dir.join("index.json").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
