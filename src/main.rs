//! Dragon Walker - twisted dragon curves in 2D and 3D
//!
//! CLI commands:
//! - gui: Interactive viewer
//! - render: Draw a still PNG
//! - animate: Play the drawing animation into PNG frames
//! - points: Dump the generated points as JSON
//! - list: List available presets

mod animation;
mod camera;
mod config;
mod curve;
mod export;
mod gui;
mod logging;
mod render;
mod state;
mod walk;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use config::{default_config, Config, RenderSettings, Settings};
use curve::{check_iterations, CurveParams};
use render::Rgb;
use state::Explorer;

#[derive(Parser)]
#[command(name = "dragon_walker")]
#[command(about = "Twisted dragon curves in 2D and 3D")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to dragon.yaml config
    #[arg(short, long, default_value = "dragon.yaml")]
    config: PathBuf,
}

/// Curve and drawing overrides shared by the headless commands
#[derive(Args, Debug, Clone, Default)]
struct CurveArgs {
    /// Start from a named preset instead of the config defaults
    #[arg(short, long)]
    preset: Option<String>,

    /// Rewriting depth
    #[arg(short, long, allow_negative_numbers = true)]
    iterations: Option<i64>,

    /// Turn angle in degrees
    #[arg(short, long, allow_negative_numbers = true)]
    angle: Option<f64>,

    /// Twist per turn in degrees
    #[arg(short, long, allow_negative_numbers = true)]
    twist: Option<f64>,

    /// Z offset per forward step
    #[arg(short, long, allow_negative_numbers = true)]
    extrusion: Option<f64>,

    /// Animation speed in segments per second
    #[arg(long)]
    speed: Option<u32>,

    /// Perspective 3D view
    #[arg(long = "3d")]
    view_3d: bool,

    /// Flat 2D view even if the preset asks for 3D
    #[arg(long = "2d", conflicts_with = "view_3d")]
    view_2d: bool,

    /// Hue sweep along the curve
    #[arg(long)]
    rainbow: bool,

    /// Single color instead of a gradient
    #[arg(long)]
    solid: bool,

    /// Light background
    #[arg(long)]
    light: bool,

    /// Start color (#rrggbb, #rgb or r,g,b)
    #[arg(long)]
    start_color: Option<String>,

    /// End color (#rrggbb, #rgb or r,g,b)
    #[arg(long)]
    end_color: Option<String>,

    /// Canvas width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Canvas height in pixels
    #[arg(long)]
    height: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch native GUI viewer
    Gui {
        /// Preset to open with
        #[arg(short, long)]
        preset: Option<String>,
    },

    /// Render a still image
    Render {
        #[command(flatten)]
        curve: CurveArgs,

        /// Output PNG path (defaults to <OUTPUT_DIR>/dragon.png)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Play the drawing animation into numbered PNG frames
    Animate {
        #[command(flatten)]
        curve: CurveArgs,

        /// Output directory (defaults to <OUTPUT_DIR>/frames)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write a frame every N segments
        #[arg(long, default_value = "1")]
        every: usize,
    },

    /// Dump the generated points as JSON
    Points {
        #[command(flatten)]
        curve: CurveArgs,

        /// Emit the 3D walk instead of the 2D one
        #[arg(long)]
        spatial: bool,

        /// Include the symbol string
        #[arg(long)]
        symbols: bool,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List available presets
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load();

    logging::init_logging(&settings.log_dir);
    tracing::info!("Dragon Walker starting up");
    tracing::debug!("CLI args parsed: config={:?}", cli.config);

    let config = if cli.config.exists() {
        tracing::info!("Loading config from {:?}", cli.config);
        Config::load(&cli.config)?
    } else {
        tracing::warn!("Config file not found: {:?}, using defaults", cli.config);
        default_config()
    };
    tracing::info!("Config loaded: {} presets", config.presets.len());

    let result = run(cli.command, config, settings).await;
    if let Err(e) = &result {
        log_error!(e, command = "run");
    }
    result
}

async fn run(command: Commands, config: Config, settings: Settings) -> anyhow::Result<()> {
    match command {
        Commands::Gui { preset } => {
            tracing::info!("Launching native GUI viewer");
            gui::run_viewer(config, settings, preset.as_deref())?;
        }

        Commands::Render { curve, output } => {
            let (explorer, render) = build_explorer(&config, &settings, &curve)?;
            let path = output.unwrap_or_else(|| PathBuf::from(&settings.output_dir).join("dragon.png"));
            let drawn = export::render_png(&explorer, render.width, render.height, &path)?;
            println!("{} segments -> {:?}", drawn, path);
        }

        Commands::Animate { curve, output, every } => {
            let (mut explorer, render) = build_explorer(&config, &settings, &curve)?;
            let dir = output.unwrap_or_else(|| PathBuf::from(&settings.output_dir).join("frames"));
            let outcome =
                export::animate_to_dir(&mut explorer, &dir, render.width, render.height, every).await?;
            explorer.teardown();
            println!("Animation {:?} -> {:?}", outcome, dir);
        }

        Commands::Points { curve, spatial, symbols, output } => {
            let (explorer, _) = build_explorer(&config, &settings, &curve)?;
            let value = export::points_json(&explorer, spatial, symbols);
            export::write_json(&value, output.as_ref())?;
        }

        Commands::List => list_presets(&config),
    }

    Ok(())
}

/// Resolve preset + overrides into a ready explorer and the render settings it used
fn build_explorer(
    config: &Config,
    settings: &Settings,
    args: &CurveArgs,
) -> anyhow::Result<(Explorer, RenderSettings)> {
    let (base, preset_3d) = config.resolve(args.preset.as_deref())?;

    let params = CurveParams {
        iterations: match args.iterations {
            Some(n) => check_iterations(n)?,
            None => base.iterations,
        },
        angle: args.angle.unwrap_or(base.angle),
        twist: args.twist.unwrap_or(base.twist),
        extrusion: args.extrusion.unwrap_or(base.extrusion),
        speed: args.speed.unwrap_or(base.speed),
    };

    let mut render = config.render.clone();
    if let Some(w) = args.width {
        render.width = w.max(1);
    }
    if let Some(h) = args.height {
        render.height = h.max(1);
    }
    if let Some(c) = &args.start_color {
        render.start_color = c.parse::<Rgb>()?;
    }
    if let Some(c) = &args.end_color {
        render.end_color = c.parse::<Rgb>()?;
    }
    render.rainbow |= args.rainbow;
    render.gradient &= !args.solid;
    render.dark_mode &= !args.light;

    let view_3d = if args.view_3d {
        true
    } else if args.view_2d {
        false
    } else {
        preset_3d
    };

    tracing::debug!(?params, view_3d, "Building curve");
    let explorer = Explorer::new(params, &render, view_3d, settings.cache_capacity)?;
    Ok((explorer, render))
}

/// List available presets
fn list_presets(config: &Config) {
    let d = &config.defaults;
    println!("Defaults: iterations={} angle={} twist={} extrusion={} speed={}",
        d.iterations, d.angle, d.twist, d.extrusion, d.speed);
    println!();
    println!("Available presets ({}):", config.presets.len());
    for preset in &config.presets {
        let p = &preset.params;
        let mode = match preset.view_3d {
            Some(true) => "3d",
            Some(false) => "2d",
            None => "default",
        };
        println!(
            "  - {} [{}] iterations={} angle={} twist={} extrusion={} view={}",
            preset.name, preset.id, p.iterations, p.angle, p.twist, p.extrusion, mode
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_render_overrides() {
        let cli = Cli::try_parse_from([
            "dragon_walker", "render", "--preset", "twisted", "-i", "6", "--twist", "-15", "--3d",
        ])
        .unwrap();
        match cli.command {
            Commands::Render { curve, output } => {
                assert_eq!(curve.preset.as_deref(), Some("twisted"));
                assert_eq!(curve.iterations, Some(6));
                assert_eq!(curve.twist, Some(-15.0));
                assert!(curve.view_3d);
                assert!(output.is_none());
            }
            _ => panic!("expected render"),
        }
    }

    #[test]
    fn test_build_explorer_applies_overrides() {
        let settings = Settings {
            log_dir: "logs".to_string(),
            output_dir: "./out".to_string(),
            cache_capacity: 4,
        };
        let args = CurveArgs {
            iterations: Some(3),
            angle: Some(60.0),
            solid: true,
            width: Some(200),
            ..Default::default()
        };
        let (explorer, render) = build_explorer(&default_config(), &settings, &args).unwrap();
        assert_eq!(explorer.params().iterations, 3);
        assert_eq!(explorer.params().angle, 60.0);
        assert_eq!(explorer.segment_count(), 8);
        assert!(!render.gradient);
        assert_eq!(render.width, 200);
    }

    #[test]
    fn test_build_explorer_rejects_bad_input() {
        let settings = Settings {
            log_dir: "logs".to_string(),
            output_dir: "./out".to_string(),
            cache_capacity: 4,
        };
        let config = default_config();

        let negative = CurveArgs { iterations: Some(-1), ..Default::default() };
        assert!(build_explorer(&config, &settings, &negative).is_err());

        let color = CurveArgs { start_color: Some("#zzzzzz".to_string()), ..Default::default() };
        assert!(build_explorer(&config, &settings, &color).is_err());

        let preset = CurveArgs { preset: Some("nope".to_string()), ..Default::default() };
        assert!(build_explorer(&config, &settings, &preset).is_err());
    }

    #[test]
    fn test_build_explorer_rejects_non_finite_overrides() {
        let settings = Settings {
            log_dir: "logs".to_string(),
            output_dir: "./out".to_string(),
            cache_capacity: 4,
        };
        let config = default_config();

        let cli = Cli::try_parse_from(["dragon_walker", "render", "-i", "4", "--angle", "nan"]).unwrap();
        let Commands::Render { curve, .. } = cli.command else {
            panic!("expected render");
        };
        assert!(curve.angle.is_some_and(f64::is_nan));
        assert!(build_explorer(&config, &settings, &curve).is_err());

        let wild = CurveArgs {
            angle: Some(-5000.0),
            extrusion: Some(1e308),
            ..Default::default()
        };
        assert!(build_explorer(&config, &settings, &wild).is_err());
    }
}
