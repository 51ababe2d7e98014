use boxfit::config::{self, ConfigError, ResizerConfig};
use boxfit::imaging::{Quality, ResampleFilter, RustCodec, TargetBox};
use boxfit::{BoxFitResizer, ResizeOutcome, output};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Box dimensions; each falls back to the config file when omitted.
#[derive(clap::Args, Clone)]
struct BoxArgs {
    /// Box width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Box height in pixels
    #[arg(long)]
    height: Option<u32>,
}

impl BoxArgs {
    /// Apply the flags over the config file's box and build it.
    fn target_box(&self, config: &mut ResizerConfig) -> Result<TargetBox, ConfigError> {
        if let Some(width) = self.width {
            config.target.width = width;
        }
        if let Some(height) = self.height {
            config.target.height = height;
        }
        config.target_box()
    }
}

fn version_string() -> &'static str {
    let on_tag = env!("BOXFIT_ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("BOXFIT_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "boxfit")]
#[command(about = "Resize images to fit a box, preserving aspect ratio")]
#[command(long_about = "\
Resize images to fit a box, preserving aspect ratio

The longer edge of the source is scaled to the matching box edge:
landscape and square images take the box width, portrait images take
the box height. The other edge follows the aspect ratio.

  boxfit resize photo.jpg small.jpg --width 800 --height 600
  boxfit plan photo.jpg --width 800 --height 600

The output format follows the destination extension (jpg, png, gif,
bmp, tif, webp). Pixel density (DPI) is carried over except for GIF and WebP.

Run 'boxfit gen-config' to generate a documented boxfit.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (optional; defaults apply when it does not exist)
    #[arg(long, default_value = "boxfit.toml", global = true)]
    config: PathBuf,

    /// More log output on stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resize SOURCE into the box and write DESTINATION
    Resize {
        source: PathBuf,
        destination: PathBuf,
        #[command(flatten)]
        box_args: BoxArgs,
        /// Resampling filter
        #[arg(long, value_enum)]
        filter: Option<ResampleFilter>,
        /// JPEG quality (1-100)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
        quality: Option<u32>,
    },
    /// Show the size SOURCE would be resized to, without writing anything
    Plan {
        source: PathBuf,
        #[command(flatten)]
        box_args: BoxArgs,
    },
    /// Print a stock boxfit.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Resize {
            source,
            destination,
            box_args,
            filter,
            quality,
        } => {
            let mut config = config::load_config(&cli.config)?;
            let target = box_args.target_box(&mut config)?;
            let resizer = BoxFitResizer::with_codec(target, RustCodec::new())
                .filter(filter.unwrap_or(config.resample.filter))
                .quality(quality.map(Quality::new).unwrap_or_else(|| config.quality()));

            let outcome = resizer.resize(&source, &destination)?;
            output::print_resize_output(&source, &destination, target, &outcome);
            if outcome == ResizeOutcome::SourceMissing {
                std::process::exit(1);
            }
        }
        Command::Plan { source, box_args } => {
            let mut config = config::load_config(&cli.config)?;
            let target = box_args.target_box(&mut config)?;
            let resizer = BoxFitResizer::with_codec(target, RustCodec::new());

            let plan = resizer.plan(&source)?;
            output::print_plan_output(&source, target, plan.as_ref());
            if plan.is_none() {
                std::process::exit(1);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Send `tracing` output to stderr, filtered by `RUST_LOG` or the `-v` count.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
