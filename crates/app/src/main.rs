mod headless;
mod live;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use energy_sphere_core::AppConfig;
use rand::{rngs::StdRng, SeedableRng};
use tracing_subscriber::EnvFilter;

fn main() -> energy_sphere_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Live { preset, seed } => {
            let config = load_config(preset.as_deref())?;
            live::run(config, scene_rng(seed))
        }
        Commands::Headless {
            preset,
            seed,
            frames,
            width,
            height,
            output,
        } => {
            let config = load_config(preset.as_deref())?;
            let options = headless::HeadlessOptions {
                frames,
                width,
                height,
            };
            headless::run(&config, options, scene_rng(seed), output.as_deref())
        }
        Commands::Config { preset } => {
            let config = load_config(preset.as_deref())?;
            println!("{}", config.to_json_pretty()?);
            Ok(())
        }
    }
}

fn load_config(preset: Option<&Path>) -> energy_sphere_core::Result<AppConfig> {
    match preset {
        Some(path) => {
            tracing::info!(?path, "loading preset");
            AppConfig::load(path)
        }
        None => Ok(AppConfig::default()),
    }
}

fn scene_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Animated starfield and energy sphere backdrop", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open a window and animate the backdrop until it is closed.
    Live {
        /// Optional JSON preset overriding the default configuration.
        #[arg(short, long)]
        preset: Option<PathBuf>,
        /// Seed for the procedural scene; random when omitted.
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Run a fixed number of frames without a window and report the result.
    Headless {
        #[arg(short, long)]
        preset: Option<PathBuf>,
        #[arg(short, long)]
        seed: Option<u64>,
        /// Number of frames to simulate at the reference frame rate.
        #[arg(short, long, default_value_t = 600)]
        frames: u64,
        #[arg(long, default_value_t = 1280.0)]
        width: f32,
        #[arg(long, default_value_t = 720.0)]
        height: f32,
        /// Where to write the JSON report; stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the effective configuration as JSON.
    Config {
        #[arg(short, long)]
        preset: Option<PathBuf>,
    },
}
