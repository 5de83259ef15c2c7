use clap::Parser;
use log::info;
use potion_scene::app::{run_cli, run_sequence};
use potion_scene::io::config::{Config, EXAMPLE_CONFIG};

/// Offline renderer for the candle-lit potion table scene.
#[derive(Parser, Debug)]
#[command(name = "potion-scene", version)]
#[command(about = "Renders the potion table scene to PNG")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Output image, overrides `render.output`
    #[arg(short, long, value_name = "PNG")]
    output: Option<String>,

    /// Scene time in seconds
    #[arg(long)]
    time: Option<f32>,

    /// Render a sequence of this many frames
    #[arg(long)]
    frames: Option<usize>,

    /// Frame rate of the sequence
    #[arg(long)]
    fps: Option<f32>,

    /// Seed for the flame flicker
    #[arg(long)]
    seed: Option<u64>,

    /// Print a commented configuration file and exit
    #[arg(long)]
    print_example_config: bool,
}

impl Cli {
    fn load_config(&self) -> Result<Config, String> {
        let mut config = match &self.config {
            Some(path) => {
                info!("Loading config file: {}", path);
                Config::load(path)?
            }
            None => {
                info!("No config file given, using defaults");
                Config::default()
            }
        };

        if let Some(output) = &self.output {
            config.render.output = output.clone();
        }
        if let Some(time) = self.time {
            config.scene.time = time;
        }
        if let Some(frames) = self.frames {
            config.animation.frames = frames;
        }
        if let Some(fps) = self.fps {
            config.animation.fps = fps;
        }
        if let Some(seed) = self.seed {
            config.scene.seed = seed;
        }
        Ok(config)
    }
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    if cli.print_example_config {
        print!("{}", EXAMPLE_CONFIG);
        return Ok(());
    }

    let config = cli.load_config()?;
    if config.animation.frames > 1 {
        let dir = run_sequence(&config)?;
        info!("Frames written to '{}'", dir.display());
    } else {
        run_cli(&config)?;
    }
    Ok(())
}
