use crate::background::GaussianMixture;
use crate::config::{config_path, load_config, save_config, Config};
use crate::display::{AsciiSink, GridSink, PngSink};
use crate::error::{MapperError, Result};
use crate::frame::{frame_dir, DirectorySource, FrameSource, SyntheticSource};
use crate::grid::GridSnapshot;
use crate::mapper::OccupancyMapper;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "occupancy-mapper",
    version,
    about = "Builds a 2D occupancy grid from foreground objects in video frames"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Map frames into the occupancy grid
    Run(RunArgs),
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigSubcommand,
    },
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct RunArgs {
    /// Configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Where frames come from
    #[arg(short, long, value_enum, default_value_t = SourceKind::Synthetic)]
    pub source: SourceKind,
    /// Directory containing frames for the `directory` source
    #[arg(short, long)]
    pub dir: Option<PathBuf>,
    /// Number of frames to process, 0 for all the source provides
    #[arg(short = 'n', long)]
    pub frames: Option<u32>,
    /// Write the grid to this PNG after every frame
    #[arg(long)]
    pub png: Option<PathBuf>,
    /// Pixels per grid cell in the PNG
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u32).range(1..=64))]
    pub scale: u32,
    /// Print the grid as text after every frame
    #[arg(long)]
    pub ascii: bool,
    /// Print the final occupied cells as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Synthetic,
    Directory,
    Camera,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the effective configuration
    Show {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Write the default configuration
    Init {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn run_cli() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
    let cli = Cli::parse();
    if let Err(e) = execute(cli) {
        error!("{e}");
        std::process::exit(1);
    }
}

pub fn execute(cli: Cli) -> Result<()> {
    execute_to(cli, io::stdout().lock())
}

pub fn execute_to<W: Write>(cli: Cli, mut out: W) -> Result<()> {
    match cli.command {
        Commands::Run(args) => run(&args, out).map(|_| ()),
        Commands::Config { action } => match action {
            ConfigSubcommand::Show { config } => {
                let cfg = load_checked(config)?;
                serde_json::to_writer_pretty(&mut out, &cfg)?;
                writeln!(out)?;
                Ok(())
            }
            ConfigSubcommand::Init { config, force } => {
                let path = config.unwrap_or_else(config_path);
                if path.exists() && !force {
                    return Err(MapperError::AlreadyExists(path));
                }
                save_config(&path, &Config::default())?;
                info!(path = %path.display(), "default configuration written");
                Ok(())
            }
        },
    }
}

fn load_checked(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(config_path);
    let cfg = load_config(&path)?;
    cfg.validate()?;
    Ok(cfg)
}

fn open_source(args: &RunArgs, cfg: &Config) -> Result<Box<dyn FrameSource>> {
    match args.source {
        SourceKind::Synthetic => Ok(Box::new(SyntheticSource::new(cfg.synthetic.clone()))),
        SourceKind::Directory => {
            let dir = args.dir.clone().unwrap_or_else(frame_dir);
            Ok(Box::new(DirectorySource::new(&dir)?))
        }
        SourceKind::Camera => open_camera(),
    }
}

#[cfg(feature = "camera")]
fn open_camera() -> Result<Box<dyn FrameSource>> {
    Ok(Box::new(crate::frame::CameraSource::open()?))
}

#[cfg(not(feature = "camera"))]
fn open_camera() -> Result<Box<dyn FrameSource>> {
    Err(MapperError::Camera(
        "built without the `camera` feature".into(),
    ))
}

/// Runs the acquire / subtract / detect / mark / display loop and returns
/// the final grid. Text and JSON output go to `out`.
pub fn run<W: Write>(args: &RunArgs, mut out: W) -> Result<GridSnapshot> {
    let cfg = load_checked(args.config.clone())?;
    let limit = args.frames.unwrap_or(cfg.frames);
    let mut source = open_source(args, &cfg)?;
    let mut mapper = OccupancyMapper::new(GaussianMixture::new(cfg.subtractor.clone()), &cfg);
    info!(
        source = ?args.source,
        frames = limit,
        rows = mapper.grid().rows(),
        cols = mapper.grid().cols(),
        "mapping started"
    );

    {
        let mut sinks: Vec<Box<dyn GridSink + '_>> = Vec::new();
        if let Some(path) = &args.png {
            sinks.push(Box::new(PngSink::new(path.clone(), args.scale)));
        }
        if args.ascii {
            sinks.push(Box::new(AsciiSink::new(&mut out)));
        }

        let mut processed = 0u32;
        while limit == 0 || processed < limit {
            let Some(frame) = source.next_frame()? else {
                debug!(processed, "frame source exhausted");
                break;
            };
            let report = mapper.process(&frame)?;
            for sink in sinks.iter_mut() {
                sink.show(mapper.grid(), &report)?;
            }
            processed += 1;
        }
    }

    let snapshot = mapper.grid().snapshot();
    info!(
        frames = mapper.frames_processed(),
        occupied = snapshot.occupied.len(),
        "mapping finished"
    );
    if args.json {
        serde_json::to_writer_pretty(&mut out, &snapshot)?;
        writeln!(out)?;
    }
    Ok(snapshot)
}
