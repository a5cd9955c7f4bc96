pub mod background;
pub mod cli;
pub mod config;
pub mod contours;
pub mod display;
pub mod error;
pub mod frame;
pub mod grid;
pub mod mapper;
pub mod projection;

pub use background::{BackgroundSubtractor, GaussianMixture};
pub use cli::{execute, execute_to, run, run_cli, Cli, Commands, ConfigSubcommand, RunArgs, SourceKind};
pub use config::{load_config, save_config, Config};
pub use error::{MapperError, Result};
pub use frame::{DirectorySource, FrameSource, SyntheticSource};
pub use grid::{Cell, GridSnapshot, OccupancyGrid};
pub use mapper::{Detection, FrameReport, OccupancyMapper};
