mod command;
mod replay;
mod runner;
mod settings;
mod util;

pub use command::Command;
pub use replay::{ReplayReport, TraceOp, parse_trace, replay};
pub use runner::{OutputMode, run_with_format};
pub use settings::{AppConfig, find_config_paths, load_layered, load_layered_with};
pub use util::parse_output_mode;
