mod app;
mod config;
mod console;
mod effects;

pub use app::run_app;
pub use config::{LabConfig, CONFIG_FILENAME, LOG_FILENAME, ROOT_ENV};
pub use console::{parse_command, render, ConsoleCommand, HELP};
pub use effects::EffectRunner;
