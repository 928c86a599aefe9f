use std::path::Path;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use lab_app::cli::{run_predict, PredictArgs, USAGE};
use lab_app::platform::{LabConfig, LOG_FILENAME};

fn main() -> anyhow::Result<()> {
    let args = match PredictArgs::try_parse() {
        Ok(args) => args,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = err.print();
            std::process::exit(0);
        }
        Err(err) => {
            let _ = err.print();
            std::process::exit(1);
        }
    };
    let Some(plan) = args.plan() else {
        eprintln!("{USAGE}");
        std::process::exit(1);
    };

    let (config, warning) = LabConfig::load();
    lab_logging::initialize(config.log_destination, Path::new(LOG_FILENAME));
    config.report(warning.as_deref());
    if let Some(warning) = &warning {
        eprintln!("Warning: {warning}; using defaults");
    }

    let work_dir = std::env::current_dir().context("cannot determine working directory")?;
    let engine = config.engine_config(work_dir.clone());
    if let Some(text) = run_predict(&plan, engine, &work_dir)? {
        print!("{text}");
    }
    Ok(())
}
