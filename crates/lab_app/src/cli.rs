//! Command-line prediction driver.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use lab_core::VersionSelector;
use lab_engine::{
    render_interactive, write_programmatic, BatchPredictor, BatchResult, EngineConfig,
    ModelRepository, PluginRegistry, ProcessInvoker, AUTOMATED_INPUT, AUTOMATED_LIBRARY_PATHS,
};
use lab_logging::lab_info;

pub const USAGE: &str = "predict -e endpoint [-f filename.sdf][-v 1|last]";

#[derive(Debug, Parser, Clone, PartialEq)]
#[command(name = "predict", about = "Predict a molecule file with an eTOXlab model", override_usage = USAGE)]
pub struct PredictArgs {
    /// Endpoint to predict with
    #[arg(short = 'e')]
    pub endpoint: Option<String>,

    /// Multi-molecule SDF file
    #[arg(short = 'f')]
    pub file: Option<PathBuf>,

    /// Model version: a number or `last`
    #[arg(short = 'v', value_parser = parse_selector)]
    pub version: Option<VersionSelector>,

    /// Automated mode: read ./input_file.sdf with the last version and write results.json
    #[arg(short = 'a')]
    pub automated: bool,

    /// Ask the model for extended prediction output
    #[arg(long)]
    pub detail: bool,
}

fn parse_selector(text: &str) -> Result<VersionSelector, String> {
    text.parse()
}

/// Fully resolved prediction request.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictPlan {
    pub endpoint: String,
    pub input: PathBuf,
    pub version: VersionSelector,
    pub automated: bool,
    pub detail: bool,
}

impl PredictArgs {
    /// Automated mode forces the input path and the last version. Every other
    /// combination needs an endpoint, an input file and a version.
    pub fn plan(self) -> Option<PredictPlan> {
        let (input, version) = if self.automated {
            (PathBuf::from(AUTOMATED_INPUT), VersionSelector::Last)
        } else {
            (self.file?, self.version?)
        };
        let endpoint = self.endpoint.filter(|e| !e.is_empty())?;
        Some(PredictPlan {
            endpoint,
            input,
            version,
            automated: self.automated,
            detail: self.detail,
        })
    }
}

/// Runs the plan against `config`. Automated runs write the result triples
/// into `out_dir`; interactive runs return the text to print.
pub fn run_predict(
    plan: &PredictPlan,
    mut config: EngineConfig,
    out_dir: &Path,
) -> anyhow::Result<Option<String>> {
    if plan.automated {
        config
            .library_paths
            .extend(AUTOMATED_LIBRARY_PATHS.iter().map(PathBuf::from));
    }
    lab_info!(
        "Predicting {:?} with {} version {}",
        plan.input,
        plan.endpoint,
        plan.version
    );

    let repository = ModelRepository::new(config.models_root.clone());
    let plugins = PluginRegistry::new(
        Arc::new(ProcessInvoker),
        config.plugin_program.clone(),
        config.plugin_env(),
        config.error_marker.clone(),
    );
    let result = BatchPredictor::new(config.scratch_dir.clone()).predict(
        &repository,
        &plugins,
        &plan.endpoint,
        plan.version,
        &plan.input,
        plan.detail,
    );
    present(plan, &result, &config.results_file, out_dir)
}

pub fn present(
    plan: &PredictPlan,
    result: &BatchResult,
    results_file: &str,
    out_dir: &Path,
) -> anyhow::Result<Option<String>> {
    if plan.automated {
        write_programmatic(result, out_dir, results_file)
            .with_context(|| format!("cannot write {results_file}"))?;
        Ok(None)
    } else {
        Ok(Some(render_interactive(result)))
    }
}
