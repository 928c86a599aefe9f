use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use lab_core::VersionSelector;
use lab_logging::{lab_debug, lab_error, lab_info, lab_warn};
use tempfile::NamedTempFile;

use crate::{
    BatchResult, InputError, ModelRepository, ModelWorkflow, MoleculeRecord, PluginRegistry,
    PredictionOutcome, RecordSplitter,
};

/// Top-level error reported when the input file cannot be opened.
pub const NO_INPUT: &str = "no input";

/// Drives a workflow over every record of a molecule file, strictly in order.
#[derive(Debug, Clone)]
pub struct BatchPredictor {
    scratch_dir: PathBuf,
}

impl BatchPredictor {
    pub fn new(scratch_dir: PathBuf) -> Self {
        Self { scratch_dir }
    }

    pub fn run_batch(&self, input: &Path, workflow: &ModelWorkflow) -> BatchResult {
        let file = match open_input(input) {
            Ok(file) => file,
            Err(err) => {
                lab_warn!("{}", err);
                return BatchResult::failed(NO_INPUT);
            }
        };

        // Only an unopenable input fails the run. A read error mid-stream
        // ends the batch with the records already predicted.
        let mut outcomes = Vec::new();
        for record in RecordSplitter::new(BufReader::new(file)) {
            let record = match record {
                Ok(record) => record,
                Err(err) => {
                    lab_error!(
                        "Reading {:?} stopped after {} molecules: {}",
                        input,
                        outcomes.len(),
                        err
                    );
                    break;
                }
            };
            outcomes.push(self.run_record(&record, workflow));
        }

        lab_info!("Processed {} molecules from {:?}", outcomes.len(), input);
        BatchResult::completed(outcomes)
    }

    /// Resolves the model version, loads its plugin and runs the batch.
    /// Unresolvable endpoints, versions or plugins fail the whole run.
    pub fn predict(
        &self,
        repository: &ModelRepository,
        plugins: &PluginRegistry,
        endpoint: &str,
        version: VersionSelector,
        input: &Path,
        detail: bool,
    ) -> BatchResult {
        let version_dir = match repository.resolve(endpoint, version) {
            Ok(dir) => dir,
            Err(err) => return BatchResult::failed(err.to_string()),
        };
        let plugin = match plugins.load(&version_dir) {
            Ok(plugin) => plugin,
            Err(err) => return BatchResult::failed(err.to_string()),
        };
        self.run_batch(input, &ModelWorkflow::new(plugin, detail))
    }

    fn run_record(&self, record: &MoleculeRecord, workflow: &ModelWorkflow) -> PredictionOutcome {
        let unit = match self.materialize(record) {
            Ok(unit) => unit,
            Err(err) => {
                lab_warn!("Cannot materialize molecule {}: {}", record.index, err);
                return PredictionOutcome::not_normalized(
                    record.index,
                    format!("cannot write molecule {}: {err}", record.index),
                );
            }
        };
        let outcome = workflow.execute(record, unit.path());
        if let Err(err) = unit.close() {
            lab_warn!("Cannot remove unit for molecule {}: {}", record.index, err);
        }
        lab_debug!("Released molecule {}", record.index);
        outcome
    }

    fn materialize(&self, record: &MoleculeRecord) -> io::Result<NamedTempFile> {
        fs::create_dir_all(&self.scratch_dir)?;
        let mut unit = tempfile::Builder::new()
            .prefix(&format!("m{:010}-", record.index))
            .suffix(".sdf")
            .tempfile_in(&self.scratch_dir)?;
        unit.write_all(record.text().as_bytes())?;
        unit.flush()?;
        Ok(unit)
    }
}

fn open_input(input: &Path) -> Result<File, InputError> {
    File::open(input).map_err(|source| InputError::Unreadable {
        path: input.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_input_is_unreadable() {
        let temp = tempfile::TempDir::new().unwrap();
        let missing = temp.path().join("none.sdf");

        match open_input(&missing) {
            Err(InputError::Unreadable { path, source }) => {
                assert_eq!(path, missing);
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
