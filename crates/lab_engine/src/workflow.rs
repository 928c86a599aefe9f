use std::path::Path;
use std::sync::Arc;

use lab_logging::{lab_debug, lab_warn};

use crate::{ModelPlugin, MoleculeRecord, PredictionOutcome};

/// Normalize-then-predict for one record. Every failure stays inside the
/// returned outcome.
pub struct ModelWorkflow {
    plugin: Arc<dyn ModelPlugin>,
    detail: bool,
}

impl ModelWorkflow {
    pub fn new(plugin: Arc<dyn ModelPlugin>, detail: bool) -> Self {
        Self { plugin, detail }
    }

    /// Runs the workflow on `record`, materialized as the single-record file `unit`.
    pub fn execute(&self, record: &MoleculeRecord, unit: &Path) -> PredictionOutcome {
        let normalized = match self.plugin.normalize(unit) {
            Ok(normalized) => normalized,
            Err(reason) => {
                lab_warn!("Molecule {} not normalized: {}", record.index, reason);
                return PredictionOutcome::not_normalized(record.index, reason);
            }
        };

        match self.plugin.predict(&normalized, self.detail) {
            Ok(items) => {
                lab_debug!("Molecule {} predicted: {:?}", record.index, items);
                PredictionOutcome::predicted(record.index, items)
            }
            Err(reason) => {
                lab_warn!("Molecule {} not predicted: {}", record.index, reason);
                PredictionOutcome::prediction_failed(record.index, reason)
            }
        }
    }
}
