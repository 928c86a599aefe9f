use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// One terminator-delimited unit of a multi-record molecule file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoleculeRecord {
    /// 1-based position in the input.
    pub index: usize,
    /// Raw lines, terminator included.
    pub lines: Vec<String>,
}

impl MoleculeRecord {
    pub fn text(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}

/// One value reported by the model for a molecule.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictedItem {
    Value(f64),
    Text(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionOutcome {
    pub record_index: usize,
    pub normalized: bool,
    pub value: Option<f64>,
    pub error_message: Option<String>,
    /// Everything the model returned, primary value first.
    pub items: Vec<PredictedItem>,
}

impl PredictionOutcome {
    pub fn not_normalized(record_index: usize, reason: impl Into<String>) -> Self {
        Self {
            record_index,
            normalized: false,
            value: None,
            error_message: Some(non_empty(reason.into(), "normalization failed")),
            items: Vec::new(),
        }
    }

    pub fn prediction_failed(record_index: usize, reason: impl Into<String>) -> Self {
        Self {
            record_index,
            normalized: true,
            value: None,
            error_message: Some(non_empty(reason.into(), "prediction failed")),
            items: Vec::new(),
        }
    }

    /// The first item is the primary result; a failed first item fails the record.
    pub fn predicted(record_index: usize, items: Vec<PredictedItem>) -> Self {
        let (value, error_message) = match items.first() {
            Some(PredictedItem::Value(value)) => (Some(*value), None),
            Some(PredictedItem::Text(_)) => (None, None),
            Some(PredictedItem::Failed(reason)) => {
                (None, Some(non_empty(reason.clone(), "prediction failed")))
            }
            None => (None, Some("no prediction returned".to_string())),
        };
        Self {
            record_index,
            normalized: true,
            value,
            error_message,
            items,
        }
    }

    pub fn is_success(&self) -> bool {
        self.normalized && self.error_message.is_none()
    }
}

fn non_empty(reason: String, fallback: &str) -> String {
    if reason.trim().is_empty() {
        fallback.to_string()
    } else {
        reason
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    pub overall_success: bool,
    pub outcomes: Vec<PredictionOutcome>,
    pub top_level_error: Option<String>,
}

impl BatchResult {
    pub fn completed(outcomes: Vec<PredictionOutcome>) -> Self {
        Self {
            overall_success: true,
            outcomes,
            top_level_error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            overall_success: false,
            outcomes: Vec::new(),
            top_level_error: Some(error.into()),
        }
    }
}

#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("could not launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{0}")]
    Remote(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("cannot read {path:?}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("endpoint {0} not found")]
    UnknownEndpoint(String),
    #[error("No versions directory found for {0}")]
    NoVersions(String),
    #[error("version {version} of {endpoint} not found")]
    UnknownVersion { endpoint: String, version: u32 },
}

#[derive(Debug, Error)]
pub enum PluginLoadError {
    #[error("no model plugin at {0:?}")]
    Missing(PathBuf),
    #[error("model plugin at {0:?} is not executable")]
    NotExecutable(PathBuf),
}
