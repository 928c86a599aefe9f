use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use lab_logging::lab_info;
use serde::{Deserialize, Serialize};

use crate::{AtomicFileWriter, BatchResult, PersistError, PredictedItem, PredictionOutcome};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TripleValue {
    Number(f64),
    Text(String),
}

impl TripleValue {
    fn empty() -> Self {
        TripleValue::Text(String::new())
    }
}

/// `(value, status, message)`: status 0 with an empty message on success,
/// status 1 with the reason otherwise. Serialized as a JSON array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultTriple(pub TripleValue, pub u8, pub String);

/// Human-readable rendering: formatted values per molecule followed by a blank
/// line, or the failure reason on a single line.
pub fn render_interactive(result: &BatchResult) -> String {
    let mut out = String::new();
    if !result.overall_success {
        let _ = writeln!(out, "{}", result.top_level_error.as_deref().unwrap_or_default());
        return out;
    }
    for outcome in &result.outcomes {
        if outcome.is_success() {
            for item in &outcome.items {
                match item {
                    PredictedItem::Value(value) => {
                        let _ = writeln!(out, "{value:8.3}");
                    }
                    PredictedItem::Text(text) => {
                        let _ = writeln!(out, "{text}");
                    }
                    PredictedItem::Failed(reason) => {
                        let _ = writeln!(out, "ERROR: {reason}");
                    }
                }
            }
            out.push('\n');
        } else {
            let _ = writeln!(
                out,
                "molecule {}: {}",
                outcome.record_index,
                outcome.error_message.as_deref().unwrap_or_default()
            );
        }
    }
    out
}

/// One triple per outcome in input order, or a single failure triple when the
/// run itself failed. Never fails: errors are encoded as status 1.
pub fn to_triples(result: &BatchResult) -> Vec<ResultTriple> {
    if !result.overall_success {
        return vec![ResultTriple(
            TripleValue::empty(),
            1,
            result.top_level_error.clone().unwrap_or_default(),
        )];
    }
    result.outcomes.iter().map(outcome_triple).collect()
}

fn outcome_triple(outcome: &PredictionOutcome) -> ResultTriple {
    if let Some(reason) = &outcome.error_message {
        return ResultTriple(TripleValue::empty(), 1, reason.clone());
    }
    let value = match (outcome.value, outcome.items.first()) {
        (Some(value), _) => TripleValue::Number(value),
        (None, Some(PredictedItem::Text(text))) => TripleValue::Text(text.clone()),
        _ => TripleValue::empty(),
    };
    ResultTriple(value, 0, String::new())
}

/// Persists the triples of `result` as `{dir}/{file_name}`.
pub fn write_programmatic(
    result: &BatchResult,
    dir: &Path,
    file_name: &str,
) -> Result<PathBuf, PersistError> {
    let triples = to_triples(result);
    let path = AtomicFileWriter::new(dir.to_path_buf()).write_json(file_name, &triples)?;
    lab_info!("Wrote {} results to {:?}", triples.len(), path);
    Ok(path)
}
