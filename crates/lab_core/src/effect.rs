use std::path::PathBuf;

use crate::{JobId, JobRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Launch one worker bound to `job_id`.
    StartJob { job_id: JobId, request: JobRequest },
    /// Re-read the model list; `versions_changed` also refreshes version choices.
    RefreshModels { versions_changed: bool },
    /// Open a result viewer on freshly produced plots.
    OpenViewer { artifacts: Vec<PathBuf> },
    /// Open the quality plots stored in a version directory.
    OpenModelPlots { endpoint: String, version: u32 },
    /// Present a short message to the user.
    ShowMessage { text: String },
}
