use crate::{ControlId, EndpointSummary, JobId, JobKind, JobState, Selection};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub controls: Vec<ControlView>,
    /// Indeterminate progress indicator, active while a build runs.
    pub progress_active: bool,
    pub jobs: Vec<JobRowView>,
    pub models: Vec<EndpointSummary>,
    pub selection: Option<Selection>,
    /// Choices offered for the reference version of a series view.
    pub reference_versions: Vec<u32>,
    pub last_message: Option<String>,
    pub dirty: bool,
}

impl AppViewModel {
    pub fn control(&self, control: ControlId) -> Option<&ControlView> {
        self.controls.iter().find(|c| c.control == control)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlView {
    pub control: ControlId,
    pub label: &'static str,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRowView {
    pub job_id: JobId,
    pub control: ControlId,
    pub kind: JobKind,
    pub state: JobState,
    pub arguments: String,
}
