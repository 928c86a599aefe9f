use std::collections::{BTreeMap, BTreeSet};

use lab_logging::lab_warn;

use crate::view_model::{AppViewModel, ControlView, JobRowView};
use crate::{ControlId, Job, JobId, JobKind, JobOutcome, JobRequest, JobState};

/// One endpoint directory and the versions found under it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EndpointSummary {
    pub name: String,
    pub versions: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub endpoint: String,
    pub version: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    disabled: BTreeSet<ControlId>,
    jobs: BTreeMap<JobId, Job>,
    next_job_id: JobId,
    models: Vec<EndpointSummary>,
    selection: Option<Selection>,
    reference_versions: Vec<u32>,
    last_message: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            controls: ControlId::ALL
                .iter()
                .map(|&control| ControlView {
                    control,
                    label: control.label(),
                    enabled: self.is_enabled(control),
                })
                .collect(),
            progress_active: self.jobs.values().any(|job| job.kind == JobKind::Build),
            jobs: self
                .jobs
                .values()
                .map(|job| JobRowView {
                    job_id: job.id,
                    control: job.control,
                    kind: job.kind,
                    state: job.state,
                    arguments: job.arguments.join(" "),
                })
                .collect(),
            models: self.models.clone(),
            selection: self.selection.clone(),
            reference_versions: self.reference_versions.clone(),
            last_message: self.last_message.clone(),
            dirty: self.dirty,
        }
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_enabled(&self, control: ControlId) -> bool {
        !self.disabled.contains(&control)
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn has_endpoint(&self, name: &str) -> bool {
        self.models.iter().any(|model| model.name == name)
    }

    pub fn running_kind(&self, job_id: JobId) -> Option<JobKind> {
        self.jobs
            .get(&job_id)
            .filter(|job| job.state == JobState::Running)
            .map(|job| job.kind)
    }

    /// Creates a job bound to `control` and disables the control.
    ///
    /// Returns `None` while the control is disabled, so a second trigger of a
    /// running control is a no-op.
    pub(crate) fn start_job(&mut self, control: ControlId, request: &JobRequest) -> Option<JobId> {
        if !self.is_enabled(control) {
            return None;
        }
        self.next_job_id += 1;
        let job_id = self.next_job_id;
        let mut job = Job::new(job_id, control, request);
        job.advance(JobState::Running).ok()?;
        self.disabled.insert(control);
        self.jobs.insert(job_id, job);
        self.mark_dirty();
        Some(job_id)
    }

    /// Moves a running job to its terminal state, re-enables its control and
    /// discards it.
    pub(crate) fn finish_job(
        &mut self,
        job_id: JobId,
        outcome: JobOutcome,
        message: &str,
    ) -> Option<Job> {
        let mut job = self.jobs.remove(&job_id)?;
        let terminal = match outcome {
            JobOutcome::Succeeded => JobState::Succeeded,
            JobOutcome::Failed => JobState::Failed,
        };
        if let Err(err) = job.advance(terminal) {
            lab_warn!("{}", err);
        }
        job.message = Some(message.to_string());
        self.disabled.remove(&job.control);
        self.mark_dirty();
        Some(job)
    }

    pub(crate) fn set_models(&mut self, endpoints: Vec<EndpointSummary>, versions_changed: bool) {
        self.models = endpoints;
        let still_present = self.selection.as_ref().is_some_and(|sel| {
            self.models.iter().any(|m| {
                m.name == sel.endpoint && (sel.version == 0 || m.versions.contains(&sel.version))
            })
        });
        if !still_present {
            self.selection = self.models.first().map(|model| Selection {
                endpoint: model.name.clone(),
                version: 0,
            });
        }
        if versions_changed || self.reference_versions.is_empty() {
            let max_versions = self
                .models
                .iter()
                .map(|m| m.versions.len())
                .max()
                .unwrap_or(0)
                .max(1);
            self.reference_versions = (0..max_versions as u32).collect();
        }
        self.mark_dirty();
    }

    pub(crate) fn select(&mut self, endpoint: String, version: u32) {
        self.selection = Some(Selection { endpoint, version });
        self.mark_dirty();
    }

    pub(crate) fn set_last_message(&mut self, text: &str) {
        self.last_message = Some(text.to_string());
        self.mark_dirty();
    }
}
