use std::fmt;
use std::path::PathBuf;

use crate::{JobId, JobKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Succeeded,
    Failed,
}

/// Tag carried by every message a worker pushes onto the result queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    /// Free-form information. Never terminal.
    Info,
    /// A manage or predict job ran to completion.
    Finished { refresh_versions: bool },
    /// Terminal status of a build job; `artifacts` are the plots to open.
    BuildStatus {
        outcome: JobOutcome,
        artifacts: Vec<PathBuf>,
    },
    /// Terminal status of a view job; `artifacts` are the plots to open.
    ViewStatus {
        outcome: JobOutcome,
        artifacts: Vec<PathBuf>,
    },
    /// Job-fatal failure (spawn error, `ERROR:` line, unexpected exit).
    Error,
}

/// One status message travelling from a worker thread to the UI loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    pub job_id: Option<JobId>,
    pub kind: MessageKind,
    pub text: String,
}

impl QueueMessage {
    pub fn info(job_id: Option<JobId>, text: impl Into<String>) -> Self {
        Self {
            job_id,
            kind: MessageKind::Info,
            text: text.into(),
        }
    }

    pub fn finished(job_id: JobId, refresh_versions: bool, text: impl Into<String>) -> Self {
        Self {
            job_id: Some(job_id),
            kind: MessageKind::Finished { refresh_versions },
            text: text.into(),
        }
    }

    pub fn build_status(
        job_id: JobId,
        outcome: JobOutcome,
        artifacts: Vec<PathBuf>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            job_id: Some(job_id),
            kind: MessageKind::BuildStatus { outcome, artifacts },
            text: text.into(),
        }
    }

    pub fn view_status(
        job_id: JobId,
        outcome: JobOutcome,
        artifacts: Vec<PathBuf>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            job_id: Some(job_id),
            kind: MessageKind::ViewStatus { outcome, artifacts },
            text: text.into(),
        }
    }

    pub fn error(job_id: Option<JobId>, text: impl Into<String>) -> Self {
        Self {
            job_id,
            kind: MessageKind::Error,
            text: text.into(),
        }
    }

    /// Whether this message ends the lifecycle of the job it names.
    pub fn is_terminal(&self) -> bool {
        self.job_id.is_some() && !matches!(self.kind, MessageKind::Info)
    }
}

/// Result of classifying a drained message against the jobs the UI knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    GenericInfo,
    Finished {
        job_id: JobId,
        refresh_versions: bool,
    },
    Build {
        job_id: JobId,
        outcome: JobOutcome,
        artifacts: Vec<PathBuf>,
    },
    View {
        job_id: JobId,
        outcome: JobOutcome,
        artifacts: Vec<PathBuf>,
    },
    ErrorReport {
        job_id: Option<JobId>,
    },
}

/// A queue message the UI loop cannot act on. Logged and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Terminal message for a job that is not running (unknown or already finished).
    UnknownJob(JobId),
    /// Status tag does not belong to the job's kind.
    KindMismatch { job_id: JobId, job_kind: JobKind },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::UnknownJob(job_id) => write!(f, "message for unknown job {job_id}"),
            ProtocolError::KindMismatch { job_id, job_kind } => {
                write!(f, "status tag does not match {job_kind:?} job {job_id}")
            }
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Classifies a message given a lookup of the kind of each running job.
pub fn classify(
    msg: &QueueMessage,
    running_kind: impl Fn(JobId) -> Option<JobKind>,
) -> Result<Classification, ProtocolError> {
    let Some(job_id) = msg.job_id else {
        return Ok(match msg.kind {
            MessageKind::Error => Classification::ErrorReport { job_id: None },
            _ => Classification::GenericInfo,
        });
    };
    if matches!(msg.kind, MessageKind::Info) {
        return Ok(Classification::GenericInfo);
    }

    let job_kind = running_kind(job_id).ok_or(ProtocolError::UnknownJob(job_id))?;
    let mismatch = ProtocolError::KindMismatch { job_id, job_kind };
    match &msg.kind {
        MessageKind::Info => Ok(Classification::GenericInfo),
        MessageKind::Error => Ok(Classification::ErrorReport {
            job_id: Some(job_id),
        }),
        MessageKind::Finished { refresh_versions } => match job_kind {
            JobKind::Manage | JobKind::Predict => Ok(Classification::Finished {
                job_id,
                refresh_versions: *refresh_versions,
            }),
            _ => Err(mismatch),
        },
        MessageKind::BuildStatus { outcome, artifacts } => match job_kind {
            JobKind::Build => Ok(Classification::Build {
                job_id,
                outcome: *outcome,
                artifacts: artifacts.clone(),
            }),
            _ => Err(mismatch),
        },
        MessageKind::ViewStatus { outcome, artifacts } => match job_kind {
            JobKind::View => Ok(Classification::View {
                job_id,
                outcome: *outcome,
                artifacts: artifacts.clone(),
            }),
            _ => Err(mismatch),
        },
    }
}
