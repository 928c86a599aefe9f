use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub type JobId = u64;

/// UI controls that can trigger a background job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ControlId {
    NewEndpoint,
    ShowInfo,
    Publish,
    Remove,
    GetSeries,
    Export,
    Import,
    Build,
    ViewSeries,
    ViewQuery,
    Predict,
}

impl ControlId {
    pub const ALL: [ControlId; 11] = [
        ControlId::NewEndpoint,
        ControlId::ShowInfo,
        ControlId::Publish,
        ControlId::Remove,
        ControlId::GetSeries,
        ControlId::Export,
        ControlId::Import,
        ControlId::Build,
        ControlId::ViewSeries,
        ControlId::ViewQuery,
        ControlId::Predict,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ControlId::NewEndpoint => "new endpoint",
            ControlId::ShowInfo => "get information",
            ControlId::Publish => "publish model",
            ControlId::Remove => "remove model",
            ControlId::GetSeries => "get series",
            ControlId::Export => "export",
            ControlId::Import => "import",
            ControlId::Build => "build model",
            ControlId::ViewSeries => "view series",
            ControlId::ViewQuery => "view query",
            ControlId::Predict => "predict",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Manage,
    Build,
    View,
    Predict,
}

/// Lifecycle of a job. Transitions only move forward:
/// `Pending -> Running -> {Succeeded, Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobState {
    #[default]
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl JobState {
    fn rank(self) -> u8 {
        match self {
            JobState::Pending => 0,
            JobState::Running => 1,
            JobState::Succeeded | JobState::Failed => 2,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.rank() == 2
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionError {
    pub job_id: JobId,
    pub from: JobState,
    pub to: JobState,
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "job {} cannot move from {:?} to {:?}",
            self.job_id, self.from, self.to
        )
    }
}

impl std::error::Error for TransitionError {}

/// The executables behind the three families of external operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandName {
    Manage,
    Build,
    View,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManageOperation {
    New { tag: String },
    Info,
    Publish,
    Remove,
    GetSeries,
    Export,
    Import { archive: PathBuf },
}

impl ManageOperation {
    /// Operations that write into a user-chosen directory.
    pub fn needs_destination(&self) -> bool {
        matches!(self, ManageOperation::GetSeries | ManageOperation::Export)
    }

    /// Successful completion changes the set of endpoints or versions on disk.
    pub fn changes_versions(&self) -> bool {
        !matches!(
            self,
            ManageOperation::Info | ManageOperation::GetSeries | ManageOperation::Export
        )
    }

    fn flags(&self) -> Vec<String> {
        match self {
            ManageOperation::New { tag } => {
                vec!["-t".to_string(), tag.clone(), "--new".to_string()]
            }
            ManageOperation::Info => vec!["--info=long".to_string()],
            ManageOperation::Publish => vec!["--publish".to_string()],
            ManageOperation::Remove => vec!["--remove".to_string()],
            ManageOperation::GetSeries => vec!["--get=series".to_string()],
            ManageOperation::Export => vec!["--export".to_string()],
            ManageOperation::Import { archive } => {
                vec![format!("--import={}", archive.display())]
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewType {
    Pca,
    Property,
    Project,
}

impl ViewType {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewType::Pca => "pca",
            ViewType::Property => "property",
            ViewType::Project => "project",
        }
    }

    /// Plot written by the view executable into its working directory.
    pub fn artifact_name(self) -> &'static str {
        match self {
            ViewType::Pca | ViewType::Project => "pca-scores12.png",
            ViewType::Property => "property.png",
        }
    }
}

impl FromStr for ViewType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pca" => Ok(ViewType::Pca),
            "property" => Ok(ViewType::Property),
            "project" => Ok(ViewType::Project),
            other => Err(format!("unknown view type '{other}'")),
        }
    }
}

/// Version argument accepted by the prediction driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSelector {
    Last,
    Number(u32),
}

impl FromStr for VersionSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.contains("last") {
            return Ok(VersionSelector::Last);
        }
        s.parse::<u32>()
            .map(VersionSelector::Number)
            .map_err(|_| format!("invalid version '{s}'"))
    }
}

impl fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSelector::Last => write!(f, "last"),
            VersionSelector::Number(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceModel {
    pub endpoint: String,
    pub version: u32,
}

/// Everything a worker needs to run one job. Immutable once dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobRequest {
    Manage {
        endpoint: String,
        version: Option<u32>,
        operation: ManageOperation,
        destination: Option<PathBuf>,
    },
    Build {
        endpoint: String,
        version: u32,
        series: Option<PathBuf>,
    },
    View {
        endpoint: String,
        version: u32,
        view_type: ViewType,
        reference: Option<ReferenceModel>,
        query: Option<PathBuf>,
        background: bool,
    },
    Predict {
        endpoint: String,
        version: VersionSelector,
        input: PathBuf,
        detail: bool,
    },
}

impl JobRequest {
    pub fn kind(&self) -> JobKind {
        match self {
            JobRequest::Manage { .. } => JobKind::Manage,
            JobRequest::Build { .. } => JobKind::Build,
            JobRequest::View { .. } => JobKind::View,
            JobRequest::Predict { .. } => JobKind::Predict,
        }
    }

    pub fn endpoint(&self) -> &str {
        match self {
            JobRequest::Manage { endpoint, .. }
            | JobRequest::Build { endpoint, .. }
            | JobRequest::View { endpoint, .. }
            | JobRequest::Predict { endpoint, .. } => endpoint,
        }
    }

    /// External executable for this request; `None` for in-process batch prediction.
    pub fn command(&self) -> Option<CommandName> {
        match self {
            JobRequest::Manage { .. } => Some(CommandName::Manage),
            JobRequest::Build { .. } => Some(CommandName::Build),
            JobRequest::View { .. } => Some(CommandName::View),
            JobRequest::Predict { .. } => None,
        }
    }

    /// Noun used in user-facing status text, e.g. "Building failed".
    pub fn operation_label(&self) -> &'static str {
        match self {
            JobRequest::Manage { .. } => "Process",
            JobRequest::Build { .. } => "Building",
            JobRequest::View { .. } => "View process",
            JobRequest::Predict { .. } => "Prediction",
        }
    }

    /// Rejects requests the UI should never dispatch.
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint().trim().is_empty() {
            return Err("Please provide the name of the endpoint".to_string());
        }
        match self {
            JobRequest::Manage {
                operation: ManageOperation::New { tag },
                ..
            } if tag.trim().is_empty() => {
                Err("Please provide the label of the eTOXsys web service".to_string())
            }
            JobRequest::Predict { input, .. } if input.as_os_str().is_empty() => {
                Err("Please provide a molecule file".to_string())
            }
            _ => Ok(()),
        }
    }

    /// Flat positional/flag argument list for the external executable.
    pub fn arguments(&self) -> Vec<String> {
        let mut args = vec!["-e".to_string(), self.endpoint().to_string()];
        match self {
            JobRequest::Manage {
                version, operation, ..
            } => {
                if let Some(version) = version {
                    args.push("-v".to_string());
                    args.push(version.to_string());
                }
                args.extend(operation.flags());
            }
            JobRequest::Build {
                version, series, ..
            } => {
                args.push("-v".to_string());
                args.push(version.to_string());
                if let Some(series) = series {
                    args.push("-f".to_string());
                    args.push(series.display().to_string());
                }
            }
            JobRequest::View {
                version,
                view_type,
                reference,
                query,
                background,
                ..
            } => {
                args.push("-v".to_string());
                args.push(version.to_string());
                args.push(format!("--type={}", view_type.as_str()));
                if let Some(query) = query {
                    args.push("-f".to_string());
                    args.push(query.display().to_string());
                }
                match reference {
                    Some(reference) => {
                        args.push(format!("--refname={}", reference.endpoint));
                        args.push(format!("--refver={}", reference.version));
                    }
                    None => args.push("--refver=0".to_string()),
                }
                if *background {
                    args.push("--background".to_string());
                }
            }
            JobRequest::Predict {
                version,
                input,
                detail,
                ..
            } => {
                args.push("-v".to_string());
                args.push(version.to_string());
                args.push("-f".to_string());
                args.push(input.display().to_string());
                if *detail {
                    args.push("--detail".to_string());
                }
            }
        }
        args
    }
}

/// UI-side record of a dispatched job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    pub kind: JobKind,
    pub control: ControlId,
    pub arguments: Vec<String>,
    pub state: JobState,
    pub message: Option<String>,
}

impl Job {
    pub fn new(id: JobId, control: ControlId, request: &JobRequest) -> Self {
        Self {
            id,
            kind: request.kind(),
            control,
            arguments: request.arguments(),
            state: JobState::Pending,
            message: None,
        }
    }

    pub fn advance(&mut self, to: JobState) -> Result<(), TransitionError> {
        if self.state.is_terminal() || to.rank() <= self.state.rank() {
            return Err(TransitionError {
                job_id: self.id,
                from: self.state,
                to,
            });
        }
        self.state = to;
        Ok(())
    }
}
