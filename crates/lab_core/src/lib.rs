//! eTOXlab core: pure UI state machine for background model jobs.
mod effect;
mod job;
mod message;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use job::{
    CommandName, ControlId, Job, JobId, JobKind, JobRequest, JobState, ManageOperation,
    ReferenceModel, TransitionError, VersionSelector, ViewType,
};
pub use message::{classify, Classification, JobOutcome, MessageKind, ProtocolError, QueueMessage};
pub use msg::Msg;
pub use state::{AppState, EndpointSummary, Selection};
pub use update::update;
pub use view_model::{AppViewModel, ControlView, JobRowView};
