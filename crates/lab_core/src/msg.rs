use crate::{ControlId, EndpointSummary, JobRequest, QueueMessage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User activated one of the job controls.
    ControlActivated {
        control: ControlId,
        request: JobRequest,
    },
    /// User asked for the quality plots of the selected version.
    ViewModelClicked,
    /// User selected an endpoint version in the model list.
    ModelSelected { endpoint: String, version: u32 },
    /// The model list was re-read from disk.
    ModelsLoaded {
        endpoints: Vec<EndpointSummary>,
        versions_changed: bool,
    },
    /// A message drained from the result queue during a poll tick.
    Queue(QueueMessage),
    /// Poll tick.
    Tick,
}
