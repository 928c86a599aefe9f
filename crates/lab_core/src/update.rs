use lab_logging::{lab_debug, lab_warn};

use crate::{
    classify, AppState, Classification, Effect, JobOutcome, JobRequest, ManageOperation, Msg,
    QueueMessage,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::ControlActivated { control, request } => {
            if let Err(reason) = check_request(&state, &request) {
                state.set_last_message(&reason);
                return (state, vec![Effect::ShowMessage { text: reason }]);
            }
            match state.start_job(control, &request) {
                Some(job_id) => {
                    lab_debug!("Job {} bound to control {:?}", job_id, control);
                    vec![Effect::StartJob { job_id, request }]
                }
                // Control is disabled while its job runs.
                None => Vec::new(),
            }
        }
        Msg::ViewModelClicked => match state.selection() {
            Some(selection) => vec![Effect::OpenModelPlots {
                endpoint: selection.endpoint.clone(),
                version: selection.version,
            }],
            None => Vec::new(),
        },
        Msg::ModelSelected { endpoint, version } => {
            state.select(endpoint, version);
            Vec::new()
        }
        Msg::ModelsLoaded {
            endpoints,
            versions_changed,
        } => {
            state.set_models(endpoints, versions_changed);
            Vec::new()
        }
        Msg::Queue(message) => apply_queue_message(&mut state, message),
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}

fn check_request(state: &AppState, request: &JobRequest) -> Result<(), String> {
    request.validate()?;
    if let JobRequest::Manage {
        endpoint,
        operation: ManageOperation::Import { .. },
        ..
    } = request
    {
        if state.has_endpoint(endpoint) {
            return Err(format!("Endpoint {endpoint} already exists"));
        }
    }
    Ok(())
}

/// Classifies one drained queue message and applies the resulting state
/// transition. Unclassifiable messages are logged and dropped.
fn apply_queue_message(state: &mut AppState, message: QueueMessage) -> Vec<Effect> {
    let classification = match classify(&message, |job_id| state.running_kind(job_id)) {
        Ok(classification) => classification,
        Err(err) => {
            lab_warn!("Dropping queue message {:?}: {}", message.text, err);
            return Vec::new();
        }
    };

    let text = message.text;
    let mut effects = Vec::new();
    let mut show = true;
    match classification {
        Classification::GenericInfo => {}
        Classification::Finished {
            job_id,
            refresh_versions,
        } => {
            state.finish_job(job_id, JobOutcome::Succeeded, &text);
            if refresh_versions {
                effects.push(Effect::RefreshModels {
                    versions_changed: true,
                });
            }
        }
        Classification::Build {
            job_id,
            outcome,
            artifacts,
        } => {
            state.finish_job(job_id, outcome, &text);
            if outcome == JobOutcome::Succeeded && !artifacts.is_empty() {
                effects.push(Effect::OpenViewer { artifacts });
            }
            effects.push(Effect::RefreshModels {
                versions_changed: false,
            });
        }
        Classification::View {
            job_id,
            outcome,
            artifacts,
        } => {
            state.finish_job(job_id, outcome, &text);
            if outcome == JobOutcome::Succeeded {
                // The plot itself is the answer.
                show = false;
                if !artifacts.is_empty() {
                    effects.push(Effect::OpenViewer { artifacts });
                }
            }
        }
        Classification::ErrorReport { job_id } => {
            if let Some(job_id) = job_id {
                state.finish_job(job_id, JobOutcome::Failed, &text);
            }
        }
    }

    if !text.is_empty() {
        state.set_last_message(&text);
        if show {
            effects.push(Effect::ShowMessage { text });
        }
    }
    effects
}
