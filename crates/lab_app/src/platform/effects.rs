use std::path::PathBuf;
use std::process::{Command, Stdio};

use chrono::Local;
use lab_core::{Effect, Msg};
use lab_engine::JobDispatcher;
use lab_logging::{lab_info, lab_warn};

/// Plots stored in every built version directory.
const MODEL_PLOTS: [&str; 2] = ["recalculated.png", "predicted.png"];

/// Executes effects produced by `update`. Anything that must flow back into
/// the state machine is returned as follow-up messages.
pub struct EffectRunner {
    dispatcher: JobDispatcher,
    viewer: Option<String>,
}

impl EffectRunner {
    pub fn new(dispatcher: JobDispatcher, viewer: Option<String>) -> Self {
        Self { dispatcher, viewer }
    }

    pub fn run(&self, effects: Vec<Effect>) -> Vec<Msg> {
        let mut follow_up = Vec::new();
        for effect in effects {
            match effect {
                Effect::StartJob { job_id, request } => {
                    // Workers are detached; completion arrives through the result queue.
                    let _ = self.dispatcher.start(job_id, request);
                }
                Effect::RefreshModels { versions_changed } => {
                    follow_up.push(self.load_models(versions_changed));
                }
                Effect::OpenViewer { artifacts } => self.open(&artifacts),
                Effect::OpenModelPlots { endpoint, version } => {
                    let plots =
                        self.dispatcher
                            .repository()
                            .existing_files(&endpoint, version, &MODEL_PLOTS);
                    if plots.is_empty() {
                        notify(&format!("No plots found for {endpoint} version {version}"));
                    } else {
                        self.open(&plots);
                    }
                }
                Effect::ShowMessage { text } => notify(&text),
            }
        }
        follow_up
    }

    pub fn load_models(&self, versions_changed: bool) -> Msg {
        let endpoints = self.dispatcher.repository().list();
        lab_info!("Loaded {} endpoints", endpoints.len());
        Msg::ModelsLoaded {
            endpoints,
            versions_changed,
        }
    }

    fn open(&self, artifacts: &[PathBuf]) {
        let Some(viewer) = &self.viewer else {
            for artifact in artifacts {
                notify(&format!("plot: {}", artifact.display()));
            }
            return;
        };
        let spawned = Command::new(viewer)
            .args(artifacts)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        if let Err(err) = spawned {
            lab_warn!("Cannot start viewer {}: {}", viewer, err);
            notify(&format!("Cannot start viewer {viewer}"));
        }
    }
}

pub(crate) fn notify(text: &str) {
    println!("[{}] {}", Local::now().format("%H:%M:%S"), text);
}
