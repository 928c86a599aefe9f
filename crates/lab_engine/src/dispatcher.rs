use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use lab_core::{
    CommandName, JobId, JobOutcome, JobRequest, ManageOperation, QueueMessage, VersionSelector,
    ViewType,
};
use lab_logging::{lab_error, lab_info, lab_warn};

use crate::process::{abort_on_marker, CommandRunner, CommandSpec, ProcessOutput};
use crate::{
    render_interactive, AtomicFileWriter, BatchPredictor, EngineConfig, InvokeError, ModelRepository,
    PluginRegistry, QueueSender,
};

/// Launches one worker thread per job. Each worker pushes exactly one
/// terminal message onto the result queue before it exits.
pub struct JobDispatcher {
    worker: Arc<Worker>,
    sender: QueueSender,
}

impl JobDispatcher {
    pub fn new(config: EngineConfig, runner: Arc<dyn CommandRunner>, sender: QueueSender) -> Self {
        let plugins = PluginRegistry::new(
            runner.clone(),
            config.plugin_program.clone(),
            config.plugin_env(),
            config.error_marker.clone(),
        );
        let worker = Worker {
            repository: ModelRepository::new(config.models_root.clone()),
            plugins,
            runner,
            config,
        };
        Self {
            worker: Arc::new(worker),
            sender,
        }
    }

    pub fn repository(&self) -> &ModelRepository {
        &self.worker.repository
    }

    pub fn plugins(&self) -> &PluginRegistry {
        &self.worker.plugins
    }

    /// Starts the worker for `job_id`. If no thread can be spawned the
    /// terminal failure is queued right away and `None` is returned.
    pub fn start(&self, job_id: JobId, request: JobRequest) -> Option<JoinHandle<()>> {
        let failure = format!("{} failed", request.operation_label());
        lab_info!(
            "Starting job {} ({:?}) args={:?}",
            job_id,
            request.kind(),
            request.arguments()
        );

        let worker = self.worker.clone();
        let sender = self.sender.clone();
        let spawned = thread::Builder::new()
            .name(format!("job-{job_id}"))
            .spawn({
                let failure = failure.clone();
                move || {
                    let result = panic::catch_unwind(AssertUnwindSafe(|| {
                        worker.run(job_id, &request, &sender)
                    }));
                    let terminal = result.unwrap_or_else(|_| {
                        lab_error!("Job {} panicked", job_id);
                        QueueMessage::error(Some(job_id), failure)
                    });
                    sender.send(terminal);
                }
            });

        match spawned {
            Ok(handle) => Some(handle),
            Err(err) => {
                lab_error!("Cannot spawn worker for job {}: {}", job_id, err);
                self.sender.send(QueueMessage::error(Some(job_id), failure));
                None
            }
        }
    }
}

struct Worker {
    config: EngineConfig,
    runner: Arc<dyn CommandRunner>,
    repository: ModelRepository,
    plugins: PluginRegistry,
}

impl Worker {
    /// Runs the job and returns its terminal message. Intermediate messages
    /// go straight to `sender`.
    fn run(&self, job_id: JobId, request: &JobRequest, sender: &QueueSender) -> QueueMessage {
        match request {
            JobRequest::Manage {
                operation,
                destination,
                ..
            } => self.run_manage(job_id, request, operation, destination.clone(), sender),
            JobRequest::Build {
                endpoint, version, ..
            } => self.run_build(job_id, request, endpoint, *version),
            JobRequest::View { view_type, .. } => self.run_view(job_id, request, *view_type),
            JobRequest::Predict {
                endpoint,
                version,
                input,
                detail,
            } => self.run_predict(job_id, endpoint, *version, input, *detail),
        }
    }

    fn invoke(
        &self,
        command: CommandName,
        request: &JobRequest,
        working_dir: Option<PathBuf>,
    ) -> Result<ProcessOutput, InvokeError> {
        let mut spec = CommandSpec::new(self.config.program(command), request.arguments());
        spec.working_dir = working_dir;
        self.runner
            .run(&spec, &mut abort_on_marker(&self.config.error_marker))
    }

    fn run_manage(
        &self,
        job_id: JobId,
        request: &JobRequest,
        operation: &ManageOperation,
        destination: Option<PathBuf>,
        sender: &QueueSender,
    ) -> QueueMessage {
        if operation.needs_destination() && destination.is_none() {
            sender.send(QueueMessage::info(
                Some(job_id),
                "Select a directory to save the data",
            ));
            return QueueMessage::error(Some(job_id), "Process failed");
        }

        match self.invoke(CommandName::Manage, request, destination) {
            Ok(output) if output.success() => {
                if *operation == ManageOperation::Info {
                    QueueMessage::finished(job_id, false, info_details(&output.lines))
                } else {
                    QueueMessage::finished(job_id, operation.changes_versions(), "Process finished")
                }
            }
            Ok(output) => {
                lab_warn!("Job {} manage exited with {:?}", job_id, output.exit_code);
                QueueMessage::error(Some(job_id), "Process failed")
            }
            Err(InvokeError::Remote(line)) => QueueMessage::error(Some(job_id), line),
            Err(err) => {
                lab_warn!("Job {} manage failed: {}", job_id, err);
                QueueMessage::error(Some(job_id), "Process failed")
            }
        }
    }

    fn run_build(
        &self,
        job_id: JobId,
        request: &JobRequest,
        endpoint: &str,
        version: u32,
    ) -> QueueMessage {
        let failed = |text: String| {
            QueueMessage::build_status(job_id, JobOutcome::Failed, Vec::new(), text)
        };
        let output = match self.invoke(CommandName::Build, request, None) {
            Ok(output) => output,
            Err(InvokeError::Remote(line)) => return failed(format!("Building failed: {line}")),
            Err(err) => {
                lab_warn!("Job {} build failed: {}", job_id, err);
                return failed("Building failed".to_string());
            }
        };

        let log = AtomicFileWriter::new(self.config.tools_dir.clone());
        if let Err(err) = log.write(&self.config.build_log, output.lines.join("\n").as_bytes()) {
            lab_warn!("Cannot write {}: {}", self.config.build_log, err);
        }

        if output.last_line() == Some(self.config.build_sentinel.as_str()) {
            let plots = self.repository.artifacts(endpoint, version, "pls-", "png");
            QueueMessage::build_status(job_id, JobOutcome::Succeeded, plots, "Building completed")
        } else {
            failed("Building failed".to_string())
        }
    }

    fn run_view(&self, job_id: JobId, request: &JobRequest, view_type: ViewType) -> QueueMessage {
        let work_dir = self.config.work_dir.clone();
        if let Err(err) = fs::create_dir_all(&work_dir) {
            lab_warn!("Cannot create view directory {:?}: {}", work_dir, err);
        }
        match self.invoke(CommandName::View, request, Some(work_dir)) {
            Ok(output) if !output.success() => {
                lab_warn!("Job {} view exited with {:?}", job_id, output.exit_code);
                QueueMessage::error(Some(job_id), "Unknown error")
            }
            Ok(_) => {
                let artifact = self.config.work_path(view_type.artifact_name());
                QueueMessage::view_status(
                    job_id,
                    JobOutcome::Succeeded,
                    vec![artifact],
                    "View completed",
                )
            }
            Err(InvokeError::Remote(line)) => QueueMessage::error(Some(job_id), line),
            Err(err) => {
                lab_warn!("Job {} view failed: {}", job_id, err);
                QueueMessage::error(Some(job_id), "View process failed")
            }
        }
    }

    fn run_predict(
        &self,
        job_id: JobId,
        endpoint: &str,
        version: VersionSelector,
        input: &Path,
        detail: bool,
    ) -> QueueMessage {
        let predictor = BatchPredictor::new(self.config.scratch_dir.clone());
        let result =
            predictor.predict(&self.repository, &self.plugins, endpoint, version, input, detail);
        if result.overall_success {
            QueueMessage::finished(job_id, false, render_interactive(&result))
        } else {
            QueueMessage::error(
                Some(job_id),
                result.top_level_error.unwrap_or_else(|| "Prediction failed".to_string()),
            )
        }
    }
}

/// `--info` output minus the banner line and the three trailer lines.
fn info_details(lines: &[String]) -> String {
    let end = lines.len().saturating_sub(3);
    lines.get(1..end).unwrap_or_default().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn info_details_drop_banner_and_trailer() {
        let lines = owned(&["eTOXlab manage", "CACO2 v1", "  model: PLS", "", "---", "done"]);
        assert_eq!(info_details(&lines), "CACO2 v1\n  model: PLS");
        assert_eq!(info_details(&owned(&["banner", "a", "b", "c"])), "");
        assert_eq!(info_details(&owned(&["banner"])), "");
        assert_eq!(info_details(&[]), "");
    }
}
