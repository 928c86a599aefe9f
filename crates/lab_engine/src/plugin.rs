use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use lab_logging::lab_info;

use crate::process::{CommandRunner, CommandSpec, LineAction, ProcessOutput};
use crate::{PluginLoadError, PredictedItem};

/// Capability set every model version provides.
pub trait ModelPlugin: Send + Sync {
    /// Standardizes the structure in `unit`, returning the normalized file.
    fn normalize(&self, unit: &Path) -> Result<PathBuf, String>;

    /// Predicts the normalized structure; the first item is the primary result.
    fn predict(&self, normalized: &Path, detail: bool) -> Result<Vec<PredictedItem>, String>;
}

/// Model plugin backed by the `imodel` executable stored in a version directory.
///
/// `imodel normalize <file>` prints the normalized file as its last line.
/// `imodel predict <file> [--detail]` prints one result per line: a number,
/// free text, or an error-marker line for a failed item. A non-zero exit
/// fails the step with the last line as reason.
pub struct ExecutablePlugin {
    program: PathBuf,
    version_dir: PathBuf,
    runner: Arc<dyn CommandRunner>,
    env: Vec<(String, String)>,
    error_marker: String,
}

impl ExecutablePlugin {
    pub fn new(
        program: PathBuf,
        version_dir: PathBuf,
        runner: Arc<dyn CommandRunner>,
        env: Vec<(String, String)>,
        error_marker: String,
    ) -> Self {
        Self {
            program,
            version_dir,
            runner,
            env,
            error_marker,
        }
    }

    fn call(&self, args: Vec<String>) -> Result<ProcessOutput, String> {
        let spec = CommandSpec {
            program: self.program.clone(),
            args,
            working_dir: Some(self.version_dir.clone()),
            env: self.env.clone(),
        };
        let output = self
            .runner
            .run(&spec, &mut |_| LineAction::Continue)
            .map_err(|err| err.to_string())?;
        if output.success() {
            Ok(output)
        } else {
            Err(self.reason(&output))
        }
    }

    fn reason(&self, output: &ProcessOutput) -> String {
        match output.last_line() {
            Some(line) => self.strip_marker(line).to_string(),
            None => format!("model exited with {:?}", output.exit_code),
        }
    }

    fn strip_marker<'a>(&self, line: &'a str) -> &'a str {
        line.strip_prefix(self.error_marker.as_str())
            .unwrap_or(line)
            .trim()
    }

    fn absolute(path: &Path) -> String {
        std::path::absolute(path)
            .unwrap_or_else(|_| path.to_path_buf())
            .display()
            .to_string()
    }
}

impl ModelPlugin for ExecutablePlugin {
    fn normalize(&self, unit: &Path) -> Result<PathBuf, String> {
        let output = self.call(vec!["normalize".to_string(), Self::absolute(unit)])?;
        let line = output
            .last_line()
            .ok_or_else(|| "normalization produced no structure".to_string())?;
        let normalized = PathBuf::from(line.trim());
        if normalized.is_absolute() {
            Ok(normalized)
        } else {
            Ok(self.version_dir.join(normalized))
        }
    }

    fn predict(&self, normalized: &Path, detail: bool) -> Result<Vec<PredictedItem>, String> {
        let mut args = vec!["predict".to_string(), Self::absolute(normalized)];
        if detail {
            args.push("--detail".to_string());
        }
        let output = self.call(args)?;
        Ok(output
            .lines
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .map(|line| {
                if line.starts_with(self.error_marker.as_str()) {
                    PredictedItem::Failed(self.strip_marker(line).to_string())
                } else if let Ok(value) = line.parse::<f64>() {
                    PredictedItem::Value(value)
                } else {
                    PredictedItem::Text(line.to_string())
                }
            })
            .collect())
    }
}

/// Resolves version directories to typed plugin handles, loading each once.
pub struct PluginRegistry {
    runner: Arc<dyn CommandRunner>,
    program_name: String,
    env: Vec<(String, String)>,
    error_marker: String,
    loaded: Mutex<HashMap<PathBuf, Arc<dyn ModelPlugin>>>,
}

impl PluginRegistry {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        program_name: impl Into<String>,
        env: Vec<(String, String)>,
        error_marker: impl Into<String>,
    ) -> Self {
        Self {
            runner,
            program_name: program_name.into(),
            env,
            error_marker: error_marker.into(),
            loaded: Mutex::new(HashMap::new()),
        }
    }

    /// Installs an in-process plugin for `version_dir`, replacing any loaded one.
    pub fn register(&self, version_dir: impl Into<PathBuf>, plugin: Arc<dyn ModelPlugin>) {
        self.loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(version_dir.into(), plugin);
    }

    pub fn load(&self, version_dir: &Path) -> Result<Arc<dyn ModelPlugin>, PluginLoadError> {
        let mut loaded = self.loaded.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(plugin) = loaded.get(version_dir) {
            return Ok(plugin.clone());
        }

        let program = version_dir.join(&self.program_name);
        if !program.is_file() {
            return Err(PluginLoadError::Missing(program));
        }
        if !is_executable(&program) {
            return Err(PluginLoadError::NotExecutable(program));
        }

        lab_info!("Loaded model plugin {:?}", program);
        let plugin: Arc<dyn ModelPlugin> = Arc::new(ExecutablePlugin::new(
            program,
            version_dir.to_path_buf(),
            self.runner.clone(),
            self.env.clone(),
            self.error_marker.clone(),
        ));
        loaded.insert(version_dir.to_path_buf(), plugin.clone());
        Ok(plugin)
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
