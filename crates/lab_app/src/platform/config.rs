use std::fs;
use std::path::{Path, PathBuf};

use lab_engine::EngineConfig;
use lab_logging::{lab_info, lab_warn, LogDestination};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILENAME: &str = "etoxlab.ron";
pub const LOG_FILENAME: &str = "etoxlab.log";
/// Overrides `models_root` when set.
pub const ROOT_ENV: &str = "ETOXLAB_ROOT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    pub models_root: PathBuf,
    pub tools_dir: PathBuf,
    pub poll_interval_ms: u64,
    pub log_destination: LogDestination,
    /// Program used to open plots. Paths are only printed when unset.
    pub viewer: Option<String>,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            models_root: PathBuf::from("."),
            tools_dir: PathBuf::from("."),
            poll_interval_ms: 500,
            log_destination: LogDestination::File,
            viewer: None,
        }
    }
}

impl LabConfig {
    /// Reads `etoxlab.ron` from the working directory and applies `ETOXLAB_ROOT`.
    /// See [`LabConfig::load_from`] for the returned warning.
    pub fn load() -> (Self, Option<String>) {
        let root = std::env::var_os(ROOT_ENV).map(PathBuf::from);
        Self::load_from(Path::new(CONFIG_FILENAME), root)
    }

    /// A missing file yields the defaults. An unreadable or unparsable one also
    /// yields the defaults, plus a warning for the caller to log once logging
    /// is up. `root_override` wins over the file's `models_root`.
    pub fn load_from(path: &Path, root_override: Option<PathBuf>) -> (Self, Option<String>) {
        let (mut config, warning) = match fs::read_to_string(path) {
            Ok(text) => match ron::from_str::<LabConfig>(&text) {
                Ok(config) => (config, None),
                Err(err) => (
                    LabConfig::default(),
                    Some(format!("Failed to parse configuration {path:?}: {err}")),
                ),
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                (LabConfig::default(), None)
            }
            Err(err) => (
                LabConfig::default(),
                Some(format!("Failed to read configuration {path:?}: {err}")),
            ),
        };
        if let Some(root) = root_override.filter(|root| !root.as_os_str().is_empty()) {
            config.models_root = root;
        }
        (config, warning)
    }

    /// Logs the outcome of [`LabConfig::load`]. Call after the logger is installed.
    pub fn report(&self, warning: Option<&str>) {
        match warning {
            Some(warning) => lab_warn!("{}; using defaults", warning),
            None => lab_info!(
                "Configuration: models in {:?}, tools in {:?}",
                self.models_root,
                self.tools_dir
            ),
        }
    }

    pub fn engine_config(&self, work_dir: PathBuf) -> EngineConfig {
        let mut engine = EngineConfig::default_with_root(
            self.models_root.clone(),
            self.tools_dir.clone(),
        );
        engine.work_dir = work_dir;
        engine
    }
}
