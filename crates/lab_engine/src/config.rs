use std::path::PathBuf;

use lab_core::CommandName;

/// Input file used by automated (web service) callers.
pub const AUTOMATED_INPUT: &str = "./input_file.sdf";

/// Normalization libraries web-service callers may not have on their search path.
pub const AUTOMATED_LIBRARY_PATHS: [&str; 2] = ["/opt/RDKit/", "/opt/standardise/"];

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Directory holding one subdirectory per endpoint.
    pub models_root: PathBuf,
    /// Directory holding the manage/build/view executables.
    pub tools_dir: PathBuf,
    /// Working directory for view runs; their plots land here.
    pub work_dir: PathBuf,
    /// Where single-record units are materialized during a batch.
    pub scratch_dir: PathBuf,
    pub manage_program: String,
    pub build_program: String,
    pub view_program: String,
    pub plugin_program: String,
    pub build_log: String,
    pub build_sentinel: String,
    pub error_marker: String,
    pub results_file: String,
    /// Extra search paths handed to the model plugin.
    pub library_paths: Vec<PathBuf>,
    pub library_path_var: String,
}

impl EngineConfig {
    pub fn default_with_root(models_root: PathBuf, tools_dir: PathBuf) -> Self {
        Self {
            models_root,
            tools_dir,
            work_dir: PathBuf::from("."),
            scratch_dir: std::env::temp_dir(),
            manage_program: "manage".to_string(),
            build_program: "build".to_string(),
            view_program: "view".to_string(),
            plugin_program: "imodel".to_string(),
            build_log: "build.log".to_string(),
            build_sentinel: "Model OK".to_string(),
            error_marker: "ERROR:".to_string(),
            results_file: "results.json".to_string(),
            library_paths: Vec::new(),
            library_path_var: "PYTHONPATH".to_string(),
        }
    }

    pub fn program(&self, command: CommandName) -> PathBuf {
        let name = match command {
            CommandName::Manage => &self.manage_program,
            CommandName::Build => &self.build_program,
            CommandName::View => &self.view_program,
        };
        self.tools_dir.join(name)
    }

    pub fn work_path(&self, name: &str) -> PathBuf {
        self.work_dir.join(name)
    }

    /// Environment for the model plugin: configured paths ahead of any inherited value.
    pub fn plugin_env(&self) -> Vec<(String, String)> {
        if self.library_paths.is_empty() {
            return Vec::new();
        }
        let mut paths = self.library_paths.clone();
        if let Some(existing) = std::env::var_os(&self.library_path_var) {
            paths.extend(std::env::split_paths(&existing));
        }
        match std::env::join_paths(paths) {
            Ok(joined) => vec![(
                self.library_path_var.clone(),
                joined.to_string_lossy().into_owned(),
            )],
            Err(_) => Vec::new(),
        }
    }
}
