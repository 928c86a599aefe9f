use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use lab_logging::{lab_debug, lab_info, lab_warn};

use crate::InvokeError;

/// A fully resolved external command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Child working directory; the caller's own directory is never changed.
    pub working_dir: Option<PathBuf>,
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new(program: PathBuf, args: Vec<String>) -> Self {
        Self {
            program,
            args,
            working_dir: None,
            env: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessOutput {
    pub exit_code: Option<i32>,
    pub lines: Vec<String>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Last non-blank output line.
    pub fn last_line(&self) -> Option<&str> {
        self.lines
            .iter()
            .rev()
            .map(|line| line.trim_end())
            .find(|line| !line.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAction {
    Continue,
    Abort,
}

/// Runs one external command to completion, handing each stdout line to
/// `on_line` as it arrives. `LineAction::Abort` kills the child and yields
/// `InvokeError::Remote` carrying that line.
pub trait CommandRunner: Send + Sync {
    fn run(
        &self,
        spec: &CommandSpec,
        on_line: &mut dyn FnMut(&str) -> LineAction,
    ) -> Result<ProcessOutput, InvokeError>;
}

/// Aborts on the first line starting with `marker`.
pub fn abort_on_marker(marker: &str) -> impl FnMut(&str) -> LineAction + '_ {
    move |line| {
        if line.starts_with(marker) {
            LineAction::Abort
        } else {
            LineAction::Continue
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessInvoker;

impl CommandRunner for ProcessInvoker {
    fn run(
        &self,
        spec: &CommandSpec,
        on_line: &mut dyn FnMut(&str) -> LineAction,
    ) -> Result<ProcessOutput, InvokeError> {
        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        if let Some(dir) = &spec.working_dir {
            command.current_dir(dir);
        }

        lab_info!("Spawning {:?} {:?}", spec.program, spec.args);
        let mut child = command.spawn().map_err(|source| InvokeError::Spawn {
            program: spec.program.display().to_string(),
            source,
        })?;

        let mut lines = Vec::new();
        if let Some(stdout) = child.stdout.take() {
            let mut reader = BufReader::new(stdout);
            let mut raw = Vec::new();
            loop {
                raw.clear();
                match reader.read_until(b'\n', &mut raw) {
                    Ok(0) => break,
                    Ok(_) => {}
                    Err(err) => {
                        lab_warn!("Reading output of {:?} failed: {}", spec.program, err);
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(InvokeError::Io(err));
                    }
                }
                // Tools may print Latin-1; undecodable bytes are replaced.
                let line = String::from_utf8_lossy(&raw).trim_end().to_string();
                lab_debug!("{:?}: {}", spec.program, line);
                if on_line(&line) == LineAction::Abort {
                    lab_warn!("Aborting {:?} on line {:?}", spec.program, line);
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(InvokeError::Remote(line));
                }
                lines.push(line);
            }
        }

        let status = child.wait()?;
        lab_info!("{:?} exited with {:?}", spec.program, status.code());
        Ok(ProcessOutput {
            exit_code: status.code(),
            lines,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_line_skips_trailing_blanks() {
        let output = ProcessOutput {
            exit_code: Some(0),
            lines: vec!["Building".into(), "Model OK".into(), "".into(), "  ".into()],
        };
        assert_eq!(output.last_line(), Some("Model OK"));
        assert_eq!(ProcessOutput::default().last_line(), None);
    }

    #[test]
    fn marker_only_matches_line_start() {
        let mut check = abort_on_marker("ERROR:");
        assert_eq!(check("ERROR: bad endpoint"), LineAction::Abort);
        assert_eq!(check("no ERROR: here"), LineAction::Continue);
    }
}
