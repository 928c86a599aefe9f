use std::fmt::Write as _;
use std::path::PathBuf;

use lab_core::{
    AppViewModel, ControlId, JobRequest, ManageOperation, Msg, ReferenceModel, Selection,
    VersionSelector, ViewType,
};

pub const HELP: &str = "\
commands:
  list                              re-read the model list
  select <endpoint> <version>       select a model version
  new <endpoint> <tag>              create an endpoint
  info | publish | remove           manage the selected version
  series [dir] | export [dir]       save training series or an archive into dir
  import <archive>                  import an exported endpoint
  build [series]                    build the selected version
  view <type> [refname refver] [--background]
  query <type> <file> [--background]
  plots                             open the selected version's quality plots
  predict <file> [--detail]         predict a molecule file with the selected version
  help | quit";

/// One parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Dispatch(Msg),
    Refresh,
    Help,
    Quit,
    Empty,
}

/// Translates a console line into a command. Job commands act on `selection`;
/// without one the endpoint is left empty and request validation reports it.
pub fn parse_command(line: &str, selection: Option<&Selection>) -> Result<ConsoleCommand, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&head, rest)) = words.split_first() else {
        return Ok(ConsoleCommand::Empty);
    };
    let flag = |name: &str| rest.contains(&name);
    let positional: Vec<&str> = rest.iter().copied().filter(|w| !w.starts_with("--")).collect();
    let (endpoint, version) = selection
        .map(|s| (s.endpoint.clone(), s.version))
        .unwrap_or_default();

    let activate = |control: ControlId, request: JobRequest| -> Result<ConsoleCommand, String> {
        Ok(ConsoleCommand::Dispatch(Msg::ControlActivated { control, request }))
    };
    let manage = |operation: ManageOperation, destination: Option<PathBuf>| JobRequest::Manage {
        endpoint: endpoint.clone(),
        version: Some(version),
        operation,
        destination,
    };

    match head {
        "help" | "?" => Ok(ConsoleCommand::Help),
        "quit" | "exit" => Ok(ConsoleCommand::Quit),
        "list" => Ok(ConsoleCommand::Refresh),
        "plots" => Ok(ConsoleCommand::Dispatch(Msg::ViewModelClicked)),
        "select" => match positional.as_slice() {
            [name, number] => Ok(ConsoleCommand::Dispatch(Msg::ModelSelected {
                endpoint: name.to_string(),
                version: parse_version(number)?,
            })),
            _ => Err("usage: select <endpoint> <version>".to_string()),
        },
        "new" => match positional.as_slice() {
            [name, tag] => activate(
                ControlId::NewEndpoint,
                JobRequest::Manage {
                    endpoint: name.to_string(),
                    version: None,
                    operation: ManageOperation::New {
                        tag: tag.to_string(),
                    },
                    destination: None,
                },
            ),
            _ => Err("usage: new <endpoint> <tag>".to_string()),
        },
        "info" => activate(ControlId::ShowInfo, manage(ManageOperation::Info, None)),
        "publish" => activate(ControlId::Publish, manage(ManageOperation::Publish, None)),
        "remove" => activate(ControlId::Remove, manage(ManageOperation::Remove, None)),
        "series" => activate(
            ControlId::GetSeries,
            manage(ManageOperation::GetSeries, positional.first().map(PathBuf::from)),
        ),
        "export" => activate(
            ControlId::Export,
            manage(ManageOperation::Export, positional.first().map(PathBuf::from)),
        ),
        "import" => match positional.as_slice() {
            [archive] => {
                let archive = PathBuf::from(archive);
                let name = endpoint_from_archive(&archive);
                activate(
                    ControlId::Import,
                    JobRequest::Manage {
                        endpoint: name,
                        version: None,
                        operation: ManageOperation::Import { archive },
                        destination: None,
                    },
                )
            }
            _ => Err("usage: import <archive>".to_string()),
        },
        "build" => activate(
            ControlId::Build,
            JobRequest::Build {
                endpoint: endpoint.clone(),
                version,
                series: positional.first().map(PathBuf::from),
            },
        ),
        "view" => {
            let (view_type, reference) = match positional.as_slice() {
                [kind] => (kind.parse::<ViewType>()?, None),
                [kind, refname, refver] => (
                    kind.parse::<ViewType>()?,
                    Some(ReferenceModel {
                        endpoint: refname.to_string(),
                        version: parse_version(refver)?,
                    }),
                ),
                _ => return Err("usage: view <type> [refname refver] [--background]".to_string()),
            };
            activate(
                ControlId::ViewSeries,
                JobRequest::View {
                    endpoint: endpoint.clone(),
                    version,
                    view_type,
                    reference,
                    query: None,
                    background: flag("--background"),
                },
            )
        }
        "query" => match positional.as_slice() {
            [kind, file] => activate(
                ControlId::ViewQuery,
                JobRequest::View {
                    endpoint: endpoint.clone(),
                    version,
                    view_type: kind.parse::<ViewType>()?,
                    reference: None,
                    query: Some(PathBuf::from(file)),
                    background: flag("--background"),
                },
            ),
            _ => Err("usage: query <type> <file> [--background]".to_string()),
        },
        "predict" => activate(
            ControlId::Predict,
            JobRequest::Predict {
                endpoint: endpoint.clone(),
                version: VersionSelector::Number(version),
                input: positional.first().map(PathBuf::from).unwrap_or_default(),
                detail: flag("--detail"),
            },
        ),
        other => Err(format!("unknown command '{other}', try 'help'")),
    }
}

fn parse_version(text: &str) -> Result<u32, String> {
    text.parse::<u32>()
        .map_err(|_| format!("invalid version '{text}'"))
}

/// Exported archives are named after their endpoint (`CACO2.tgz`).
fn endpoint_from_archive(archive: &std::path::Path) -> String {
    let name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.split_once('.') {
        Some((stem, _)) => stem.to_string(),
        None => name,
    }
}

/// Text rendering of the view model.
pub fn render(view: &AppViewModel) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "models:");
    if view.models.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for model in &view.models {
        let selected = view
            .selection
            .as_ref()
            .filter(|s| s.endpoint == model.name)
            .map(|s| s.version);
        let versions: Vec<String> = model
            .versions
            .iter()
            .map(|v| {
                if Some(*v) == selected {
                    format!("[{v}]")
                } else {
                    v.to_string()
                }
            })
            .collect();
        let marker = if selected.is_some() { '*' } else { ' ' };
        let _ = writeln!(out, "{marker} {:<20} {}", model.name, versions.join(" "));
    }

    let busy: Vec<&str> = view
        .controls
        .iter()
        .filter(|c| !c.enabled)
        .map(|c| c.label)
        .collect();
    if !busy.is_empty() {
        let _ = writeln!(out, "busy: {}", busy.join(", "));
    }
    for job in &view.jobs {
        let _ = writeln!(
            out,
            "  job {} {:?} {:?}: {}",
            job.job_id, job.kind, job.state, job.arguments
        );
    }
    if view.progress_active {
        let _ = writeln!(out, "building...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archive_names_map_to_endpoints() {
        assert_eq!(
            endpoint_from_archive(std::path::Path::new("/tmp/CACO2.tgz")),
            "CACO2"
        );
        assert_eq!(endpoint_from_archive(std::path::Path::new("herg")), "herg");
    }

    #[test]
    fn versions_must_be_numbers() {
        assert_eq!(parse_version("3"), Ok(3));
        assert!(parse_version("last").is_err());
    }
}
