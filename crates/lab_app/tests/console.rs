use std::path::PathBuf;

use lab_app::platform::{parse_command, render, ConsoleCommand};
use lab_core::{
    update, AppState, ControlId, Effect, EndpointSummary, JobRequest, ManageOperation, Msg,
    Selection, ViewType,
};
use pretty_assertions::assert_eq;

fn selection() -> Selection {
    Selection {
        endpoint: "CACO2".to_string(),
        version: 2,
    }
}

fn dispatched(line: &str, selection: Option<&Selection>) -> Msg {
    match parse_command(line, selection).unwrap() {
        ConsoleCommand::Dispatch(msg) => msg,
        other => panic!("expected a message, got {other:?}"),
    }
}

#[test]
fn export_without_directory_keeps_destination_empty() {
    let msg = dispatched("export", Some(&selection()));
    assert_eq!(
        msg,
        Msg::ControlActivated {
            control: ControlId::Export,
            request: JobRequest::Manage {
                endpoint: "CACO2".to_string(),
                version: Some(2),
                operation: ManageOperation::Export,
                destination: None,
            },
        }
    );

    let msg = dispatched("series /tmp/out", Some(&selection()));
    let Msg::ControlActivated { request, .. } = msg else {
        panic!("unexpected message");
    };
    assert_eq!(
        request,
        JobRequest::Manage {
            endpoint: "CACO2".to_string(),
            version: Some(2),
            operation: ManageOperation::GetSeries,
            destination: Some(PathBuf::from("/tmp/out")),
        }
    );
}

#[test]
fn view_with_reference_and_background() {
    let msg = dispatched("view pca herg 1 --background", Some(&selection()));
    let Msg::ControlActivated { control, request } = msg else {
        panic!("unexpected message");
    };
    assert_eq!(control, ControlId::ViewSeries);
    assert_eq!(
        request.arguments(),
        vec![
            "-e",
            "CACO2",
            "-v",
            "2",
            "--type=pca",
            "--refname=herg",
            "--refver=1",
            "--background"
        ]
    );
    assert!(matches!(
        request,
        JobRequest::View {
            view_type: ViewType::Pca,
            ..
        }
    ));
}

#[test]
fn import_takes_endpoint_from_archive_name() {
    let msg = dispatched("import /data/herg.tgz", None);
    let Msg::ControlActivated { request, .. } = msg else {
        panic!("unexpected message");
    };
    assert_eq!(request.endpoint(), "herg");
}

#[test]
fn job_without_selection_is_rejected_by_validation() {
    let msg = dispatched("build", None);
    let (state, effects) = update(AppState::new(), msg);

    assert_eq!(
        effects,
        vec![Effect::ShowMessage {
            text: "Please provide the name of the endpoint".to_string()
        }]
    );
    assert!(state.view().jobs.is_empty());
}

#[test]
fn bad_input_is_reported() {
    assert!(parse_command("select CACO2 last", None).is_err());
    assert!(parse_command("view heatmap", Some(&selection())).is_err());
    assert!(parse_command("frobnicate", None).is_err());
    assert_eq!(parse_command("   ", None), Ok(ConsoleCommand::Empty));
    assert_eq!(parse_command("quit", None), Ok(ConsoleCommand::Quit));
}

#[test]
fn render_marks_selection_and_busy_controls() {
    let (state, _) = update(
        AppState::new(),
        Msg::ModelsLoaded {
            endpoints: vec![EndpointSummary {
                name: "CACO2".to_string(),
                versions: vec![0, 1, 2],
            }],
            versions_changed: true,
        },
    );
    let (state, _) = update(
        state,
        Msg::ModelSelected {
            endpoint: "CACO2".to_string(),
            version: 2,
        },
    );
    let build = dispatched("build", state.selection());
    let (state, _) = update(state, build);

    let text = render(&state.view());
    assert!(text.contains("* CACO2"));
    assert!(text.contains("0 1 [2]"));
    assert!(text.contains("busy: build model"));
    assert!(text.contains("building..."));
}
