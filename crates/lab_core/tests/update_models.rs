use lab_core::{update, AppState, Effect, EndpointSummary, Msg, Selection};

fn endpoints() -> Vec<EndpointSummary> {
    vec![
        EndpointSummary {
            name: "CACO2".to_string(),
            versions: vec![0, 1, 2],
        },
        EndpointSummary {
            name: "herg".to_string(),
            versions: vec![0],
        },
    ]
}

#[test]
fn loading_models_focuses_first_endpoint() {
    let (mut state, effects) = update(
        AppState::new(),
        Msg::ModelsLoaded {
            endpoints: endpoints(),
            versions_changed: true,
        },
    );
    assert!(effects.is_empty());

    let view = state.view();
    assert_eq!(
        view.selection,
        Some(Selection {
            endpoint: "CACO2".to_string(),
            version: 0,
        })
    );
    assert_eq!(view.reference_versions, vec![0, 1, 2]);
    assert!(state.consume_dirty());
}

#[test]
fn selection_survives_refresh_while_present() {
    let (state, _) = update(
        AppState::new(),
        Msg::ModelsLoaded {
            endpoints: endpoints(),
            versions_changed: true,
        },
    );
    let (state, _) = update(
        state,
        Msg::ModelSelected {
            endpoint: "herg".to_string(),
            version: 0,
        },
    );
    let (state, _) = update(
        state,
        Msg::ModelsLoaded {
            endpoints: endpoints(),
            versions_changed: false,
        },
    );
    assert_eq!(state.selection().map(|s| s.endpoint.as_str()), Some("herg"));

    // Removing the selected version falls back to the first endpoint.
    let (state, _) = update(
        state,
        Msg::ModelSelected {
            endpoint: "CACO2".to_string(),
            version: 2,
        },
    );
    let mut shrunk = endpoints();
    shrunk[0].versions.pop();
    let (state, _) = update(
        state,
        Msg::ModelsLoaded {
            endpoints: shrunk,
            versions_changed: true,
        },
    );
    assert_eq!(state.selection().map(|s| s.version), Some(0));
    assert_eq!(state.view().reference_versions, vec![0, 1]);
}

#[test]
fn view_model_opens_plots_of_selected_version() {
    let (state, effects) = update(AppState::new(), Msg::ViewModelClicked);
    assert!(effects.is_empty());

    let (state, _) = update(
        state,
        Msg::ModelSelected {
            endpoint: "CACO2".to_string(),
            version: 1,
        },
    );
    let (_state, effects) = update(state, Msg::ViewModelClicked);
    assert_eq!(
        effects,
        vec![Effect::OpenModelPlots {
            endpoint: "CACO2".to_string(),
            version: 1,
        }]
    );
}
