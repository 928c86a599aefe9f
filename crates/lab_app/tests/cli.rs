use std::fs;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::Parser;
use lab_app::cli::{present, PredictArgs, PredictPlan};
use lab_core::VersionSelector;
use lab_engine::{BatchResult, PredictedItem, PredictionOutcome, NO_INPUT};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn parse(args: &[&str]) -> Result<PredictArgs, clap::Error> {
    PredictArgs::try_parse_from(std::iter::once("predict").chain(args.iter().copied()))
}

#[test]
fn interactive_run_needs_endpoint_file_and_version() {
    let plan = parse(&["-e", "CACO2", "-f", "mols.sdf", "-v", "2"])
        .unwrap()
        .plan();
    assert_eq!(
        plan,
        Some(PredictPlan {
            endpoint: "CACO2".to_string(),
            input: PathBuf::from("mols.sdf"),
            version: VersionSelector::Number(2),
            automated: false,
            detail: false,
        })
    );

    assert_eq!(parse(&["-e", "CACO2", "-f", "mols.sdf"]).unwrap().plan(), None);
    assert_eq!(parse(&["-e", "CACO2", "-v", "last"]).unwrap().plan(), None);
    assert_eq!(parse(&["-f", "mols.sdf", "-v", "last"]).unwrap().plan(), None);
}

#[test]
fn automated_mode_forces_input_and_last_version() {
    let plan = parse(&["-e", "herg", "-v", "3", "-f", "other.sdf", "-a", "--detail"])
        .unwrap()
        .plan()
        .unwrap();
    assert_eq!(plan.input, PathBuf::from("./input_file.sdf"));
    assert_eq!(plan.version, VersionSelector::Last);
    assert!(plan.automated);
    assert!(plan.detail);

    assert_eq!(parse(&["-a"]).unwrap().plan(), None);
}

#[test]
fn usage_errors_and_help_are_reported_by_kind() {
    assert_eq!(
        parse(&["-e", "x", "-v", "newest"]).unwrap_err().kind(),
        ErrorKind::ValueValidation
    );
    assert_eq!(parse(&["-e", "x", "stray"]).unwrap_err().kind(), ErrorKind::UnknownArgument);
    assert_eq!(parse(&["-h"]).unwrap_err().kind(), ErrorKind::DisplayHelp);
    assert_eq!(
        parse(&["-e", "x", "-v", "the last one"]).unwrap().version,
        Some(VersionSelector::Last)
    );
}

fn plan(automated: bool) -> PredictPlan {
    PredictPlan {
        endpoint: "CACO2".to_string(),
        input: PathBuf::from("mols.sdf"),
        version: VersionSelector::Last,
        automated,
        detail: false,
    }
}

#[test]
fn automated_results_are_written_as_triples() {
    let temp = TempDir::new().unwrap();
    let result = BatchResult::completed(vec![
        PredictionOutcome::predicted(1, vec![PredictedItem::Value(4.2)]),
        PredictionOutcome::not_normalized(2, "unparseable structure".to_string()),
    ]);

    let printed = present(&plan(true), &result, "results.json", temp.path()).unwrap();

    assert_eq!(printed, None);
    assert_eq!(
        fs::read_to_string(temp.path().join("results.json")).unwrap(),
        r#"[[4.2,0,""],["",1,"unparseable structure"]]"#
    );
}

#[test]
fn interactive_results_are_returned_as_text() {
    let temp = TempDir::new().unwrap();
    let printed = present(
        &plan(false),
        &BatchResult::failed(NO_INPUT.to_string()),
        "results.json",
        temp.path(),
    )
    .unwrap();

    assert_eq!(printed.as_deref(), Some("no input\n"));
    assert!(!temp.path().join("results.json").exists());
}
