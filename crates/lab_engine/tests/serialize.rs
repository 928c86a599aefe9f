use std::fs;

use lab_engine::{
    render_interactive, to_triples, write_programmatic, BatchResult, PredictedItem,
    PredictionOutcome, ResultTriple, TripleValue,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn mixed_result() -> BatchResult {
    BatchResult::completed(vec![
        PredictionOutcome::predicted(
            1,
            vec![
                PredictedItem::Value(4.2),
                PredictedItem::Text("closest: CCO".to_string()),
            ],
        ),
        PredictionOutcome::not_normalized(2, "unparseable structure"),
        PredictionOutcome::predicted(3, vec![PredictedItem::Failed("out of domain".to_string())]),
    ])
}

#[test]
fn interactive_text_separates_molecules() {
    let text = render_interactive(&mixed_result());
    assert_eq!(
        text,
        "   4.200\nclosest: CCO\n\nmolecule 2: unparseable structure\nmolecule 3: out of domain\n"
    );
}

#[test]
fn interactive_text_for_failed_run_is_the_error() {
    assert_eq!(render_interactive(&BatchResult::failed("no input")), "no input\n");
}

#[test]
fn failed_first_item_is_a_failed_triple() {
    let triples = to_triples(&mixed_result());
    assert_eq!(
        triples,
        vec![
            ResultTriple(TripleValue::Number(4.2), 0, String::new()),
            ResultTriple(
                TripleValue::Text(String::new()),
                1,
                "unparseable structure".to_string()
            ),
            ResultTriple(
                TripleValue::Text(String::new()),
                1,
                "out of domain".to_string()
            ),
        ]
    );
}

#[test]
fn text_predictions_keep_their_value() {
    let result = BatchResult::completed(vec![PredictionOutcome::predicted(
        1,
        vec![PredictedItem::Text("positive".to_string())],
    )]);
    assert_eq!(
        to_triples(&result),
        vec![ResultTriple(
            TripleValue::Text("positive".to_string()),
            0,
            String::new()
        )]
    );
}

#[test]
fn programmatic_artifact_is_an_ordered_json_list() {
    let temp = TempDir::new().unwrap();
    let result = BatchResult::completed(vec![
        PredictionOutcome::predicted(1, vec![PredictedItem::Value(4.2)]),
        PredictionOutcome::not_normalized(2, "unparseable structure"),
    ]);

    let path = write_programmatic(&result, temp.path(), "results.json").unwrap();

    assert_eq!(path, temp.path().join("results.json"));
    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content, r#"[[4.2,0,""],["",1,"unparseable structure"]]"#);
    let parsed: Vec<ResultTriple> = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed, to_triples(&result));
}
