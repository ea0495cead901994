//! Tests for TreeBuilder: integrity validation and parts attachment

use rstest::rstest;
use serde_json::json;

use diagtree::domain::schema::{RawPartsCatalog, RawTree};
use diagtree::domain::{
    DiagnosticNode, DomainError, EndResult, IntegrityViolation, PartsResolver, QuestionMode,
    Target, TreeBuilder,
};

fn raw_tree(root: &str, nodes: serde_json::Value) -> RawTree {
    serde_json::from_value(json!({
        "templateId": "t1",
        "version": 2,
        "locale": "en",
        "root": root,
        "nodes": nodes,
    }))
    .expect("valid raw tree json")
}

fn build(raw: RawTree) -> Result<diagtree::domain::DiagnosticTree, DomainError> {
    let resolver = PartsResolver::default();
    TreeBuilder::new(&resolver).build(raw)
}

fn violation(err: DomainError) -> IntegrityViolation {
    match err {
        DomainError::Integrity { template, violation } => {
            assert_eq!(template, "t1");
            violation
        }
        other => panic!("expected integrity error, got {other:?}"),
    }
}

#[test]
fn given_valid_raw_tree_when_building_then_nodes_indexed_by_id() {
    // Arrange
    let raw = raw_tree(
        "q1",
        json!([
            {"id": "q1", "type": "QUESTION", "title": "Q1", "yes": "q2", "no": "END"},
            {"id": "q2", "type": "QUESTION", "title": "Q2", "yes": "end1", "no": "end1"},
            {"id": "end1", "type": "END", "title": "Done", "result": "RESOLVED"}
        ]),
    );

    // Act
    let tree = build(raw).unwrap();

    // Assert
    assert_eq!(tree.template_id, "t1");
    assert_eq!(tree.version, 2);
    assert_eq!(tree.root_id(), "q1");
    assert_eq!(tree.len(), 3);
    match tree.node("q1").unwrap() {
        DiagnosticNode::Question(q) => {
            assert_eq!(q.yes, Target::Node("q2".into()));
            assert_eq!(q.no, Some(Target::Terminal));
            assert_eq!(q.mode, QuestionMode::YesNo);
        }
        other => panic!("expected question, got {other:?}"),
    }
    match tree.node("end1").unwrap() {
        DiagnosticNode::End(e) => assert_eq!(e.result, EndResult::Resolved),
        other => panic!("expected end, got {other:?}"),
    }
}

#[test]
fn given_end_without_result_when_building_then_defaults_to_no_issue() {
    let raw = raw_tree(
        "e",
        json!([{"id": "e", "type": "END", "title": "Nothing found"}]),
    );

    let tree = build(raw).unwrap();

    match tree.root().unwrap() {
        DiagnosticNode::End(e) => {
            assert_eq!(e.result, EndResult::NoIssue);
            assert!(e.parts.is_empty());
        }
        other => panic!("expected end, got {other:?}"),
    }
}

#[test]
fn given_continue_only_question_without_no_when_building_then_accepted() {
    let raw = raw_tree(
        "q1",
        json!([
            {"id": "q1", "type": "question", "mode": "continue_only", "title": "Read this", "yes": "e"},
            {"id": "e", "type": "end", "title": "Done"}
        ]),
    );

    let tree = build(raw).unwrap();

    match tree.root().unwrap() {
        DiagnosticNode::Question(q) => {
            assert_eq!(q.mode, QuestionMode::ContinueOnly);
            assert_eq!(q.no, None);
        }
        other => panic!("expected question, got {other:?}"),
    }
}

#[rstest]
#[case::missing_root(
    "nope",
    json!([{"id": "e", "type": "END", "title": "x"}]),
    IntegrityViolation::MissingRoot("nope".into())
)]
#[case::duplicate_id(
    "e",
    json!([{"id": "e", "type": "END", "title": "x"}, {"id": "e", "type": "END", "title": "y"}]),
    IntegrityViolation::DuplicateNode("e".into())
)]
#[case::reserved_id(
    "q",
    json!([{"id": "q", "type": "QUESTION", "title": "x", "yes": "END", "no": "END"},
           {"id": "END", "type": "END", "title": "y"}]),
    IntegrityViolation::ReservedNodeId("END".into())
)]
#[case::empty_id(
    "q",
    json!([{"id": " ", "type": "END", "title": "x"}]),
    IntegrityViolation::EmptyNodeId
)]
#[case::missing_yes(
    "q",
    json!([{"id": "q", "type": "QUESTION", "title": "x", "no": "END"}]),
    IntegrityViolation::MissingYesTarget("q".into())
)]
#[case::blank_yes(
    "q",
    json!([{"id": "q", "type": "QUESTION", "title": "x", "yes": "  ", "no": "END"}]),
    IntegrityViolation::MissingYesTarget("q".into())
)]
#[case::missing_no(
    "q",
    json!([{"id": "q", "type": "QUESTION", "title": "x", "yes": "END"}]),
    IntegrityViolation::MissingNoTarget("q".into())
)]
#[case::unknown_type(
    "q",
    json!([{"id": "q", "type": "BRANCH", "title": "x"}]),
    IntegrityViolation::UnknownNodeType { node: "q".into(), value: "BRANCH".into() }
)]
#[case::unknown_mode(
    "q",
    json!([{"id": "q", "type": "QUESTION", "title": "x", "yes": "END", "mode": "MULTI"}]),
    IntegrityViolation::UnknownMode { node: "q".into(), value: "MULTI".into() }
)]
#[case::unknown_result(
    "q",
    json!([{"id": "q", "type": "END", "title": "x", "result": "BROKEN"}]),
    IntegrityViolation::UnknownResult { node: "q".into(), value: "BROKEN".into() }
)]
fn given_malformed_tree_when_building_then_reports_integrity_violation(
    #[case] root: &str,
    #[case] nodes: serde_json::Value,
    #[case] expected: IntegrityViolation,
) {
    let err = build(raw_tree(root, nodes)).unwrap_err();
    assert_eq!(violation(err), expected);
}

#[test]
fn given_dangling_branch_target_when_building_then_still_loads() {
    // Dangling targets degrade at traversal time; the audit reports them.
    let raw = raw_tree(
        "q",
        json!([{"id": "q", "type": "QUESTION", "title": "x", "yes": "ghost", "no": "END"}]),
    );

    assert!(build(raw).is_ok());
}

#[test]
fn given_catalog_with_node_refs_when_building_then_end_nodes_receive_parts() {
    // Arrange
    let catalog: RawPartsCatalog = serde_json::from_value(json!({
        "parts": [
            {"id": "p1", "product": "Fuse", "nodeRefs": ["end1"]},
            {"id": "p2", "product": "Relay", "nodeRefs": ["q1"]}
        ]
    }))
    .unwrap();
    let resolver = PartsResolver::new(&catalog);
    let raw = raw_tree(
        "q1",
        json!([
            {"id": "q1", "type": "QUESTION", "title": "Q", "yes": "end1", "no": "END"},
            {"id": "end1", "type": "END", "title": "Done"}
        ]),
    );

    // Act
    let tree = TreeBuilder::new(&resolver).build(raw).unwrap();

    // Assert - p2 points at a question and is not attached anywhere
    match tree.node("end1").unwrap() {
        DiagnosticNode::End(e) => {
            assert_eq!(e.parts.len(), 1);
            assert_eq!(e.parts[0].detail.id, "p1");
            assert_eq!(e.parts[0].detail.product, "Fuse");
            assert_eq!(e.parts[0].qty, None);
        }
        other => panic!("expected end, got {other:?}"),
    }
}

#[test]
fn given_inline_part_missing_from_catalog_when_building_then_unknown_part_error() {
    let raw = raw_tree(
        "e",
        json!([{"id": "e", "type": "END", "title": "x", "parts": [{"id": "p9", "qty": 2}]}]),
    );

    let err = build(raw).unwrap_err();

    assert_eq!(
        err,
        DomainError::UnknownPart {
            part_id: "p9".into(),
            node_id: "e".into()
        }
    );
}
