//! Tests for diagnostic sessions and the interactive walk

use std::path::PathBuf;
use std::sync::Arc;

use diagtree::application::services::{Session, SessionCommand, TreeLoader};
use diagtree::cli::commands::walk;
use diagtree::config::Settings;
use diagtree::domain::{Answer, DiagnosticNode, DiagnosticTree, PathEntry, Position};
use diagtree::infrastructure::traits::{RealFileSystem, ScriptedPrompter};
use diagtree::util::testing;

fn coffee_machine() -> Arc<DiagnosticTree> {
    testing::init_test_setup();
    let settings = Settings {
        data_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/resources/data"),
        locale: "en".into(),
        default_locale: "en".into(),
    };
    let loader = TreeLoader::new(Arc::new(RealFileSystem), Arc::new(settings));
    Arc::new(loader.resolve("M-100").expect("fixture tree loads"))
}

fn current(session: &Session) -> String {
    match session.position() {
        Position::Node(n) => n.id().to_string(),
        Position::EphemeralEnd(_) => "<end>".to_string(),
        Position::Missing(id) => format!("<missing {id}>"),
    }
}

fn run_script(session: &mut Session, script: &[&str]) -> String {
    let prompter = ScriptedPrompter::new(script.iter().copied());
    let mut out = Vec::new();
    walk(session, &prompter, &mut out).expect("walk succeeds");
    String::from_utf8(out).expect("utf8 output")
}

#[test]
fn given_new_session_when_created_then_positioned_at_root() {
    let session = Session::new("M-100", coffee_machine());

    assert_eq!(session.machine_id(), "M-100");
    assert_eq!(current(&session), "q_power");
    match session.position() {
        Position::Node(n) => {
            assert_eq!(n.title(), "Does the machine power on?");
            assert_eq!(n.description(), Some("Check the display and the power LED."));
        }
        other => panic!("expected root node, got {other:?}"),
    }
    assert!(!session.can_go_back());
    assert_eq!(session.view().path, &[PathEntry::Node("q_power".into())]);
}

#[test]
fn given_power_failure_branch_when_walking_then_reaches_fuse_fault() {
    let mut session = Session::new("M-100", coffee_machine());

    assert!(session.answer_no());
    assert_eq!(current(&session), "q_fuse");
    // yes/no do not apply to a continue-only step
    assert!(!session.answer_no());
    assert!(session.answer_continue());

    match session.position() {
        Position::Node(DiagnosticNode::End(e)) => {
            assert_eq!(e.id, "end_fuse");
            assert_eq!(e.parts.len(), 1);
        }
        other => panic!("expected end node, got {other:?}"),
    }
    // end nodes accept no answers
    assert!(!session.answer_yes());
}

#[test]
fn given_heating_ok_when_answering_yes_then_synthesized_end() {
    let mut session = Session::new("M-100", coffee_machine());

    session.answer_yes();
    session.answer_yes();

    assert_eq!(current(&session), "<end>");
    assert!(session.position().is_terminal());
    assert_eq!(session.state().current_id(), "q_heat");

    assert!(session.go_back());
    assert_eq!(current(&session), "q_power");
}

#[test]
fn given_deep_session_when_restarting_then_root_again() {
    let mut session = Session::new("M-100", coffee_machine());
    session.apply(SessionCommand::Answer(Answer::Yes));
    session.apply(SessionCommand::Answer(Answer::No));
    assert_eq!(current(&session), "end_heater");

    session.restart();

    assert_eq!(current(&session), "q_power");
    assert!(!session.can_go_back());
}

#[test]
fn given_scripted_answers_when_walking_then_renders_each_step_and_stops_at_eof() {
    let mut session = Session::new("M-100", coffee_machine());

    let output = run_script(&mut session, &["y", "n"]);

    assert!(output.contains("Does the machine power on?"));
    assert!(output.contains("Does the water heat up?"));
    assert!(output.contains("Heating circuit fault"));
    assert!(output.contains("Heating element 1400W [HE-1400] x1"));
    assert!(output.contains("Thermostat 95C [TH-95]"));
    assert!(output.contains("Contact your suppliers"));
    assert_eq!(current(&session), "end_heater");
}

#[test]
fn given_blank_line_on_continue_only_step_when_walking_then_continues() {
    let mut session = Session::new("M-100", coffee_machine());

    let output = run_script(&mut session, &["n", ""]);

    assert!(output.contains("inspect the main fuse"));
    assert!(output.contains("Main fuse 10A [FU-10] x1"));
    assert!(output.contains("supplier: Electro Parts"));
    assert_eq!(current(&session), "end_fuse");
}

#[test]
fn given_quit_when_walking_then_stops_without_consuming_rest() {
    let mut session = Session::new("M-100", coffee_machine());

    run_script(&mut session, &["y", "q", "n"]);

    assert_eq!(current(&session), "q_heat");
}

#[test]
fn given_bad_and_noop_input_when_walking_then_reports_and_keeps_state() {
    let mut session = Session::new("M-100", coffee_machine());

    let output = run_script(&mut session, &["maybe", "b", "y", "y", "y"]);

    assert!(output.contains("unrecognized input: maybe"));
    assert!(output.contains("(nothing to do)"));
    assert!(output.contains("End of diagnostic"));
    assert_eq!(current(&session), "<end>");
}

#[test]
fn given_back_and_restart_when_walking_then_path_follows() {
    let mut session = Session::new("M-100", coffee_machine());

    run_script(&mut session, &["n", "b", "y", "r"]);

    assert_eq!(current(&session), "q_power");
    assert_eq!(session.state().path().len(), 1);
}
