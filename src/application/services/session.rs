//! Diagnostic session: one loaded tree plus its traversal state.
//!
//! This is the surface a presentation layer drives: it forwards user events
//! and renders [`SessionView`] snapshots.

use std::sync::Arc;

use tracing::debug;

use crate::domain::{Answer, DiagnosticTree, PathEntry, Position, TraversalState};

/// User event forwarded by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Answer(Answer),
    Back,
    Restart,
}

/// Snapshot for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionView<'a> {
    pub position: Position<'a>,
    pub path: &'a [PathEntry],
    pub can_go_back: bool,
}

#[derive(Debug, Clone)]
pub struct Session {
    machine_id: String,
    tree: Arc<DiagnosticTree>,
    state: TraversalState,
}

impl Session {
    pub fn new(machine_id: impl Into<String>, tree: Arc<DiagnosticTree>) -> Self {
        let state = TraversalState::new(&tree);
        Self {
            machine_id: machine_id.into(),
            tree,
            state,
        }
    }

    pub fn machine_id(&self) -> &str {
        &self.machine_id
    }

    pub fn tree(&self) -> &DiagnosticTree {
        &self.tree
    }

    pub fn state(&self) -> &TraversalState {
        &self.state
    }

    pub fn position(&self) -> Position<'_> {
        self.state.position(&self.tree)
    }

    pub fn view(&self) -> SessionView<'_> {
        SessionView {
            position: self.position(),
            path: self.state.path(),
            can_go_back: self.state.can_go_back(),
        }
    }

    /// Apply one event. Returns `true` if the state changed.
    pub fn apply(&mut self, command: SessionCommand) -> bool {
        let changed = match command {
            SessionCommand::Answer(answer) => self.state.answer(&self.tree, answer),
            SessionCommand::Back => self.state.go_back(),
            SessionCommand::Restart => {
                self.state.restart();
                true
            }
        };
        debug!(
            "{}: {:?} -> current={} changed={}",
            self.machine_id,
            command,
            self.state.current_id(),
            changed
        );
        changed
    }

    pub fn answer_yes(&mut self) -> bool {
        self.apply(SessionCommand::Answer(Answer::Yes))
    }

    pub fn answer_no(&mut self) -> bool {
        self.apply(SessionCommand::Answer(Answer::No))
    }

    pub fn answer_continue(&mut self) -> bool {
        self.apply(SessionCommand::Answer(Answer::Continue))
    }

    pub fn go_back(&mut self) -> bool {
        self.apply(SessionCommand::Back)
    }

    pub fn restart(&mut self) {
        self.apply(SessionCommand::Restart);
    }

    pub fn can_go_back(&self) -> bool {
        self.state.can_go_back()
    }
}
