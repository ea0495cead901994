//! Traversal state machine over a validated [`DiagnosticTree`].
//!
//! The state is an owned value; every transition borrows the tree it walks.
//! Transitions never fail: invalid moves are no-ops and lookup misses show up
//! as [`Position::Missing`].

use std::fmt;

use tracing::{debug, trace};

use crate::domain::entities::TERMINAL_MARKER;
use crate::domain::{DiagnosticNode, DiagnosticTree, QuestionMode, Target};

/// User answer to the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    /// Single-edge step of a continue-only question; follows the yes-target
    Continue,
}

/// Undo-stack entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathEntry {
    Node(String),
    /// Terminal marker: end reached through a branch, not a real node
    Terminal,
}

impl fmt::Display for PathEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathEntry::Node(id) => write!(f, "{}", id),
            PathEntry::Terminal => write!(f, "{}", TERMINAL_MARKER),
        }
    }
}

/// End node synthesized when a branch targets the terminal marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EphemeralEnd;

impl EphemeralEnd {
    pub const TITLE: &'static str = "End of diagnostic";
    pub const DESCRIPTION: &'static str =
        "No further checks apply. Contact a technician if the problem persists.";
}

/// What the presentation layer should show for the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position<'a> {
    Node(&'a DiagnosticNode),
    EphemeralEnd(EphemeralEnd),
    /// Current id does not resolve; render as "node not found"
    Missing(&'a str),
}

impl Position<'_> {
    pub fn is_terminal(&self) -> bool {
        match self {
            Position::Node(node) => !node.is_question(),
            Position::EphemeralEnd(_) => true,
            Position::Missing(_) => false,
        }
    }
}

/// Current node id plus the visited path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalState {
    root: String,
    current: String,
    path: Vec<PathEntry>,
}

impl TraversalState {
    /// Start at the tree root with `path = [root]`.
    pub fn new(tree: &DiagnosticTree) -> Self {
        let root = tree.root_id().to_string();
        Self {
            current: root.clone(),
            path: vec![PathEntry::Node(root.clone())],
            root,
        }
    }

    pub fn current_id(&self) -> &str {
        &self.current
    }

    pub fn path(&self) -> &[PathEntry] {
        &self.path
    }

    pub fn can_go_back(&self) -> bool {
        self.path.len() > 1
    }

    pub fn at_terminal_marker(&self) -> bool {
        matches!(self.path.last(), Some(PathEntry::Terminal))
    }

    /// Resolve the current state against the tree.
    pub fn position<'a>(&'a self, tree: &'a DiagnosticTree) -> Position<'a> {
        if self.at_terminal_marker() {
            return Position::EphemeralEnd(EphemeralEnd);
        }
        match tree.node(&self.current) {
            Some(node) => Position::Node(node),
            None => Position::Missing(&self.current),
        }
    }

    /// Apply an answer. Returns `true` if the state changed.
    ///
    /// Only valid while positioned on a question; anything else is a no-op.
    pub fn answer(&mut self, tree: &DiagnosticTree, answer: Answer) -> bool {
        let target = match self.position(tree) {
            Position::Node(DiagnosticNode::Question(q)) => match answer {
                Answer::Yes => Some(q.yes.clone()),
                Answer::No => q.no.clone(),
                Answer::Continue if q.mode == QuestionMode::ContinueOnly => Some(q.yes.clone()),
                Answer::Continue => None,
            },
            other => {
                trace!("answer {:?} ignored at {:?}", answer, other);
                return false;
            }
        };

        match target {
            Some(target) => {
                self.go_to(target);
                true
            }
            None => {
                trace!("answer {:?} at {} has no target", answer, self.current);
                false
            }
        }
    }

    fn go_to(&mut self, target: Target) {
        match target {
            // current id stays on the question; the marker only lives in the path
            Target::Terminal => self.path.push(PathEntry::Terminal),
            // pushed even when dangling, so `go_back` can leave a missing node
            Target::Node(id) => {
                self.path.push(PathEntry::Node(id.clone()));
                self.current = id;
            }
        }
        debug!("advance: current={} depth={}", self.current, self.path.len());
    }

    /// Step back one answer. Returns `true` if the state changed.
    pub fn go_back(&mut self) -> bool {
        if self.path.len() <= 1 {
            return false;
        }

        if self.at_terminal_marker() {
            self.path.pop();
        }

        if self.path.len() <= 1 {
            self.current = self.root.clone();
        } else {
            self.path.pop();
            self.current = match self.path.last() {
                Some(PathEntry::Node(id)) => id.clone(),
                _ => self.root.clone(),
            };
        }

        if self.path.is_empty() {
            self.path.push(PathEntry::Node(self.root.clone()));
        }
        debug!("back: current={} depth={}", self.current, self.path.len());
        true
    }

    /// Truncate the path back to `[root]`.
    pub fn restart(&mut self) {
        self.path.clear();
        self.path.push(PathEntry::Node(self.root.clone()));
        self.current = self.root.clone();
        debug!("restart: current={}", self.current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::{RawNode, RawTree};
    use crate::domain::{PartsResolver, TreeBuilder};

    fn node(id: &str, kind: &str, yes: Option<&str>, no: Option<&str>) -> RawNode {
        RawNode {
            id: id.to_string(),
            kind: kind.to_string(),
            title: id.to_uppercase(),
            description: None,
            yes: yes.map(str::to_string),
            no: no.map(str::to_string),
            providers_shortcut: None,
            result: None,
            parts: None,
            mode: None,
        }
    }

    fn sample_tree() -> DiagnosticTree {
        let raw = RawTree {
            template_id: "t".into(),
            version: 1,
            locale: "en".into(),
            root: "q1".into(),
            nodes: vec![
                node("q1", "QUESTION", Some("q2"), Some("END")),
                node("q2", "QUESTION", Some("end1"), Some("end1")),
                node("end1", "END", None, None),
            ],
        };
        TreeBuilder::new(&PartsResolver::default())
            .build(raw)
            .unwrap()
    }

    #[test]
    fn given_new_state_then_positioned_at_root_with_single_entry_path() {
        let tree = sample_tree();
        let state = TraversalState::new(&tree);

        assert_eq!(state.current_id(), "q1");
        assert_eq!(state.path(), &[PathEntry::Node("q1".into())]);
        assert!(!state.can_go_back());
    }

    #[test]
    fn given_terminal_marker_reached_when_answering_then_no_op() {
        let tree = sample_tree();
        let mut state = TraversalState::new(&tree);
        state.answer(&tree, Answer::No);

        let before = state.clone();
        assert!(!state.answer(&tree, Answer::Yes));
        assert_eq!(state, before);
    }

    #[test]
    fn given_end_node_when_answering_then_no_op() {
        let tree = sample_tree();
        let mut state = TraversalState::new(&tree);
        state.answer(&tree, Answer::Yes);
        state.answer(&tree, Answer::Yes);
        assert_eq!(state.current_id(), "end1");

        assert!(!state.answer(&tree, Answer::No));
        assert_eq!(state.current_id(), "end1");
    }

    #[test]
    fn given_yes_no_question_when_answering_continue_then_no_op() {
        let tree = sample_tree();
        let mut state = TraversalState::new(&tree);

        assert!(!state.answer(&tree, Answer::Continue));
        assert_eq!(state.path().len(), 1);
    }
}
