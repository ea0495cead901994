//! Consistency audit of a loaded tree: dangling branches and orphaned nodes.
//!
//! Loading only rejects trees that cannot be walked at all. A tree that
//! passes loading may still point at ids it does not define, or carry nodes
//! no answer sequence can reach; the audit reports both.

use std::collections::HashSet;
use std::fmt;

use crate::domain::{DiagnosticTree, Target};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// Branch target that is neither a node id nor the terminal marker
    DanglingTarget { node: String, target: String },
    /// Node not reachable from the root via yes/no edges
    Unreachable(String),
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::DanglingTarget { node, target } => {
                write!(f, "node {} references unknown node {}", node, target)
            }
            Finding::Unreachable(id) => write!(f, "node {} is unreachable from root", id),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditReport {
    pub findings: Vec<Finding>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

pub fn audit(tree: &DiagnosticTree) -> AuditReport {
    let mut findings = Vec::new();

    for node in tree.nodes() {
        for target in node.targets() {
            if let Target::Node(id) = target {
                if !tree.contains(id) {
                    findings.push(Finding::DanglingTarget {
                        node: node.id().to_string(),
                        target: id.clone(),
                    });
                }
            }
        }
    }

    let reachable = reachable_from_root(tree);
    findings.extend(
        tree.nodes()
            .iter()
            .filter(|n| !reachable.contains(n.id()))
            .map(|n| Finding::Unreachable(n.id().to_string())),
    );

    AuditReport { findings }
}

/// Ids reachable from the root; iterative to stay safe on deep or cyclic trees.
pub fn reachable_from_root(tree: &DiagnosticTree) -> HashSet<&str> {
    let mut visited = HashSet::new();
    let mut stack = vec![tree.root_id()];

    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        if let Some(node) = tree.node(id) {
            for target in node.targets() {
                if let Some(next) = target.node_id() {
                    stack.push(next);
                }
            }
        }
    }
    visited
}
