//! Text rendering of trees and walk positions

use std::collections::HashSet;
use std::io::{self, Write};

use colored::Colorize;
use termtree::Tree;

use crate::application::services::SessionView;
use crate::domain::{
    DiagnosticNode, DiagnosticTree, EndNode, EndResult, EphemeralEnd, PartRefResolved, Position,
    QuestionMode, Target,
};

/// Deepest question chain expanded by [`tree_view`].
pub const MAX_DEPTH: usize = 64;

/// Render the decision tree from its root, yes edge before no edge.
///
/// Nodes reachable along several paths are expanded once; later occurrences
/// point back to the first one. Branches deeper than [`MAX_DEPTH`] are cut.
pub fn tree_view(tree: &DiagnosticTree) -> Tree<String> {
    let mut expanded = HashSet::new();
    let label = format!("{} v{} ({})", tree.template_id, tree.version, tree.locale);
    Tree::new(label).with_leaves([subtree(tree, None, tree.root_id(), 0, &mut expanded)])
}

fn subtree<'a>(
    tree: &'a DiagnosticTree,
    edge: Option<&str>,
    id: &'a str,
    depth: usize,
    expanded: &mut HashSet<&'a str>,
) -> Tree<String> {
    let prefix = edge.map(|e| format!("[{}] ", e)).unwrap_or_default();
    let Some(node) = tree.node(id) else {
        return Tree::new(format!("{}{} (missing)", prefix, id));
    };
    if depth >= MAX_DEPTH {
        return Tree::new(format!("{}{} (truncated)", prefix, id));
    }
    if !expanded.insert(id) {
        return Tree::new(format!("{}{} (see above)", prefix, id));
    }

    match node {
        DiagnosticNode::Question(q) => {
            let mut t = Tree::new(format!("{}{}: {}", prefix, q.id, q.title));
            let edges: Vec<(&str, &Target)> = match q.mode {
                QuestionMode::ContinueOnly => vec![("continue", &q.yes)],
                QuestionMode::YesNo => std::iter::once(("yes", &q.yes))
                    .chain(q.no.as_ref().map(|no| ("no", no)))
                    .collect(),
            };
            for (label, target) in edges {
                let child = match target {
                    Target::Node(next) => subtree(tree, Some(label), next, depth + 1, expanded),
                    Target::Terminal => Tree::new(format!("[{}] END", label)),
                };
                t.push(child);
            }
            t
        }
        DiagnosticNode::End(e) => {
            let mut t = Tree::new(format!("{}{}: {} => {}", prefix, e.id, e.title, e.result));
            for part in &e.parts {
                t.push(Tree::new(format!("part: {}", part_line(part))));
            }
            t
        }
    }
}

fn part_line(part: &PartRefResolved) -> String {
    let mut line = part.detail.product.clone();
    if let Some(code) = &part.detail.code {
        line.push_str(&format!(" [{}]", code));
    }
    if let Some(qty) = part.qty {
        line.push_str(&format!(" x{}", qty));
    }
    line
}

/// Render the current walk position.
pub fn position(out: &mut dyn Write, view: &SessionView<'_>) -> io::Result<()> {
    writeln!(out)?;
    match view.position {
        Position::Node(DiagnosticNode::Question(q)) => {
            writeln!(out, "{}", q.title.cyan().bold())?;
            if let Some(description) = &q.description {
                writeln!(out, "  {}", description)?;
            }
            if q.providers_shortcut {
                writeln!(out, "  (suppliers can help with this step)")?;
            }
        }
        Position::Node(DiagnosticNode::End(e)) => end(out, e)?,
        Position::EphemeralEnd(_) => {
            writeln!(out, "{}", EphemeralEnd::TITLE.cyan().bold())?;
            writeln!(out, "  {}", EphemeralEnd::DESCRIPTION)?;
        }
        Position::Missing(id) => {
            writeln!(out, "{}: node {} not found", "error".red().bold(), id)?;
        }
    }
    Ok(())
}

fn end(out: &mut dyn Write, node: &EndNode) -> io::Result<()> {
    let badge = match node.result {
        EndResult::Resolved => "RESOLVED".green().bold(),
        EndResult::NoIssue => "NO ISSUE".yellow().bold(),
        EndResult::ComponentFault => "COMPONENT FAULT".red().bold(),
    };
    writeln!(out, "{} {}", badge, node.title.bold())?;
    if let Some(description) = &node.description {
        writeln!(out, "  {}", description)?;
    }
    if !node.parts.is_empty() {
        writeln!(out, "  Spare parts:")?;
        for part in &node.parts {
            writeln!(out, "    - {}", part_line(part))?;
            let d = &part.detail;
            for (label, value) in [
                ("features", &d.features),
                ("supplier", &d.supplier),
                ("technical contact", &d.technical_contacts),
            ] {
                if let Some(value) = value {
                    writeln!(out, "      {}: {}", label, value)?;
                }
            }
        }
    }
    if node.providers_shortcut {
        writeln!(out, "  Contact your suppliers for a replacement.")?;
    }
    Ok(())
}
