//! Tree builder: validates raw template data and materializes a node graph.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::domain::entities::TERMINAL_MARKER;
use crate::domain::error::{DomainError, IntegrityViolation};
use crate::domain::parts::PartsResolver;
use crate::domain::schema::{RawNode, RawTree};
use crate::domain::{
    DiagnosticNode, DiagnosticTree, EndNode, EndResult, QuestionMode, QuestionNode, Target,
};

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, DomainError>;

/// Constructs validated trees from raw template data.
pub struct TreeBuilder<'a> {
    parts: &'a PartsResolver,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(parts: &'a PartsResolver) -> Self {
        Self { parts }
    }

    /// Build a tree, failing on the first integrity violation.
    ///
    /// No partial tree is returned.
    pub fn build(&self, raw: RawTree) -> TreeResult<DiagnosticTree> {
        let template = raw.template_id.clone();
        let fail = |violation| DomainError::integrity(template.clone(), violation);

        let mut seen = HashSet::with_capacity(raw.nodes.len());
        for node in &raw.nodes {
            let id = node.id.trim();
            if id.is_empty() {
                return Err(fail(IntegrityViolation::EmptyNodeId));
            }
            if id == TERMINAL_MARKER {
                return Err(fail(IntegrityViolation::ReservedNodeId(id.to_string())));
            }
            if !seen.insert(id) {
                return Err(fail(IntegrityViolation::DuplicateNode(id.to_string())));
            }
        }

        let root = raw.root.trim().to_string();
        if !seen.contains(root.as_str()) {
            return Err(fail(IntegrityViolation::MissingRoot(root)));
        }

        let nodes = raw
            .nodes
            .iter()
            .map(|n| self.build_node(&template, n))
            .collect::<TreeResult<Vec<_>>>()?;

        debug!(
            "built tree {} v{} ({}): {} nodes",
            raw.template_id,
            raw.version,
            raw.locale,
            nodes.len()
        );
        Ok(DiagnosticTree::from_validated(
            raw.template_id,
            raw.version,
            raw.locale,
            root,
            nodes,
        ))
    }

    fn build_node(&self, template: &str, raw: &RawNode) -> TreeResult<DiagnosticNode> {
        let fail = |violation| DomainError::integrity(template, violation);
        let id = raw.id.trim().to_string();

        match raw.kind.trim().to_uppercase().as_str() {
            "QUESTION" => {
                let mode = parse_mode(&id, raw.mode.as_deref()).map_err(fail)?;
                let yes = Target::parse(raw.yes.as_deref())
                    .ok_or_else(|| fail(IntegrityViolation::MissingYesTarget(id.clone())))?;
                let no = Target::parse(raw.no.as_deref());
                if no.is_none() && mode == QuestionMode::YesNo {
                    return Err(fail(IntegrityViolation::MissingNoTarget(id)));
                }
                if raw.parts.as_ref().is_some_and(|p| !p.is_empty()) {
                    warn!("question {} declares parts; ignored", id);
                }
                Ok(DiagnosticNode::Question(QuestionNode {
                    id,
                    title: raw.title.clone(),
                    description: raw.description.clone(),
                    yes,
                    no,
                    mode,
                    providers_shortcut: raw.providers_shortcut.unwrap_or(false),
                }))
            }
            "END" => {
                let result = parse_result(&id, raw.result.as_deref()).map_err(fail)?;
                let parts = self
                    .parts
                    .resolve(&id, raw.parts.as_deref().unwrap_or(&[]))?;
                Ok(DiagnosticNode::End(EndNode {
                    id,
                    title: raw.title.clone(),
                    description: raw.description.clone(),
                    result,
                    parts,
                    providers_shortcut: raw.providers_shortcut.unwrap_or(false),
                }))
            }
            _ => Err(fail(IntegrityViolation::UnknownNodeType {
                node: id,
                value: raw.kind.clone(),
            })),
        }
    }
}

fn parse_mode(node: &str, raw: Option<&str>) -> Result<QuestionMode, IntegrityViolation> {
    match raw.map(|m| m.trim().to_uppercase()).as_deref() {
        None | Some("YES_NO") => Ok(QuestionMode::YesNo),
        Some("CONTINUE_ONLY") => Ok(QuestionMode::ContinueOnly),
        Some(_) => Err(IntegrityViolation::UnknownMode {
            node: node.to_string(),
            value: raw.unwrap_or_default().to_string(),
        }),
    }
}

fn parse_result(node: &str, raw: Option<&str>) -> Result<EndResult, IntegrityViolation> {
    match raw.map(|r| r.trim().to_uppercase()).as_deref() {
        None | Some("NO_ISSUE") => Ok(EndResult::NoIssue),
        Some("RESOLVED") => Ok(EndResult::Resolved),
        Some("COMPONENT_FAULT") => Ok(EndResult::ComponentFault),
        Some(_) => Err(IntegrityViolation::UnknownResult {
            node: node.to_string(),
            value: raw.unwrap_or_default().to_string(),
        }),
    }
}
