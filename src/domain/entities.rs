//! Domain entities: core data structures

use std::collections::HashMap;
use std::fmt;

/// Literal used in source data for "end of tree".
pub const TERMINAL_MARKER: &str = "END";

/// Machine index entry: maps a scanned machine id to a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineEntry {
    pub id: String,
    pub template_id: String,
    /// Human-readable model name, if the index provides one
    pub name: Option<String>,
}

/// Branch target of a question.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// A real node id
    Node(String),
    /// End of tree; resolved to an ephemeral end node at traversal time
    Terminal,
}

impl Target {
    /// Parse a raw branch value. Blank values yield `None`.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let value = raw?.trim();
        if value.is_empty() {
            None
        } else if value == TERMINAL_MARKER {
            Some(Target::Terminal)
        } else {
            Some(Target::Node(value.to_string()))
        }
    }

    pub fn node_id(&self) -> Option<&str> {
        match self {
            Target::Node(id) => Some(id),
            Target::Terminal => None,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Node(id) => write!(f, "{}", id),
            Target::Terminal => write!(f, "{}", TERMINAL_MARKER),
        }
    }
}

/// How a question is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuestionMode {
    #[default]
    YesNo,
    /// Informational step with a single outgoing edge (the yes-target)
    ContinueOnly,
}

/// Diagnosis classification of an end node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndResult {
    Resolved,
    #[default]
    NoIssue,
    ComponentFault,
}

impl fmt::Display for EndResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EndResult::Resolved => "RESOLVED",
            EndResult::NoIssue => "NO_ISSUE",
            EndResult::ComponentFault => "COMPONENT_FAULT",
        };
        write!(f, "{}", label)
    }
}

/// Spare part as listed in the parts catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartDetail {
    pub id: String,
    pub product: String,
    pub code: Option<String>,
    pub features: Option<String>,
    pub supplier: Option<String>,
    pub technical_contacts: Option<String>,
    pub image_ref: Option<String>,
}

/// Part attached to an end node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartRefResolved {
    pub detail: PartDetail,
    pub qty: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionNode {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub yes: Target,
    /// Always present for `YesNo`, usually absent for `ContinueOnly`
    pub no: Option<Target>,
    pub mode: QuestionMode,
    pub providers_shortcut: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndNode {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub result: EndResult,
    pub parts: Vec<PartRefResolved>,
    pub providers_shortcut: bool,
}

/// One point in a decision tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticNode {
    Question(QuestionNode),
    End(EndNode),
}

impl DiagnosticNode {
    pub fn id(&self) -> &str {
        match self {
            DiagnosticNode::Question(q) => &q.id,
            DiagnosticNode::End(e) => &e.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            DiagnosticNode::Question(q) => &q.title,
            DiagnosticNode::End(e) => &e.title,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            DiagnosticNode::Question(q) => q.description.as_deref(),
            DiagnosticNode::End(e) => e.description.as_deref(),
        }
    }

    pub fn is_question(&self) -> bool {
        matches!(self, DiagnosticNode::Question(_))
    }

    /// Outgoing branch targets (yes first). Empty for end nodes.
    pub fn targets(&self) -> Vec<&Target> {
        match self {
            DiagnosticNode::Question(q) => std::iter::once(&q.yes).chain(q.no.as_ref()).collect(),
            DiagnosticNode::End(_) => Vec::new(),
        }
    }
}

/// A validated, immutable decision tree for one template and locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticTree {
    pub template_id: String,
    pub version: u32,
    pub locale: String,
    root: String,
    nodes: Vec<DiagnosticNode>,
    index: HashMap<String, usize>,
}

impl DiagnosticTree {
    /// Assemble a tree from already validated parts.
    ///
    /// Callers must guarantee unique node ids and a present root; use
    /// [`crate::domain::TreeBuilder`] to construct trees from raw data.
    pub(crate) fn from_validated(
        template_id: String,
        version: u32,
        locale: String,
        root: String,
        nodes: Vec<DiagnosticNode>,
    ) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id().to_string(), i))
            .collect();
        Self {
            template_id,
            version,
            locale,
            root,
            nodes,
            index,
        }
    }

    pub fn root_id(&self) -> &str {
        &self.root
    }

    pub fn root(&self) -> Option<&DiagnosticNode> {
        self.node(&self.root)
    }

    pub fn node(&self, id: &str) -> Option<&DiagnosticNode> {
        self.index.get(id).and_then(|&i| self.nodes.get(i))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Nodes in source order.
    pub fn nodes(&self) -> &[DiagnosticNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
