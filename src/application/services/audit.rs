//! Data directory audit
//!
//! Loads every template file found under the templates directory and every
//! machine mapping, and collects integrity errors and audit findings instead
//! of stopping at the first one.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::application::services::TreeLoader;
use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::schema::{RawPartsCatalog, RawTree};
use crate::domain::{audit, AuditReport, MachineEntry};
use crate::infrastructure::traits::FileSystem;

#[derive(Debug, Clone)]
pub enum TemplateOutcome {
    Loaded {
        template_id: String,
        nodes: usize,
        report: AuditReport,
    },
    Failed { error: String },
}

#[derive(Debug, Clone)]
pub struct TemplateAudit {
    pub path: PathBuf,
    pub outcome: TemplateOutcome,
}

impl TemplateAudit {
    pub fn problem_count(&self) -> usize {
        match &self.outcome {
            TemplateOutcome::Loaded { report, .. } => report.findings.len(),
            TemplateOutcome::Failed { .. } => 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MachineAudit {
    pub machine: MachineEntry,
    /// Why the machine's template cannot be located, if it cannot
    pub error: Option<String>,
}

/// Problem with the data directory as a whole rather than one template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataIssue {
    MissingTemplatesDir(PathBuf),
    NoTemplates(PathBuf),
    /// Parts catalog present but unreadable; parts were not checked
    Catalog(String),
    /// Machine index missing or unreadable; mappings were not checked
    MachineIndex(String),
}

impl fmt::Display for DataIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataIssue::MissingTemplatesDir(dir) => {
                write!(f, "templates directory not found: {}", dir.display())
            }
            DataIssue::NoTemplates(dir) => write!(f, "no templates in {}", dir.display()),
            DataIssue::Catalog(error) => write!(f, "parts not checked: {}", error),
            DataIssue::MachineIndex(error) => write!(f, "machines not checked: {}", error),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AuditSummary {
    pub issues: Vec<DataIssue>,
    pub templates: Vec<TemplateAudit>,
    pub machines: Vec<MachineAudit>,
}

impl AuditSummary {
    pub fn problem_count(&self) -> usize {
        self.issues.len()
            + self.templates.iter().map(TemplateAudit::problem_count).sum::<usize>()
            + self.machines.iter().filter(|m| m.error.is_some()).count()
    }

    pub fn is_clean(&self) -> bool {
        self.problem_count() == 0
    }
}

/// Service auditing a whole data directory.
pub struct AuditService {
    fs: Arc<dyn FileSystem>,
    loader: Arc<TreeLoader>,
}

impl AuditService {
    pub fn new(fs: Arc<dyn FileSystem>, loader: Arc<TreeLoader>) -> Self {
        Self { fs, loader }
    }

    /// Audit every template file and machine mapping.
    ///
    /// Never stops early: unreadable shared files become [`DataIssue`]s and
    /// the remaining checks still run.
    #[instrument(skip(self))]
    pub fn run(&self) -> AuditSummary {
        let mut summary = AuditSummary::default();

        // Without a catalog, templates are still checked structurally.
        let catalog = match self.loader.catalog() {
            Ok(catalog) => Some(catalog),
            Err(e) => {
                summary.issues.push(DataIssue::Catalog(e.to_string()));
                None
            }
        };

        for path in self.template_files(&mut summary.issues) {
            let outcome = match self.parse(&path) {
                Ok(raw) => self.check_template(raw, catalog.as_ref()),
                Err(e) => TemplateOutcome::Failed {
                    error: e.to_string(),
                },
            };
            summary.templates.push(TemplateAudit { path, outcome });
        }

        match self.loader.machines() {
            Ok(machines) => {
                for machine in machines {
                    let error = self
                        .loader
                        .locate_template(&machine.template_id)
                        .err()
                        .map(|e| e.to_string());
                    summary.machines.push(MachineAudit { machine, error });
                }
            }
            Err(e) => summary.issues.push(DataIssue::MachineIndex(e.to_string())),
        }

        debug!(
            "audit: {} templates, {} machines, {} problems",
            summary.templates.len(),
            summary.machines.len(),
            summary.problem_count()
        );
        summary
    }

    fn check_template(
        &self,
        mut raw: RawTree,
        catalog: Option<&RawPartsCatalog>,
    ) -> TemplateOutcome {
        let empty = RawPartsCatalog::default();
        let catalog = match catalog {
            Some(catalog) => catalog,
            None => {
                for node in &mut raw.nodes {
                    node.parts = None;
                }
                &empty
            }
        };
        match self.loader.build(raw, catalog) {
            Ok(tree) => TemplateOutcome::Loaded {
                template_id: tree.template_id.clone(),
                nodes: tree.len(),
                report: audit(&tree),
            },
            Err(e) => TemplateOutcome::Failed {
                error: e.to_string(),
            },
        }
    }

    /// Template files, sorted for stable output.
    fn template_files(&self, issues: &mut Vec<DataIssue>) -> Vec<PathBuf> {
        let dir = self.loader.settings().templates_dir();
        if !self.fs.is_dir(&dir) {
            warn!("templates directory not found: {}", dir.display());
            issues.push(DataIssue::MissingTemplatesDir(dir));
            return Vec::new();
        }
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(&dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| p.extension().map(|ext| ext == "json").unwrap_or(false))
            .collect();
        files.sort();
        if files.is_empty() {
            issues.push(DataIssue::NoTemplates(dir));
        }
        files
    }

    fn parse(&self, path: &Path) -> ApplicationResult<RawTree> {
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read template", path)?;
        serde_json::from_str(&content).with_path_context("parse template", path)
    }
}
