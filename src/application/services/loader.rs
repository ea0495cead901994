//! Tree loader service
//!
//! Resolves a machine id to its template, picks the best locale variant,
//! and builds a validated tree with parts attached.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::schema::{RawMachineIndex, RawPartsCatalog, RawTree};
use crate::domain::{DiagnosticTree, MachineEntry, PartsResolver, TreeBuilder};
use crate::infrastructure::traits::FileSystem;

/// Template file chosen by locale fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSource {
    pub path: PathBuf,
    /// Locale the candidate was selected for
    pub locale: String,
}

/// Service loading diagnostic trees from the static data directory.
pub struct TreeLoader {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
    template_id_regex: Regex,
}

impl TreeLoader {
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self {
            fs,
            settings,
            template_id_regex: Regex::new(r"^[A-Za-z0-9_.-]+$").expect("valid template id regex"),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// All machines from the index, in file order.
    pub fn machines(&self) -> ApplicationResult<Vec<MachineEntry>> {
        let index: RawMachineIndex = self.read_json(&self.settings.machines_path(), "machine index")?;
        Ok(index.machines.into_iter().map(MachineEntry::from).collect())
    }

    /// Look up one machine in the index.
    pub fn machine(&self, machine_id: &str) -> ApplicationResult<MachineEntry> {
        self.machines()?
            .into_iter()
            .find(|m| m.id == machine_id)
            .ok_or_else(|| ApplicationError::MachineNotFound(machine_id.to_string()))
    }

    /// Resolve a machine id into a validated tree.
    ///
    /// Fails if the machine is unmapped, no locale variant of its template
    /// exists, the tree is malformed, or a part reference dangles.
    #[instrument(skip(self))]
    pub fn resolve(&self, machine_id: &str) -> ApplicationResult<DiagnosticTree> {
        let machine = self.machine(machine_id)?;
        debug!("machine {} -> template {}", machine.id, machine.template_id);
        self.load_template(&machine.template_id)
    }

    /// Load and validate a template by id.
    #[instrument(skip(self))]
    pub fn load_template(&self, template_id: &str) -> ApplicationResult<DiagnosticTree> {
        let source = self.locate_template(template_id)?;
        let raw: RawTree = self.read_json(&source.path, "template")?;
        let catalog = self.catalog()?;
        self.build(raw, &catalog)
    }

    /// Build a parsed template against a catalog.
    pub fn build(&self, raw: RawTree, catalog: &RawPartsCatalog) -> ApplicationResult<DiagnosticTree> {
        let resolver = PartsResolver::new(catalog);
        Ok(TreeBuilder::new(&resolver).build(raw)?)
    }

    /// Parts catalog; a missing catalog file means "no parts".
    pub fn catalog(&self) -> ApplicationResult<RawPartsCatalog> {
        let path = self.settings.parts_path();
        if !self.fs.exists(&path) {
            debug!("no parts catalog at {}", path.display());
            return Ok(RawPartsCatalog::default());
        }
        self.read_json(&path, "parts catalog")
    }

    /// Pick the template file by locale fallback: preferred, then default.
    ///
    /// The default locale may also be stored as the unsuffixed `<id>.json`.
    pub fn locate_template(&self, template_id: &str) -> ApplicationResult<TemplateSource> {
        if !self.template_id_regex.is_match(template_id) {
            return Err(ApplicationError::InvalidTemplateId(template_id.to_string()));
        }

        let dir = self.settings.templates_dir();
        let candidates = self.settings.locale_candidates();
        let default_locale = self.settings.default_locale.trim();

        for locale in &candidates {
            let mut paths = vec![dir.join(format!("{}.{}.json", template_id, locale))];
            if locale == default_locale {
                paths.push(dir.join(format!("{}.json", template_id)));
            }
            if let Some(path) = paths.into_iter().find(|p| self.fs.is_file(p)) {
                debug!("template {} locale {}: {}", template_id, locale, path.display());
                return Ok(TemplateSource {
                    path,
                    locale: locale.clone(),
                });
            }
        }

        Err(ApplicationError::TemplateNotFound {
            template: template_id.to_string(),
            locales: candidates,
        })
    }

    fn read_json<T: DeserializeOwned>(&self, path: &Path, what: &str) -> ApplicationResult<T> {
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context(&format!("read {}", what), path)?;
        serde_json::from_str(&content).with_path_context(&format!("parse {}", what), path)
    }
}
