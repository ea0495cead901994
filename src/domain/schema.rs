//! Raw JSON shapes of the static diagnostic data
//!
//! These mirror the files on disk one to one. Validation and conversion
//! into domain entities happens in [`crate::domain::TreeBuilder`].

use serde::Deserialize;

use crate::domain::MachineEntry;

/// `machines.json`
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawMachineIndex {
    #[serde(default)]
    pub machines: Vec<RawMachine>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMachine {
    pub id: String,
    pub template_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl From<RawMachine> for MachineEntry {
    fn from(raw: RawMachine) -> Self {
        Self {
            id: raw.id,
            template_id: raw.template_id,
            name: raw.name,
        }
    }
}

/// One template file under `diagnostics/templates/`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTree {
    pub template_id: String,
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub locale: String,
    pub root: String,
    #[serde(default)]
    pub nodes: Vec<RawNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub yes: Option<String>,
    #[serde(default)]
    pub no: Option<String>,
    #[serde(default)]
    pub providers_shortcut: Option<bool>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub parts: Option<Vec<RawPartRef>>,
    #[serde(default)]
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RawPartRef {
    pub id: String,
    #[serde(default)]
    pub qty: Option<u32>,
}

/// `diagnostics/parts.json`
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawPartsCatalog {
    #[serde(default)]
    pub parts: Vec<RawCatalogPart>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCatalogPart {
    pub id: String,
    pub product: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub features: Option<String>,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub technical_contacts: Option<String>,
    #[serde(default)]
    pub image_res_name: Option<String>,
    /// End nodes this part should be suggested on
    #[serde(default)]
    pub node_refs: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_minimal_node_json_when_deserializing_then_optional_fields_default() {
        let json = r#"{"id":"q1","type":"QUESTION","title":"Power on?","yes":"q2"}"#;
        let node: RawNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.kind, "QUESTION");
        assert_eq!(node.yes.as_deref(), Some("q2"));
        assert!(node.no.is_none());
        assert!(node.parts.is_none());
        assert!(node.mode.is_none());
    }

    #[test]
    fn given_catalog_json_when_deserializing_then_reads_camel_case_fields() {
        let json = r#"{"parts":[{"id":"p1","product":"Fuse 5A","technicalContacts":"Ana",
            "imageResName":"fuse","nodeRefs":["end1"]}]}"#;
        let catalog: RawPartsCatalog = serde_json::from_str(json).unwrap();
        let part = &catalog.parts[0];
        assert_eq!(part.technical_contacts.as_deref(), Some("Ana"));
        assert_eq!(part.image_res_name.as_deref(), Some("fuse"));
        assert_eq!(part.node_refs, vec!["end1".to_string()]);
    }
}
