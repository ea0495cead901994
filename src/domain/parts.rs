//! Parts resolution: attaches catalog entries to end nodes.

use std::collections::HashMap;

use itertools::Itertools;
use tracing::debug;

use crate::domain::error::DomainError;
use crate::domain::schema::{RawCatalogPart, RawPartRef, RawPartsCatalog};
use crate::domain::{PartDetail, PartRefResolved};

/// Index over a parts catalog, built once per tree resolution.
#[derive(Debug, Default)]
pub struct PartsResolver {
    by_id: HashMap<String, PartDetail>,
    /// node id -> part ids declared via `nodeRefs`, in catalog order
    by_node: HashMap<String, Vec<String>>,
}

impl PartsResolver {
    pub fn new(catalog: &RawPartsCatalog) -> Self {
        let mut by_id = HashMap::new();
        let mut by_node: HashMap<String, Vec<String>> = HashMap::new();

        for part in &catalog.parts {
            for node_id in &part.node_refs {
                by_node
                    .entry(node_id.clone())
                    .or_default()
                    .push(part.id.clone());
            }
            // first definition wins on duplicate catalog ids
            by_id
                .entry(part.id.clone())
                .or_insert_with(|| detail_from_raw(part));
        }

        debug!(
            "parts catalog indexed: {} parts, {} referenced nodes",
            by_id.len(),
            by_node.len()
        );
        Self { by_id, by_node }
    }

    /// Resolve the parts list of one end node.
    ///
    /// Inline references come first, catalog-declared ones second, each in
    /// source order; duplicates by part id keep their first occurrence.
    pub fn resolve(
        &self,
        node_id: &str,
        inline: &[RawPartRef],
    ) -> Result<Vec<PartRefResolved>, DomainError> {
        let mut resolved = Vec::with_capacity(inline.len());

        for part_ref in inline {
            let detail = self
                .by_id
                .get(&part_ref.id)
                .ok_or_else(|| DomainError::UnknownPart {
                    part_id: part_ref.id.clone(),
                    node_id: node_id.to_string(),
                })?;
            resolved.push(PartRefResolved {
                detail: detail.clone(),
                qty: part_ref.qty,
            });
        }

        if let Some(declared) = self.by_node.get(node_id) {
            for part_id in declared {
                // catalog-declared ids come from the catalog itself
                if let Some(detail) = self.by_id.get(part_id) {
                    resolved.push(PartRefResolved {
                        detail: detail.clone(),
                        qty: None,
                    });
                }
            }
        }

        Ok(resolved
            .into_iter()
            .unique_by(|p| p.detail.id.clone())
            .collect())
    }
}

fn detail_from_raw(raw: &RawCatalogPart) -> PartDetail {
    PartDetail {
        id: raw.id.clone(),
        product: raw.product.clone(),
        code: raw.code.clone(),
        features: raw.features.clone(),
        supplier: raw.supplier.clone(),
        technical_contacts: raw.technical_contacts.clone(),
        image_ref: raw.image_res_name.clone(),
    }
}
