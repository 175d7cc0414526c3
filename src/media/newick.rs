//! Taxonomy tree lookup for `application/newick+json` responses.
//!
//! Precomputed trees exist only for some taxa. The lookup walks the
//! taxon's lineage from the most specific node upward and serves the
//! first `{taxon_id}.json` present in the tree directory.

use crate::metrics::METRICS;
use crate::types::Doc;
use crate::Result;
use serde_json::Value;
use std::path::Path;
use std::sync::atomic::Ordering;

pub async fn tree_for_taxon(tree_dir: &Path, doc: &Doc) -> Result<Option<String>> {
    let lineage = match doc.get("lineage_ids").and_then(Value::as_array) {
        Some(lineage) => lineage,
        None => {
            METRICS.tree_misses.fetch_add(1, Ordering::Relaxed);
            return Ok(None);
        }
    };

    for taxon in lineage.iter().rev() {
        let Some(taxon_id) = taxon_id(taxon) else {
            continue;
        };
        let path = tree_dir.join(format!("{}.json", taxon_id));
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => return Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e.into()),
        }
    }

    METRICS.tree_misses.fetch_add(1, Ordering::Relaxed);
    Ok(None)
}

// Lineage ids arrive as numbers from some backends and strings from others.
fn taxon_id(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}
