use crate::types::Doc;
use crate::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// A parsed backend response.
///
/// `raw` keeps the original body for passthrough serialization; the typed
/// fields are views the handlers read. Documents stay schemaless.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SolrResponse {
    #[serde(default)]
    pub response: DocList,
    #[serde(default)]
    pub stats: Option<StatsSection>,
    #[serde(default)]
    pub facet_counts: Option<FacetCounts>,
    /// JSON facet results; shape mirrors the request.
    #[serde(default)]
    pub facets: Option<Value>,
    #[serde(default, rename = "nextCursorMark")]
    pub next_cursor_mark: Option<String>,
    #[serde(skip)]
    pub raw: Value,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DocList {
    #[serde(default, rename = "numFound")]
    pub num_found: u64,
    #[serde(default)]
    pub start: u64,
    #[serde(default)]
    pub docs: Vec<Doc>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StatsSection {
    #[serde(default)]
    pub stats_fields: HashMap<String, FieldStats>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct FieldStats {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub missing: u64,
    #[serde(default)]
    pub sum: f64,
    #[serde(default)]
    pub mean: f64,
    #[serde(default)]
    pub stddev: f64,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct FacetCounts {
    #[serde(default)]
    pub facet_ranges: HashMap<String, RangeFacet>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RangeFacet {
    /// Alternating bucket label / count entries, as the backend sends them.
    #[serde(default)]
    pub counts: Vec<Value>,
    #[serde(default)]
    pub gap: Option<Value>,
    #[serde(default)]
    pub start: Option<Value>,
    #[serde(default)]
    pub end: Option<Value>,
}

impl SolrResponse {
    /// Parse a backend body, keeping the raw JSON alongside the typed view.
    pub fn from_body(body: Value) -> Result<SolrResponse> {
        let mut parsed: SolrResponse = serde_json::from_value(body.clone())
            .map_err(|e| Error::Upstream(format!("unexpected backend response: {}", e)))?;
        parsed.raw = body;
        Ok(parsed)
    }

    pub fn docs(&self) -> &[Doc] {
        &self.response.docs
    }

    pub fn first_doc(&self) -> Option<&Doc> {
        self.response.docs.first()
    }

    pub fn stats_field(&self, field: &str) -> Option<&FieldStats> {
        self.stats.as_ref()?.stats_fields.get(field)
    }

    pub fn range_facet(&self, field: &str) -> Option<&RangeFacet> {
        self.facet_counts.as_ref()?.facet_ranges.get(field)
    }
}

impl RangeFacet {
    /// Bucket counts in range order, dropping the interleaved labels.
    pub fn bucket_counts(&self) -> Vec<u64> {
        self.counts
            .chunks(2)
            .filter_map(|pair| pair.get(1).and_then(Value::as_u64))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_body_parses_docs_and_keeps_raw() {
        let body = json!({
            "responseHeader": {"status": 0},
            "response": {
                "numFound": 2,
                "start": 0,
                "docs": [
                    {"genome_id": "83332.12"},
                    {"genome_id": "208964.12"}
                ]
            }
        });
        let parsed = SolrResponse::from_body(body.clone()).unwrap();
        assert_eq!(parsed.response.num_found, 2);
        assert_eq!(parsed.docs().len(), 2);
        assert_eq!(parsed.raw, body);
    }

    #[test]
    fn test_stats_fields() {
        let body = json!({
            "response": {"numFound": 120, "start": 0, "docs": []},
            "stats": {
                "stats_fields": {
                    "na_length": {"min": 60.0, "max": 4200.0, "count": 120,
                                  "missing": 0, "sum": 96000.0, "mean": 800.0,
                                  "stddev": 12.5}
                }
            }
        });
        let parsed = SolrResponse::from_body(body).unwrap();
        let stats = parsed.stats_field("na_length").unwrap();
        assert_eq!(stats.sum, 96000.0);
        assert_eq!(stats.count, 120);
        assert!(parsed.stats_field("aa_length").is_none());
    }

    #[test]
    fn test_range_facet_bucket_counts() {
        let body = json!({
            "response": {"numFound": 9, "start": 0, "docs": []},
            "facet_counts": {
                "facet_ranges": {
                    "start": {
                        "counts": ["0", 4, "2000", 2, "4000", 3],
                        "gap": 2000,
                        "start": 0,
                        "end": 6000
                    }
                }
            }
        });
        let parsed = SolrResponse::from_body(body).unwrap();
        let facet = parsed.range_facet("start").unwrap();
        assert_eq!(facet.bucket_counts(), vec![4, 2, 3]);
    }
}
