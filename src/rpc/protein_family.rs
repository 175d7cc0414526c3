//! `proteinFamily` method.
//!
//! Summarizes protein families across a set of genomes for the family
//! heatmap: one facet query over `genome_feature` buckets the CDS features
//! by family id with per-genome sub-buckets and `aa_length` statistics,
//! then family descriptions are filled in from `protein_family_ref`.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{Error, Result};
use crate::rql::escape_value;
use crate::solr::{SearchBackend, SolrQuery};
use crate::types::Collection;

/// Family ids per description lookup request.
const DESCRIPTION_CHUNK: usize = 500;

/// Heatmap cell values are two hex digits, so member counts saturate here.
const HEAT_MAX: u64 = 0xff;

#[derive(Debug, Deserialize)]
pub struct FamilyQuery {
    #[serde(rename = "familyType")]
    family_type: String,
    #[serde(rename = "genomeIds", default)]
    genome_ids: Vec<String>,
    #[serde(default)]
    keyword: String,
    /// `A` for all families, `Y` for perfect matches only, `N` for the rest.
    #[serde(rename = "perfectFamMatch", default)]
    perfect_match: Option<String>,
    #[serde(default)]
    min_member_count: Option<u64>,
    #[serde(default)]
    max_member_count: Option<u64>,
    #[serde(default)]
    min_genome_count: Option<u64>,
    #[serde(default)]
    max_genome_count: Option<u64>,
}

impl FamilyQuery {
    fn family_field(&self) -> Result<&'static str> {
        match self.family_type.as_str() {
            "plfam" => Ok("plfam_id"),
            "pgfam" => Ok("pgfam_id"),
            "figfam" => Ok("figfam_id"),
            other => Err(Error::InvalidQuery(format!("unknown familyType: {other}"))),
        }
    }

    fn matches(&self, family_id: &str, description: &str, members: u64, genomes: u64) -> bool {
        if !self.keyword.is_empty() {
            let keyword = self.keyword.to_lowercase();
            if !description.to_lowercase().contains(&keyword)
                && !family_id.to_lowercase().contains(&keyword)
            {
                return false;
            }
        }
        // A perfect family has exactly one member in every selected genome.
        let selected = self.genome_ids.len() as u64;
        let perfect = members == selected && genomes == selected;
        match self.perfect_match.as_deref() {
            Some("Y") if !perfect => return false,
            Some("N") if perfect => return false,
            _ => {}
        }
        if self.min_member_count.is_some_and(|min| members < min) {
            return false;
        }
        if self.max_member_count.is_some_and(|max| members > max) {
            return false;
        }
        if self.min_genome_count.is_some_and(|min| genomes < min) {
            return false;
        }
        if self.max_genome_count.is_some_and(|max| genomes > max) {
            return false;
        }
        true
    }
}

/// params are `[state, options]`; only the state object is read.
pub async fn run(backend: &dyn SearchBackend, params: &Value) -> Result<Value> {
    let state = params
        .get(0)
        .cloned()
        .ok_or_else(|| Error::InvalidQuery("proteinFamily params missing".to_string()))?;
    let query: FamilyQuery = serde_json::from_value(state)
        .map_err(|e| Error::InvalidQuery(format!("invalid proteinFamily params: {e}")))?;
    if query.genome_ids.is_empty() {
        return Ok(Value::Array(Vec::new()));
    }
    let field = query.family_field()?;

    let buckets = family_buckets(backend, &query, field).await?;
    let family_ids: Vec<String> = buckets
        .iter()
        .filter_map(|bucket| bucket["val"].as_str().map(str::to_owned))
        .collect();
    let descriptions = family_descriptions(backend, &family_ids).await?;

    let mut rows = Vec::with_capacity(buckets.len());
    for bucket in &buckets {
        let Some(family_id) = bucket["val"].as_str() else {
            continue;
        };
        let feature_count = bucket["count"].as_u64().unwrap_or(0);
        let genome_count = bucket["genome_count"].as_u64().unwrap_or(0);
        let description = descriptions.get(family_id).cloned().unwrap_or_default();
        if !query.matches(family_id, &description, feature_count, genome_count) {
            continue;
        }
        rows.push(json!({
            "family_id": family_id,
            "feature_count": feature_count,
            "genome_count": genome_count,
            "genomes": genome_heat(&query.genome_ids, bucket),
            "description": description,
            "aa_length_min": stat(bucket, "aa_length_min"),
            "aa_length_max": stat(bucket, "aa_length_max"),
            "aa_length_mean": stat(bucket, "aa_length_mean"),
            "aa_length_std": stat(bucket, "aa_length_std"),
        }));
    }
    rows.sort_by(|a, b| a["family_id"].as_str().cmp(&b["family_id"].as_str()));
    Ok(Value::Array(rows))
}

fn stat(bucket: &Value, name: &str) -> Value {
    bucket.get(name).cloned().unwrap_or(Value::Null)
}

/// Fixed-width heat string: two lowercase hex digits per selected genome,
/// in `genomeIds` order, counting the family's members in that genome.
fn genome_heat(genome_ids: &[String], bucket: &Value) -> String {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    if let Some(genome_buckets) = bucket["genomes"]["buckets"].as_array() {
        for genome in genome_buckets {
            if let (Some(id), Some(count)) = (genome["val"].as_str(), genome["count"].as_u64()) {
                counts.insert(id, count);
            }
        }
    }
    genome_ids
        .iter()
        .map(|id| {
            let count = counts.get(id.as_str()).copied().unwrap_or(0).min(HEAT_MAX);
            format!("{count:02x}")
        })
        .collect()
}

async fn family_buckets(
    backend: &dyn SearchBackend,
    query: &FamilyQuery,
    field: &str,
) -> Result<Vec<Value>> {
    let genomes = query
        .genome_ids
        .iter()
        .map(|id| escape_value(id))
        .collect::<Vec<_>>()
        .join(" OR ");
    let facet = json!({
        "families": {
            "type": "terms",
            "field": field,
            "limit": -1,
            "facet": {
                "genome_count": "unique(genome_id)",
                "aa_length_min": "min(aa_length)",
                "aa_length_max": "max(aa_length)",
                "aa_length_mean": "avg(aa_length)",
                "aa_length_std": "stddev(aa_length)",
                "genomes": { "type": "terms", "field": "genome_id", "limit": -1 }
            }
        }
    });
    let solr = SolrQuery::matching(format!("genome_id:({genomes})"))
        .fq("annotation:PATRIC".to_string())
        .fq("feature_type:CDS".to_string())
        .fq(format!("{field}:[* TO *]"))
        .rows(0)
        .param("json.facet", facet.to_string());
    let response = backend.query(Collection::GenomeFeature, &solr).await?;
    Ok(response
        .facets
        .as_ref()
        .and_then(|facets| facets["families"]["buckets"].as_array())
        .cloned()
        .unwrap_or_default())
}

async fn family_descriptions(
    backend: &dyn SearchBackend,
    family_ids: &[String],
) -> Result<HashMap<String, String>> {
    let mut descriptions = HashMap::with_capacity(family_ids.len());
    for chunk in family_ids.chunks(DESCRIPTION_CHUNK) {
        let ids = chunk
            .iter()
            .map(|id| escape_value(id))
            .collect::<Vec<_>>()
            .join(" OR ");
        let solr = SolrQuery::matching(format!("family_id:({ids})"))
            .fl("family_id,family_product")
            .rows(chunk.len());
        let response = backend.query(Collection::ProteinFamilyRef, &solr).await?;
        for doc in response.docs() {
            if let (Some(id), Some(product)) = (
                doc.get("family_id").and_then(Value::as_str),
                doc.get("family_product").and_then(Value::as_str),
            ) {
                descriptions.insert(id.to_string(), product.to_string());
            }
        }
    }
    Ok(descriptions)
}
