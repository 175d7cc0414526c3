//! Genome-browser resource handlers.
//!
//! JBrowse REST stores point at `/jbrowse/genome/{genome_id}` and fetch
//! reference sequences, region statistics, and features shaped to the
//! flat-feature format the browser renders directly.

use super::AppState;
use crate::auth::OptionalUser;
use crate::pipeline;
use crate::solr::SolrQuery;
use crate::tracks;
use crate::types::{Collection, Doc};
use crate::{rql, Error, Result};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

/// Fields JBrowse feature popups and glyphs read.
const FEATURE_FIELDS: &str = "patric_id,refseq_locus_tag,gene,product,annotation,feature_type,\
     protein_id,gene_id,genome_name,accession,strand,na_length,aa_length,genome_id,start,end,\
     feature_id,segments,classifier_score,classifier_round";

#[derive(Debug, Deserialize)]
pub struct RegionParams {
    start: Option<i64>,
    end: Option<i64>,
    annotation: Option<String>,
    reference_sequences_only: Option<String>,
    #[serde(rename = "basesPerBin")]
    bases_per_bin: Option<u64>,
}

impl RegionParams {
    fn span(&self) -> Result<(i64, i64)> {
        let start = self
            .start
            .ok_or_else(|| Error::InvalidQuery("start parameter is required".to_string()))?;
        let end = self
            .end
            .ok_or_else(|| Error::InvalidQuery("end parameter is required".to_string()))?;
        if end < start {
            return Err(Error::InvalidQuery("end precedes start".to_string()));
        }
        Ok((start, end))
    }

    fn annotation(&self) -> &str {
        self.annotation.as_deref().unwrap_or("PATRIC")
    }

    fn reference_only(&self) -> bool {
        self.reference_sequences_only
            .as_deref()
            .is_some_and(|v| !v.is_empty())
    }
}

pub async fn get_track_list(
    State(state): State<AppState>,
    Path(genome_id): Path<String>,
) -> Json<Value> {
    let api_root = format!("{}/jbrowse", state.api_url.trim_end_matches('/'));
    Json(tracks::track_list(&genome_id, &api_root, &state.content_url))
}

/// Track metadata stub; everything lives in the track list.
pub async fn get_tracks() -> Json<Value> {
    Json(json!([]))
}

/// Name-store stub; autocomplete is not served from here.
pub async fn get_names() -> Json<Value> {
    Json(json!([]))
}

pub async fn get_refseqs(
    State(state): State<AppState>,
    Path(genome_id): Path<String>,
    OptionalUser(user): OptionalUser,
) -> Result<Json<Value>> {
    let query = rql::compile(&format!(
        "eq(genome_id,{genome_id})&select(accession,length,sequence_id)&sort(+accession)&limit(1000)"
    ))?;
    let response = pipeline::run_query(
        state.backend.as_ref(),
        &state.limits,
        Collection::GenomeSequence,
        query,
        user.as_ref(),
    )
    .await?;

    let refseqs: Vec<Value> = response
        .docs()
        .iter()
        .map(|doc| {
            let length = doc.get("length").cloned().unwrap_or(Value::Null);
            json!({
                "length": length,
                "name": doc.get("accession").cloned().unwrap_or(Value::Null),
                "accn": doc.get("accession").cloned().unwrap_or(Value::Null),
                "sid": genome_id,
                "start": 0,
                "end": length,
                "seqDir": "",
                "seqChunkSize": length,
            })
        })
        .collect();
    Ok(Json(Value::Array(refseqs)))
}

pub async fn get_global_stats(
    State(state): State<AppState>,
    Path(genome_id): Path<String>,
    OptionalUser(user): OptionalUser,
) -> Result<Json<Value>> {
    let query = rql::compile(&format!("eq(genome_id,{genome_id})"))?;
    let response = pipeline::run_query(
        state.backend.as_ref(),
        &state.limits,
        Collection::Genome,
        query,
        user.as_ref(),
    )
    .await?;

    let genome = response
        .first_doc()
        .ok_or_else(|| Error::NotFound(format!("genome {}", genome_id)))?;
    let cds = genome.get("patric_cds").and_then(Value::as_f64).unwrap_or(0.0);
    let length = genome
        .get("genome_length")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);

    Ok(Json(json!({
        "featureDensity": cds / length,
        "featureCount": genome.get("patric_cds").cloned().unwrap_or(Value::Null),
    })))
}

pub async fn get_region_stats(
    State(state): State<AppState>,
    Path((_genome_id, sequence_id)): Path<(String, String)>,
    Query(params): Query<RegionParams>,
    OptionalUser(user): OptionalUser,
) -> Result<Json<Value>> {
    let (start, end) = params.span()?;
    let query = SolrQuery::matching(format!(
        "accession:{} AND annotation:{} AND !(feature_type:source) \
         AND (start:[{} TO {}] OR end:[{} TO {}])",
        rql::escape_value(&sequence_id),
        rql::escape_value(params.annotation()),
        start,
        end,
        start,
        end,
    ))
    .rows(0)
    .param("stats", "true")
    .param("stats.field", "na_length");

    let response = pipeline::run_query(
        state.backend.as_ref(),
        &state.limits,
        Collection::GenomeFeature,
        query,
        user.as_ref(),
    )
    .await?;

    let stats = response
        .stats_field("na_length")
        .ok_or_else(|| Error::Upstream("na_length statistics missing from response".to_string()))?;
    let span = (end - start + 1) as f64;

    Ok(Json(json!({
        "featureDensity": stats.sum / span,
        "featureCount": stats.count,
    })))
}

pub async fn get_region_densities(
    State(state): State<AppState>,
    Path((_genome_id, sequence_id)): Path<(String, String)>,
    Query(params): Query<RegionParams>,
    OptionalUser(user): OptionalUser,
) -> Result<Json<Value>> {
    let (start, end) = params.span()?;
    let bases_per_bin = params
        .bases_per_bin
        .filter(|b| *b > 0)
        .ok_or_else(|| Error::InvalidQuery("basesPerBin parameter is required".to_string()))?;

    let query = SolrQuery::matching(format!("accession:{}", rql::escape_value(&sequence_id)))
        .fq(format!(
            "annotation:{} AND !(feature_type:source)",
            rql::escape_value(params.annotation())
        ))
        .rows(0)
        .param("facet", "true")
        .param("facet.mincount", "1")
        .param("facet.range", "start")
        .param("f.start.facet.range.start", start.to_string())
        .param("f.start.facet.range.end", end.to_string())
        .param("f.start.facet.range.gap", bases_per_bin.to_string());

    let response = pipeline::run_query(
        state.backend.as_ref(),
        &state.limits,
        Collection::GenomeFeature,
        query,
        user.as_ref(),
    )
    .await?;

    let bins = response
        .range_facet("start")
        .map(|facet| facet.bucket_counts())
        .unwrap_or_default();
    let max = bins.iter().copied().max().unwrap_or(0);

    Ok(Json(json!({
        "stats": {
            "basesPerBin": bases_per_bin,
            "max": max,
        },
        "bins": bins,
    })))
}

pub async fn get_features(
    State(state): State<AppState>,
    Path((genome_id, seq_accession)): Path<(String, String)>,
    Query(params): Query<RegionParams>,
    OptionalUser(user): OptionalUser,
) -> Result<Json<Value>> {
    let (start, end) = params.span()?;

    if params.reference_only() {
        let query = rql::compile(&format!(
            "and(eq(genome_id,{genome_id}),eq(accession,{seq_accession}))&limit(10000)"
        ))?;
        let response = pipeline::run_query(
            state.backend.as_ref(),
            &state.limits,
            Collection::GenomeSequence,
            query,
            user.as_ref(),
        )
        .await?;
        let features: Vec<Value> = response
            .docs()
            .iter()
            .map(|doc| reference_feature(doc, start, end))
            .collect();
        return Ok(Json(json!({ "features": features })));
    }

    let query = rql::compile(&format!(
        "and(eq(genome_id,{genome_id}),eq(accession,{seq_accession}),\
         eq(annotation,{annotation}),or(between(start,{start},{end}),\
         between(end,{start},{end}),and(lt(start,{start}),gt(end,{end}))),\
         ne(feature_type,source))&select({FEATURE_FIELDS})&limit(10000)&sort(+start)",
        annotation = params.annotation(),
    ))?;
    let response = pipeline::run_query(
        state.backend.as_ref(),
        &state.limits,
        Collection::GenomeFeature,
        query,
        user.as_ref(),
    )
    .await?;

    let features: Vec<Value> = response
        .response
        .docs
        .into_iter()
        .map(feature_record)
        .collect();
    Ok(Json(json!({ "features": features })))
}

/// Shape one feature document for the browser: 0-based start, numeric
/// strand, stable `uniqueID`, and exploded segments for joined CDS regions.
fn feature_record(mut doc: Doc) -> Value {
    if let Some(feature_type) = doc.get("feature_type").cloned() {
        doc.insert("type".to_string(), feature_type);
    }
    if let Some(accession) = doc.get("accession").cloned() {
        doc.insert("name".to_string(), accession);
    }
    if let Some(feature_id) = doc.get("feature_id").cloned() {
        doc.insert("uniqueID".to_string(), feature_id);
    }

    let strand = numeric_strand(&doc);
    doc.insert("strand".to_string(), json!(strand));

    if let Some(start) = doc.get("start").and_then(Value::as_i64) {
        doc.insert("start".to_string(), json!(start - 1));
    }

    let segments: Vec<String> = doc
        .get("segments")
        .and_then(Value::as_array)
        .map(|spans| {
            spans
                .iter()
                .filter_map(|s| s.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    if segments.len() > 1 {
        let feature_id = text(&doc, "feature_id");
        let protein_id = text(&doc, "protein_id");
        let subfeatures: Vec<Value> = segments
            .iter()
            .enumerate()
            .filter_map(|(idx, span)| segment_subfeature(&feature_id, &protein_id, strand, idx, span))
            .collect();
        doc.insert("subfeatures".to_string(), Value::Array(subfeatures));
        doc.insert("type".to_string(), json!("segmented"));
    } else {
        doc.remove("segments");
    }

    doc.insert("aa_sequence".to_string(), json!(" "));
    doc.insert("na_sequence".to_string(), json!(" "));
    Value::Object(doc)
}

/// One `a..b` segment span as a CDS subfeature. Malformed spans are dropped.
fn segment_subfeature(
    feature_id: &str,
    protein_id: &str,
    strand: i64,
    idx: usize,
    span: &str,
) -> Option<Value> {
    let (from, to) = span.split_once("..")?;
    let from: i64 = from.trim().parse().ok()?;
    let to: i64 = to.trim().parse().ok()?;
    Some(json!({
        "uniqueID": format!("{feature_id}_seg{idx}"),
        "start": from - 1,
        "end": to,
        "strand": strand,
        "protein_id": format!("{protein_id}_seg{idx}"),
        "feature_type": "CDS",
        "type": "CDS",
    }))
}

fn numeric_strand(doc: &Doc) -> i64 {
    if doc.get("strand").and_then(Value::as_str) == Some("+") {
        1
    } else {
        -1
    }
}

/// Clamped sequence slice for the reference track. Bounds are inclusive of
/// `end`, pinned to the stored sequence.
fn reference_feature(doc: &Doc, start: i64, end: i64) -> Value {
    let length = doc.get("length").and_then(Value::as_i64).unwrap_or(0);
    let start = start.max(0);
    let end = end.min(length);

    let sequence = doc.get("sequence").and_then(Value::as_str).unwrap_or("");
    let from = (start.max(0) as usize).min(sequence.len());
    let to = ((end + 1).max(0) as usize).min(sequence.len());
    let seq = if from < to { &sequence[from..to] } else { "" };

    json!({
        "length": end - start,
        "name": doc.get("accession").cloned().unwrap_or(Value::Null),
        "accn": doc.get("accession").cloned().unwrap_or(Value::Null),
        "type": "reference",
        "score": doc.get("gc_content").cloned().unwrap_or(Value::Null),
        "sid": doc.get("genome_id").cloned().unwrap_or(Value::Null),
        "start": start,
        "end": end,
        "seq": seq,
        "seqChunkSize": end - start,
    })
}

fn text(doc: &Doc, field: &str) -> String {
    doc.get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
