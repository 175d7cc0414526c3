use crate::metrics::METRICS;
use crate::types::{Collection, ServiceInfo};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;

pub async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        id: "org.bv-brc.genogate".to_string(),
        name: "genogate".to_string(),
        description: Some("Data API gateway over the genomic search collections".to_string()),
        version: env!("CARGO_PKG_VERSION").to_string(),
        collections: Collection::ALL.iter().map(|c| c.as_str()).collect(),
        media_types: vec![
            "application/json",
            "application/solr+json",
            "application/dna+fasta",
            "application/protein+fasta",
            "application/newick+json",
        ],
    })
}

pub async fn get_metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        METRICS.render_prometheus(),
    )
}
