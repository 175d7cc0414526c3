mod collection;
mod jbrowse;
mod rpc;
mod service_info;

pub use collection::{get_collection, get_document, post_collection};
pub use jbrowse::{
    get_features, get_global_stats, get_names, get_refseqs, get_region_densities,
    get_region_stats, get_track_list, get_tracks,
};
pub use rpc::{post_rpc, RPC_CONTENT_TYPE};
pub use service_info::{get_metrics, service_info};

use crate::pipeline::Limits;
use crate::solr::SearchBackend;
use axum::{middleware, routing::get, Router};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn SearchBackend>,
    pub limits: Limits,
    pub api_url: String,
    pub content_url: String,
    pub tree_dir: PathBuf,
}

/// All routes plus the middleware every deployment carries. Rate limiting
/// and CORS are layered on in `main`.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(service_info).post(post_rpc))
        .route("/metrics", get(get_metrics))
        .route("/jbrowse/genome/{genome_id}/trackList", get(get_track_list))
        .route("/jbrowse/genome/{genome_id}/tracks", get(get_tracks))
        .route("/jbrowse/genome/{genome_id}/names", get(get_names))
        .route("/jbrowse/genome/{genome_id}/names/", get(get_names))
        .route("/jbrowse/genome/{genome_id}/refseqs", get(get_refseqs))
        .route(
            "/jbrowse/genome/{genome_id}/stats/global",
            get(get_global_stats),
        )
        .route(
            "/jbrowse/genome/{genome_id}/stats/region/{sequence_id}",
            get(get_region_stats),
        )
        .route(
            "/jbrowse/genome/{genome_id}/stats/regionFeatureDensities/{sequence_id}",
            get(get_region_densities),
        )
        .route(
            "/jbrowse/genome/{genome_id}/features/{seq_accession}",
            get(get_features),
        )
        .route("/{collection}", get(get_collection).post(post_collection))
        .route("/{collection}/", get(get_collection).post(post_collection))
        .route("/{collection}/{id}", get(get_document))
        .layer(middleware::from_fn(crate::auth::auth_middleware))
        .layer(middleware::from_fn(crate::http_params::http_params))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
