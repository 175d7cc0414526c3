//! Integration tests for the collection endpoints.
//!
//! The search backend is mocked; tests assert response shaping and the
//! queries the handlers dispatch.

mod common;

use axum::http::{header, HeaderValue, StatusCode};
use common::{create_test_server, MockBackend};
use genogate::solr::SortDirection;
use genogate::types::Collection;
use serde_json::{json, Value};

const TOKEN: &str = "un=someone@patricbrc.org|tokenid=b8745c54|expiry=9999999999|\
                     client_id=someone@patricbrc.org|sig=73cd6d28";

fn genome_doc() -> Value {
    json!({
        "genome_id": "83332.12",
        "genome_name": "Mycobacterium tuberculosis H37Rv",
        "taxon_id": 83332,
        "genome_length": 4411532,
        "patric_cds": 4008,
        "public": true
    })
}

fn feature_docs() -> Value {
    json!([
        {
            "feature_id": "PATRIC.83332.12.NC_000962.CDS.34.1524.fwd",
            "patric_id": "fig|83332.12.peg.1",
            "annotation": "PATRIC",
            "product": "chromosomal replication initiator protein DnaA",
            "genome_name": "Mycobacterium tuberculosis H37Rv",
            "genome_id": "83332.12",
            "na_sequence": "ATGACAGATT",
            "aa_sequence": "MTDQ"
        },
        {
            "feature_id": "PATRIC.83332.12.NC_000962.CDS.2052.3260.fwd",
            "patric_id": "fig|83332.12.peg.2",
            "annotation": "PATRIC",
            "product": "DNA polymerase III subunit beta",
            "genome_name": "Mycobacterium tuberculosis H37Rv",
            "genome_id": "83332.12",
            "na_sequence": "GTGGCTGCA",
            "aa_sequence": "MAA"
        }
    ])
}

#[tokio::test]
async fn test_service_info() {
    let (server, _backend, _trees) = create_test_server(MockBackend::new());

    let response = server.get("/").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["id"], "org.bv-brc.genogate");
    assert_eq!(body["name"], "genogate");

    let collections = body["collections"].as_array().unwrap();
    assert!(collections.contains(&json!("genome")));
    assert!(collections.contains(&json!("protein_family_ref")));

    let media = body["mediaTypes"].as_array().unwrap();
    assert!(media.contains(&json!("application/dna+fasta")));
    assert!(media.contains(&json!("application/newick+json")));
}

#[tokio::test]
async fn test_get_document_by_id() {
    let backend = MockBackend::new().respond_docs(Collection::Genome, json!([genome_doc()]));
    let (server, backend, _trees) = create_test_server(backend);

    let response = server.get("/genome/83332.12").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["genome_name"], "Mycobacterium tuberculosis H37Rv");

    // Private collections are fetched through a filtered query, not a raw
    // primary-key lookup.
    let queries = backend.queries.lock().unwrap();
    assert_eq!(queries.len(), 1);
    let (collection, query) = &queries[0];
    assert_eq!(*collection, Collection::Genome);
    assert_eq!(query.q, "genome_id:83332.12");
    assert_eq!(query.rows, Some(1));
    assert_eq!(query.filters, vec!["public:true".to_string()]);
}

#[tokio::test]
async fn test_get_document_not_found() {
    let (server, _backend, _trees) = create_test_server(MockBackend::new());

    let response = server.get("/genome/999.999").await;
    response.assert_status_not_found();

    let body: Value = response.json();
    assert_eq!(body["error"], "NotFound");
}

#[tokio::test]
async fn test_unknown_collection() {
    let (server, _backend, _trees) = create_test_server(MockBackend::new());

    server.get("/users/1").await.assert_status_not_found();
    server.get("/users/").await.assert_status_not_found();
}

#[tokio::test]
async fn test_collection_query_with_rql() {
    let backend = MockBackend::new().respond_docs(Collection::GenomeFeature, feature_docs());
    let (server, backend, _trees) = create_test_server(backend);

    let response = server
        .get("/genome_feature/?eq(genome_id,83332.12)&select(patric_id,product)&limit(2)")
        .await;
    response.assert_status_ok();

    let range = response.headers().get("content-range").unwrap();
    assert_eq!(range, "items 0-1/2");

    let body: Value = response.json();
    let docs = body.as_array().unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0]["patric_id"], "fig|83332.12.peg.1");

    let queries = backend.queries.lock().unwrap();
    let (collection, query) = &queries[0];
    assert_eq!(*collection, Collection::GenomeFeature);
    assert_eq!(query.q, "genome_id:83332.12");
    assert_eq!(query.fields.as_deref(), Some("patric_id,product"));
    assert_eq!(query.rows, Some(2));
    assert_eq!(query.filters, vec!["public:true".to_string()]);
}

#[tokio::test]
async fn test_collection_query_default_rows() {
    let backend = MockBackend::new().respond_docs(Collection::Genome, json!([genome_doc()]));
    let (server, backend, _trees) = create_test_server(backend);

    let response = server.get("/genome/").await;
    response.assert_status_ok();

    let range = response.headers().get("content-range").unwrap();
    assert_eq!(range, "items 0-0/1");

    let queries = backend.queries.lock().unwrap();
    assert_eq!(queries[0].1.rows, Some(25));
}

#[tokio::test]
async fn test_post_form_rql() {
    let backend = MockBackend::new().respond_docs(Collection::GenomeFeature, feature_docs());
    let (server, backend, _trees) = create_test_server(backend);

    // Form-encoded once.
    let response = server
        .post("/genome_feature/")
        .text("rql=eq%28genome_id%2C83332.12%29")
        .content_type("application/x-www-form-urlencoded")
        .await;
    response.assert_status_ok();

    // encodeURIComponent on top of the form encoding, as the web clients send.
    let response = server
        .post("/genome_feature/")
        .text("rql=eq%2528genome_id%252C83332.12%2529")
        .content_type("application/x-www-form-urlencoded")
        .await;
    response.assert_status_ok();

    let queries = backend.queries.lock().unwrap();
    assert_eq!(queries[0].1.q, "genome_id:83332.12");
    assert_eq!(queries[1].1.q, "genome_id:83332.12");
}

#[tokio::test]
async fn test_post_form_without_rql_field() {
    let (server, _backend, _trees) = create_test_server(MockBackend::new());

    let response = server
        .post("/genome_feature/")
        .text("other=1")
        .content_type("application/x-www-form-urlencoded")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_post_rql_body() {
    let backend = MockBackend::new().respond_docs(Collection::GenomeFeature, feature_docs());
    let (server, backend, _trees) = create_test_server(backend);

    let response = server
        .post("/genome_feature/")
        .text("eq(genome_id,83332.12)&limit(5)")
        .content_type("application/rqlquery+x-www-form-urlencoded")
        .await;
    response.assert_status_ok();

    let queries = backend.queries.lock().unwrap();
    assert_eq!(queries[0].1.q, "genome_id:83332.12");
    assert_eq!(queries[0].1.rows, Some(5));
}

#[tokio::test]
async fn test_post_solr_params_body() {
    let backend = MockBackend::new().respond_docs(Collection::Genome, json!([genome_doc()]));
    let (server, backend, _trees) = create_test_server(backend);

    let response = server
        .post("/genome/")
        .text("q=genome_id:83332.12&fl=genome_id,genome_name&sort=genome_name+desc&rows=10")
        .content_type("application/solrquery+x-www-form-urlencoded")
        .await;
    response.assert_status_ok();

    let queries = backend.queries.lock().unwrap();
    let query = &queries[0].1;
    assert_eq!(query.q, "genome_id:83332.12");
    assert_eq!(query.fields.as_deref(), Some("genome_id,genome_name"));
    assert_eq!(query.rows, Some(10));
    assert_eq!(query.sort[0].field, "genome_name");
    assert_eq!(query.sort[0].direction, SortDirection::Desc);
}

#[tokio::test]
async fn test_post_unknown_content_type() {
    let (server, _backend, _trees) = create_test_server(MockBackend::new());

    let response = server
        .post("/genome_feature/")
        .text("eq(genome_id,83332.12)")
        .content_type("text/csv")
        .await;
    response.assert_status(StatusCode::NOT_ACCEPTABLE);
}

#[tokio::test]
async fn test_dna_fasta_rendering() {
    let backend = MockBackend::new().respond_docs(Collection::GenomeFeature, feature_docs());
    let (server, _backend, _trees) = create_test_server(backend);

    let response = server
        .get("/genome_feature/?eq(genome_id,83332.12)")
        .add_header(header::ACCEPT, HeaderValue::from_static("application/dna+fasta"))
        .await;
    response.assert_status_ok();

    let content_type = response.headers().get("content-type").unwrap();
    assert_eq!(content_type, "application/dna+fasta");

    let text = response.text();
    assert!(text.starts_with(">fig|83332.12.peg.1"));
    assert!(text.contains("\nATGACAGATT\n"));
    assert!(text.contains(">fig|83332.12.peg.2"));
}

#[tokio::test]
async fn test_fasta_rejected_for_unsupported_collections() {
    let backend = MockBackend::new().respond_docs(Collection::Genome, json!([genome_doc()]));
    let (server, _backend, _trees) = create_test_server(backend);

    let response = server
        .get("/genome/")
        .add_header(header::ACCEPT, HeaderValue::from_static("application/dna+fasta"))
        .await;
    response.assert_status(StatusCode::NOT_ACCEPTABLE);

    // Contigs have no protein translation.
    let response = server
        .get("/genome_sequence/")
        .add_header(
            header::ACCEPT,
            HeaderValue::from_static("application/protein+fasta"),
        )
        .await;
    response.assert_status(StatusCode::NOT_ACCEPTABLE);
}

#[tokio::test]
async fn test_solr_json_passthrough() {
    let backend = MockBackend::new().respond(
        Collection::Genome,
        json!({
            "responseHeader": {"status": 0, "QTime": 3},
            "response": {"numFound": 1, "start": 0, "docs": [genome_doc()]}
        }),
    );
    let (server, _backend, _trees) = create_test_server(backend);

    let response = server
        .get("/genome/?eq(genome_id,83332.12)")
        .add_header(header::ACCEPT, HeaderValue::from_static("application/solr+json"))
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/solr+json"
    );

    let body: Value = serde_json::from_str(&response.text()).unwrap();
    assert_eq!(body["responseHeader"]["status"], 0);
    assert_eq!(body["response"]["docs"][0]["genome_id"], "83332.12");

    // Single-document lookups pass the raw body through as well.
    let response = server
        .get("/genome/83332.12")
        .add_header(header::ACCEPT, HeaderValue::from_static("application/solr+json"))
        .await;
    response.assert_status_ok();
    let body: Value = serde_json::from_str(&response.text()).unwrap();
    assert_eq!(body["responseHeader"]["QTime"], 3);
}

#[tokio::test]
async fn test_json_download_streams_one_array() {
    let backend = MockBackend::new().respond_docs(Collection::GenomeFeature, feature_docs());
    let (server, backend, _trees) = create_test_server(backend);

    let response = server
        .get("/genome_feature/?eq(genome_id,83332.12)&http_download=true")
        .await;
    response.assert_status_ok();

    let disposition = response.headers().get("content-disposition").unwrap();
    assert_eq!(
        disposition,
        "attachment; filename=\"PATRIC_genome_feature.json\""
    );

    let body: Value = response.json();
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[1]["patric_id"], "fig|83332.12.peg.2");

    // The override parameter is stripped before the query is parsed as RQL.
    let queries = backend.queries.lock().unwrap();
    assert_eq!(queries[0].1.q, "genome_id:83332.12");
}

#[tokio::test]
async fn test_fasta_download() {
    let backend = MockBackend::new().respond_docs(Collection::GenomeFeature, feature_docs());
    let (server, _backend, _trees) = create_test_server(backend);

    let response = server
        .get(
            "/genome_feature/?eq(genome_id,83332.12)\
             &http_download=true&http_accept=application/dna%2Bfasta",
        )
        .await;
    response.assert_status_ok();

    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/dna+fasta"
    );
    assert_eq!(
        response.headers().get("content-disposition").unwrap(),
        "attachment; filename=\"PATRIC_genome_feature.fasta\""
    );

    let text = response.text();
    assert!(text.starts_with(">fig|83332.12.peg.1"));
    assert!(text.ends_with("GTGGCTGCA\n"));
}

#[tokio::test]
async fn test_range_header_pagination() {
    let backend = MockBackend::new().respond(
        Collection::Genome,
        json!({
            "response": {
                "numFound": 66,
                "start": 3,
                "docs": [
                    {"genome_id": "1.4"},
                    {"genome_id": "1.5"},
                    {"genome_id": "1.6"},
                    {"genome_id": "1.7"},
                    {"genome_id": "1.8"}
                ]
            }
        }),
    );
    let (server, backend, _trees) = create_test_server(backend);

    let response = server
        .get("/genome/")
        .add_header(header::RANGE, HeaderValue::from_static("items=3-7"))
        .await;
    response.assert_status_ok();

    let range = response.headers().get("content-range").unwrap();
    assert_eq!(range, "items 3-7/66");

    let queries = backend.queries.lock().unwrap();
    assert_eq!(queries[0].1.start, Some(3));
    assert_eq!(queries[0].1.rows, Some(5));
}

#[tokio::test]
async fn test_newick_tree_served() {
    let backend = MockBackend::new().respond_docs(
        Collection::Taxonomy,
        json!([{
            "taxon_id": 1763,
            "taxon_name": "Mycobacterium",
            "lineage_ids": [131567, 2, 201174, 1760, 1763]
        }]),
    );
    let (server, _backend, trees) = create_test_server(backend);
    std::fs::write(trees.path().join("1763.json"), "(A:0.1,B:0.2);").unwrap();

    let response = server
        .get("/taxonomy/1763")
        .add_header(header::ACCEPT, HeaderValue::from_static("application/newick+json"))
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/newick+json"
    );
    assert_eq!(response.text(), "(A:0.1,B:0.2);");
}

#[tokio::test]
async fn test_newick_tree_from_ancestor() {
    let backend = MockBackend::new().respond_docs(
        Collection::Taxonomy,
        json!([{
            "taxon_id": 1763,
            "lineage_ids": [131567, 2, 201174, 1760, 1763]
        }]),
    );
    let (server, _backend, trees) = create_test_server(backend);
    // No tree for the genus itself, only for its parent family.
    std::fs::write(trees.path().join("1760.json"), "(M:1);").unwrap();

    let response = server
        .get("/taxonomy/1763")
        .add_header(header::ACCEPT, HeaderValue::from_static("application/newick+json"))
        .await;
    response.assert_status_ok();
    assert_eq!(response.text(), "(M:1);");
}

#[tokio::test]
async fn test_newick_tree_missing() {
    let backend = MockBackend::new().respond_docs(
        Collection::Taxonomy,
        json!([{"taxon_id": 1763, "lineage_ids": [131567, 1763]}]),
    );
    let (server, _backend, _trees) = create_test_server(backend);

    let response = server
        .get("/taxonomy/1763")
        .add_header(header::ACCEPT, HeaderValue::from_static("application/newick+json"))
        .await;
    response.assert_status_not_found();
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );
    assert_eq!(response.text(), "{}");
}

#[tokio::test]
async fn test_newick_only_for_taxonomy() {
    let backend = MockBackend::new().respond_docs(Collection::Genome, json!([genome_doc()]));
    let (server, _backend, _trees) = create_test_server(backend);

    let response = server
        .get("/genome/83332.12")
        .add_header(header::ACCEPT, HeaderValue::from_static("application/newick+json"))
        .await;
    response.assert_status(StatusCode::NOT_ACCEPTABLE);
}

#[tokio::test]
async fn test_invalid_token_rejected() {
    let (server, _backend, _trees) = create_test_server(MockBackend::new());

    let response = server
        .get("/genome/83332.12")
        .add_header(header::AUTHORIZATION, HeaderValue::from_static("Bearer garbage"))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let body: Value = response.json();
    assert_eq!(body["error"], "InvalidAuthentication");
}

#[tokio::test]
async fn test_visibility_filter_widens_with_token() {
    let backend = MockBackend::new().respond_docs(Collection::Genome, json!([genome_doc()]));
    let (server, backend, _trees) = create_test_server(backend);

    server.get("/genome/83332.12").await.assert_status_ok();

    let response = server
        .get("/genome/83332.12")
        .add_header(header::AUTHORIZATION, HeaderValue::from_str(TOKEN).unwrap())
        .await;
    response.assert_status_ok();

    let queries = backend.queries.lock().unwrap();
    assert_eq!(queries[0].1.filters, vec!["public:true".to_string()]);
    assert_eq!(
        queries[1].1.filters,
        vec![
            "public:true OR owner:someone@patricbrc.org OR user_read:someone@patricbrc.org"
                .to_string()
        ]
    );
}

#[tokio::test]
async fn test_http_authorization_override() {
    let backend = MockBackend::new().respond_docs(Collection::Genome, json!([genome_doc()]));
    let (server, backend, _trees) = create_test_server(backend);

    // Tokens can ride in the query string for href downloads.
    let response = server
        .get(
            "/genome/83332.12?http_authorization=un%3Dsomeone%40patricbrc.org\
             %7Ctokenid%3Db8745c54%7Cexpiry%3D9999999999%7Csig%3D73cd6d28",
        )
        .await;
    response.assert_status_ok();

    let queries = backend.queries.lock().unwrap();
    assert!(queries[0].1.filters[0].contains("owner:someone@patricbrc.org"));
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let backend = MockBackend::new().respond_docs(Collection::Genome, json!([genome_doc()]));
    let (server, _backend, _trees) = create_test_server(backend);

    server.get("/genome/").await.assert_status_ok();

    let response = server.get("/metrics").await;
    response.assert_status_ok();
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "text/plain; version=0.0.4"
    );

    let text = response.text();
    assert!(text.contains("genogate_requests_total{collection=\"genome\",method=\"query\"}"));
    assert!(text.contains("genogate_tree_misses_total"));
}
