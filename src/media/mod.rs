//! Response media types and their serializers.

mod fasta;
mod newick;

pub use fasta::{
    attachment_name, record as fasta_record, render as render_fasta, stream_body, supports_fasta,
    FastaKind,
};
pub use newick::tree_for_taxon;

use crate::solr::DocStream;
use crate::{Error, Result};
use axum::body::Body;
use bytes::Bytes;
use tokio_stream::{wrappers::ReceiverStream, StreamExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Json,
    /// Raw backend response passthrough.
    SolrJson,
    DnaFasta,
    ProteinFasta,
    NewickJson,
}

impl MediaType {
    /// Negotiate from an Accept header. Absent headers and wildcards pick
    /// JSON; a header naming only unsupported types is a 406.
    pub fn from_accept(accept: Option<&str>) -> Result<MediaType> {
        let Some(accept) = accept else {
            return Ok(MediaType::Json);
        };
        for part in accept.split(',') {
            let mime = part.split(';').next().unwrap_or("").trim();
            match mime {
                "" => continue,
                "application/json" | "*/*" | "application/*" => return Ok(MediaType::Json),
                "application/solr+json" => return Ok(MediaType::SolrJson),
                "application/dna+fasta" => return Ok(MediaType::DnaFasta),
                "application/protein+fasta" => return Ok(MediaType::ProteinFasta),
                "application/newick+json" => return Ok(MediaType::NewickJson),
                _ => continue,
            }
        }
        Err(Error::UnsupportedMediaType(accept.to_string()))
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            MediaType::Json => "application/json",
            MediaType::SolrJson => "application/solr+json",
            MediaType::DnaFasta => "application/dna+fasta",
            MediaType::ProteinFasta => "application/protein+fasta",
            MediaType::NewickJson => "application/newick+json",
        }
    }

    pub fn fasta_kind(&self) -> Option<FastaKind> {
        match self {
            MediaType::DnaFasta => Some(FastaKind::Dna),
            MediaType::ProteinFasta => Some(FastaKind::Protein),
            _ => None,
        }
    }
}

/// Body for streamed JSON downloads: one array, documents serialized as
/// they arrive.
pub fn json_stream_body(mut docs: DocStream) -> Body {
    let (tx, rx) = tokio::sync::mpsc::channel::<std::result::Result<Bytes, Error>>(64);

    tokio::spawn(async move {
        if tx.send(Ok(Bytes::from_static(b"["))).await.is_err() {
            return;
        }
        let mut first = true;
        while let Some(next) = docs.next().await {
            let doc = match next {
                Ok(doc) => doc,
                Err(e) => {
                    let _ = tx.send(Err(e)).await;
                    return;
                }
            };
            let mut chunk = if first { String::new() } else { ",".to_string() };
            first = false;
            match serde_json::to_string(&doc) {
                Ok(rendered) => chunk.push_str(&rendered),
                Err(e) => {
                    let _ = tx.send(Err(Error::Internal(e.to_string()))).await;
                    return;
                }
            }
            if tx.send(Ok(Bytes::from(chunk))).await.is_err() {
                // Client went away.
                return;
            }
        }
        let _ = tx.send(Ok(Bytes::from_static(b"]"))).await;
    });

    Body::from_stream(ReceiverStream::new(rx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Doc;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_json_stream_body_is_one_array() {
        let docs: Vec<crate::Result<Doc>> = vec![
            Ok(json!({"genome_id": "83332.12"}).as_object().unwrap().clone()),
            Ok(json!({"genome_id": "1765.317"}).as_object().unwrap().clone()),
        ];
        let stream: DocStream = Box::pin(tokio_stream::iter(docs));
        let bytes = axum::body::to_bytes(json_stream_body(stream), usize::MAX)
            .await
            .unwrap();
        let parsed: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed[0]["genome_id"], "83332.12");
        assert_eq!(parsed[1]["genome_id"], "1765.317");
    }

    #[tokio::test]
    async fn test_json_stream_body_empty() {
        let stream: DocStream = Box::pin(tokio_stream::iter(Vec::<crate::Result<Doc>>::new()));
        let bytes = axum::body::to_bytes(json_stream_body(stream), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"[]");
    }

    #[test]
    fn test_default_and_wildcard_pick_json() {
        assert_eq!(MediaType::from_accept(None).unwrap(), MediaType::Json);
        assert_eq!(MediaType::from_accept(Some("*/*")).unwrap(), MediaType::Json);
        assert_eq!(
            MediaType::from_accept(Some("text/html, application/*;q=0.8")).unwrap(),
            MediaType::Json
        );
    }

    #[test]
    fn test_specific_types() {
        assert_eq!(
            MediaType::from_accept(Some("application/dna+fasta")).unwrap(),
            MediaType::DnaFasta
        );
        assert_eq!(
            MediaType::from_accept(Some("application/newick+json")).unwrap(),
            MediaType::NewickJson
        );
        assert_eq!(
            MediaType::from_accept(Some("application/solr+json")).unwrap(),
            MediaType::SolrJson
        );
    }

    #[test]
    fn test_first_supported_wins() {
        assert_eq!(
            MediaType::from_accept(Some("application/protein+fasta, application/json")).unwrap(),
            MediaType::ProteinFasta
        );
    }

    #[test]
    fn test_unsupported_is_rejected() {
        assert!(MediaType::from_accept(Some("text/csv")).is_err());
    }
}
