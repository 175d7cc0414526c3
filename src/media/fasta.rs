//! FASTA rendering for feature and sequence documents.
//!
//! Feature headers follow the annotation source:
//! `>{patric_id}   {product}   [{genome_name} | {genome_id}]` for PATRIC,
//! `>gi|{gi}|ref|{locus}|   ...` for RefSeq. Contig records are headed
//! `>accn|{accession}`. Sequences wrap at 60 columns.

use crate::solr::DocStream;
use crate::types::{Collection, Doc};
use crate::Error;
use axum::body::Body;
use bytes::Bytes;
use serde_json::Value;
use tokio_stream::{wrappers::ReceiverStream, StreamExt};

const LINE_WIDTH: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FastaKind {
    Dna,
    Protein,
}

/// Contigs have no protein translation; only features render both kinds.
pub fn supports_fasta(collection: Collection, kind: FastaKind) -> bool {
    match collection {
        Collection::GenomeFeature => true,
        Collection::GenomeSequence => kind == FastaKind::Dna,
        _ => false,
    }
}

/// Render one document as a FASTA record. Documents without the sequence
/// field are skipped.
pub fn record(collection: Collection, kind: FastaKind, doc: &Doc) -> Option<String> {
    let sequence_field = match (collection, kind) {
        (Collection::GenomeSequence, _) => "sequence",
        (_, FastaKind::Dna) => "na_sequence",
        (_, FastaKind::Protein) => "aa_sequence",
    };
    let sequence = doc.get(sequence_field).and_then(Value::as_str)?;
    if sequence.trim().is_empty() {
        return None;
    }

    let header = match collection {
        Collection::GenomeSequence => format!(
            ">accn|{}   {}   [{} | {}]",
            text(doc, "accession"),
            text(doc, "description"),
            text(doc, "genome_name"),
            text(doc, "genome_id"),
        ),
        _ => format!(
            ">{}   {}   [{} | {}]",
            feature_id_tag(doc),
            text(doc, "product"),
            text(doc, "genome_name"),
            text(doc, "genome_id"),
        ),
    };

    Some(format!("{}\n{}\n", header, wrap_sequence(sequence.trim())))
}

/// Render a whole result page.
pub fn render(collection: Collection, kind: FastaKind, docs: &[Doc]) -> String {
    let mut out = String::new();
    for doc in docs {
        if let Some(rec) = record(collection, kind, doc) {
            out.push_str(&rec);
        }
    }
    out
}

/// Body for streamed downloads: documents are rendered as they arrive.
pub fn stream_body(collection: Collection, kind: FastaKind, mut docs: DocStream) -> Body {
    let (tx, rx) = tokio::sync::mpsc::channel::<std::result::Result<Bytes, Error>>(64);

    tokio::spawn(async move {
        while let Some(next) = docs.next().await {
            let sent = match next {
                Ok(doc) => match record(collection, kind, &doc) {
                    Some(rec) => tx.send(Ok(Bytes::from(rec))).await,
                    None => continue,
                },
                Err(e) => {
                    let _ = tx.send(Err(e)).await;
                    return;
                }
            };
            if sent.is_err() {
                // Client went away.
                return;
            }
        }
    });

    Body::from_stream(ReceiverStream::new(rx))
}

fn feature_id_tag(doc: &Doc) -> String {
    if text(doc, "annotation") == "RefSeq" {
        return format!(
            "gi|{}|ref|{}|",
            text(doc, "gi"),
            text(doc, "refseq_locus_tag")
        );
    }
    let patric_id = text(doc, "patric_id");
    if patric_id.is_empty() {
        text(doc, "feature_id")
    } else {
        patric_id
    }
}

fn text(doc: &Doc, field: &str) -> String {
    match doc.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn wrap_sequence(sequence: &str) -> String {
    let mut out = String::with_capacity(sequence.len() + sequence.len() / LINE_WIDTH + 1);
    for (i, chunk) in sequence.as_bytes().chunks(LINE_WIDTH).enumerate() {
        if i > 0 {
            out.push('\n');
        }
        // Sequences are ASCII; chunks stay on char boundaries.
        out.push_str(std::str::from_utf8(chunk).unwrap_or(""));
    }
    out
}

/// Attachment filename sent with downloads.
pub fn attachment_name(collection: Collection) -> String {
    format!("PATRIC_{}.fasta", collection.as_str())
}
