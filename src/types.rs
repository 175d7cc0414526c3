use serde::{Deserialize, Serialize};

/// A schemaless backend document.
pub type Doc = serde_json::Map<String, serde_json::Value>;

/// Search collections served by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Genome,
    GenomeFeature,
    GenomeSequence,
    Taxonomy,
    ProteinFamilyRef,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Genome,
        Collection::GenomeFeature,
        Collection::GenomeSequence,
        Collection::Taxonomy,
        Collection::ProteinFamilyRef,
    ];

    /// Resolve a URL path segment; unknown names are rejected upstream as 404.
    pub fn from_path(segment: &str) -> Option<Collection> {
        match segment {
            "genome" => Some(Collection::Genome),
            "genome_feature" => Some(Collection::GenomeFeature),
            "genome_sequence" => Some(Collection::GenomeSequence),
            "taxonomy" => Some(Collection::Taxonomy),
            "protein_family_ref" => Some(Collection::ProteinFamilyRef),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Genome => "genome",
            Collection::GenomeFeature => "genome_feature",
            Collection::GenomeSequence => "genome_sequence",
            Collection::Taxonomy => "taxonomy",
            Collection::ProteinFamilyRef => "protein_family_ref",
        }
    }

    /// Unique key field used for `get` dispatch and cursor sorting.
    pub fn primary_key(&self) -> &'static str {
        match self {
            Collection::Genome => "genome_id",
            Collection::GenomeFeature => "feature_id",
            Collection::GenomeSequence => "sequence_id",
            Collection::Taxonomy => "taxon_id",
            Collection::ProteinFamilyRef => "family_id",
        }
    }

    /// Collections holding user-owned documents get a visibility filter.
    pub fn has_private_docs(&self) -> bool {
        matches!(
            self,
            Collection::Genome | Collection::GenomeFeature | Collection::GenomeSequence
        )
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a request is dispatched to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallMethod {
    /// Single result page.
    Query,
    /// Primary-key lookup.
    Get,
    /// Cursor-paged full result, for downloads.
    Stream,
}

impl CallMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallMethod::Query => "query",
            CallMethod::Get => "get",
            CallMethod::Stream => "stream",
        }
    }
}

/// Authenticated caller identity, parsed from the bearer token.
///
/// Requests without a token run as anonymous (`None` in the request
/// extensions) and only see public documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    pub user_id: String,
}

/// Service descriptor returned on `GET /`.
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub version: String,
    pub collections: Vec<&'static str>,
    #[serde(rename = "mediaTypes")]
    pub media_types: Vec<&'static str>,
}
