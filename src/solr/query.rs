#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

/// A backend query in parameter form.
///
/// Handlers build these directly; the RQL translator produces them from
/// client filter expressions. `extra` carries stats and facet parameters
/// that have no dedicated field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolrQuery {
    pub q: String,
    pub filters: Vec<String>,
    pub fields: Option<String>,
    pub sort: Vec<SortSpec>,
    pub start: Option<usize>,
    pub rows: Option<usize>,
    pub cursor: Option<String>,
    pub extra: Vec<(String, String)>,
}

impl SolrQuery {
    pub fn matching(q: impl Into<String>) -> Self {
        SolrQuery {
            q: q.into(),
            ..Default::default()
        }
    }

    pub fn fq(mut self, filter: impl Into<String>) -> Self {
        self.filters.push(filter.into());
        self
    }

    pub fn fl(mut self, fields: impl Into<String>) -> Self {
        self.fields = Some(fields.into());
        self
    }

    pub fn sort_asc(mut self, field: impl Into<String>) -> Self {
        self.sort.push(SortSpec {
            field: field.into(),
            direction: SortDirection::Asc,
        });
        self
    }

    pub fn sort_desc(mut self, field: impl Into<String>) -> Self {
        self.sort.push(SortSpec {
            field: field.into(),
            direction: SortDirection::Desc,
        });
        self
    }

    pub fn start(mut self, start: usize) -> Self {
        self.start = Some(start);
        self
    }

    pub fn rows(mut self, rows: usize) -> Self {
        self.rows = Some(rows);
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((key.into(), value.into()));
        self
    }

    /// Empty queries match everything.
    pub fn effective_q(&self) -> &str {
        if self.q.is_empty() { "*:*" } else { &self.q }
    }

    pub fn sort_param(&self) -> Option<String> {
        if self.sort.is_empty() {
            return None;
        }
        let parts: Vec<String> = self
            .sort
            .iter()
            .map(|s| {
                let dir = match s.direction {
                    SortDirection::Asc => "asc",
                    SortDirection::Desc => "desc",
                };
                format!("{} {}", s.field, dir)
            })
            .collect();
        Some(parts.join(","))
    }

    /// Render as form parameters for the backend's select handler.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("q".to_string(), self.effective_q().to_string())];
        for filter in &self.filters {
            params.push(("fq".to_string(), filter.clone()));
        }
        if let Some(fields) = &self.fields {
            params.push(("fl".to_string(), fields.clone()));
        }
        if let Some(sort) = self.sort_param() {
            params.push(("sort".to_string(), sort));
        }
        if let Some(start) = self.start {
            params.push(("start".to_string(), start.to_string()));
        }
        if let Some(rows) = self.rows {
            params.push(("rows".to_string(), rows.to_string()));
        }
        if let Some(cursor) = &self.cursor {
            params.push(("cursorMark".to_string(), cursor.clone()));
        }
        params.extend(self.extra.iter().cloned());
        params
    }
}
