//! RQL filter expressions and their translation to the backend query syntax.
//!
//! The gateway accepts the operator subset its clients actually send:
//! `eq`, `ne`, `gt`, `lt`, `ge`, `le`, `between`, `in`, `and`, `or`, `not`,
//! `keyword`, `select`, `sort`, `limit`. Structural characters (`&`, `,`,
//! parentheses) must be literal in the RQL text; values carrying them are
//! percent-encoded and each token is decoded once during parsing.

use crate::solr::{SolrQuery, SortDirection, SortSpec};
use crate::{Error, Result};
use percent_encoding::percent_decode_str;

/// One parsed RQL operator call, e.g. `eq(genome_id,83332.12)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub name: String,
    pub args: Vec<Arg>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Value(String),
    List(Vec<String>),
    Call(Call),
}

/// Parse an RQL string into its top-level operator calls.
///
/// Empty input parses to no calls; leading, trailing, and repeated `&`
/// separators are tolerated (upstream clients emit them).
pub fn parse(input: &str) -> Result<Vec<Call>> {
    let mut parser = Parser {
        bytes: input.as_bytes(),
        pos: 0,
    };
    let mut calls = Vec::new();
    parser.skip_separators();
    while !parser.at_end() {
        calls.push(parser.call()?);
        parser.skip_separators();
    }
    Ok(calls)
}

/// Parse RQL and translate it into a backend query.
pub fn compile(input: &str) -> Result<SolrQuery> {
    translate(&parse(input)?)
}

/// Translate parsed calls into a backend query. Filter operators combine
/// into the main query string; `select`/`sort`/`limit` shape the request.
pub fn translate(calls: &[Call]) -> Result<SolrQuery> {
    let mut query = SolrQuery::default();
    let mut clauses = Vec::new();

    for call in calls {
        match call.name.as_str() {
            "select" => {
                let fields: Vec<&str> = call
                    .args
                    .iter()
                    .map(|a| scalar(a, "select"))
                    .collect::<Result<_>>()?;
                query.fields = Some(fields.join(","));
            }
            "sort" => {
                for arg in &call.args {
                    query.sort.push(sort_spec(scalar(arg, "sort")?));
                }
            }
            "limit" => {
                let rows = scalar(call.args.first().ok_or_else(|| bad("limit needs a count"))?, "limit")?;
                query.rows = Some(parse_count(rows)?);
                if let Some(arg) = call.args.get(1) {
                    query.start = Some(parse_count(scalar(arg, "limit")?)?);
                }
            }
            _ => clauses.push(filter_clause(call)?),
        }
    }

    query.q = clauses.join(" AND ");
    Ok(query)
}

fn filter_clause(call: &Call) -> Result<String> {
    match call.name.as_str() {
        "eq" => {
            let (field, value) = field_value(call)?;
            Ok(format!("{}:{}", field, escape_value(value)))
        }
        "ne" => {
            let (field, value) = field_value(call)?;
            Ok(format!("!({}:{})", field, escape_value(value)))
        }
        "gt" => {
            let (field, value) = field_value(call)?;
            Ok(format!("{}:{{{} TO *]", field, escape_value(value)))
        }
        "lt" => {
            let (field, value) = field_value(call)?;
            Ok(format!("{}:[* TO {}}}", field, escape_value(value)))
        }
        "ge" => {
            let (field, value) = field_value(call)?;
            Ok(format!("{}:[{} TO *]", field, escape_value(value)))
        }
        "le" => {
            let (field, value) = field_value(call)?;
            Ok(format!("{}:[* TO {}]", field, escape_value(value)))
        }
        "between" => {
            let field = scalar(call.args.first().ok_or_else(|| bad("between needs a field"))?, "between")?;
            let low = scalar(call.args.get(1).ok_or_else(|| bad("between needs bounds"))?, "between")?;
            let high = scalar(call.args.get(2).ok_or_else(|| bad("between needs bounds"))?, "between")?;
            Ok(format!(
                "{}:[{} TO {}]",
                field,
                escape_value(low),
                escape_value(high)
            ))
        }
        "in" => {
            let field = scalar(call.args.first().ok_or_else(|| bad("in needs a field"))?, "in")?;
            let values = in_values(&call.args[1..])?;
            if values.is_empty() {
                return Err(bad("in needs at least one value"));
            }
            let escaped: Vec<String> = values.iter().map(|v| escape_value(v)).collect();
            Ok(format!("{}:({})", field, escaped.join(" OR ")))
        }
        "and" => Ok(format!("({})", join_boolean(call, " AND ")?)),
        "or" => Ok(format!("({})", join_boolean(call, " OR ")?)),
        "not" => {
            let inner = match call.args.as_slice() {
                [Arg::Call(inner)] => filter_clause(inner)?,
                _ => return Err(bad("not takes one operator argument")),
            };
            Ok(format!("!{}", inner))
        }
        "keyword" => {
            let value = scalar(call.args.first().ok_or_else(|| bad("keyword needs a value"))?, "keyword")?;
            Ok(format!("({})", escape_value(value)))
        }
        other => Err(bad(&format!("unsupported operator: {}", other))),
    }
}

fn join_boolean(call: &Call, op: &str) -> Result<String> {
    let mut parts = Vec::with_capacity(call.args.len());
    for arg in &call.args {
        match arg {
            Arg::Call(inner) => parts.push(filter_clause(inner)?),
            _ => return Err(bad(&format!("{} takes operator arguments", call.name))),
        }
    }
    if parts.is_empty() {
        return Err(bad(&format!("{} needs at least one argument", call.name)));
    }
    Ok(parts.join(op))
}

fn field_value(call: &Call) -> Result<(&str, &str)> {
    match call.args.as_slice() {
        [Arg::Value(field), Arg::Value(value)] => Ok((field, value)),
        _ => Err(bad(&format!("{} takes a field and a value", call.name))),
    }
}

fn scalar<'a>(arg: &'a Arg, operator: &str) -> Result<&'a str> {
    match arg {
        Arg::Value(v) => Ok(v),
        _ => Err(bad(&format!("{} takes plain values", operator))),
    }
}

fn in_values(args: &[Arg]) -> Result<Vec<String>> {
    // Both in(f,(a,b)) and in(f,a,b) appear in the wild.
    match args {
        [Arg::List(values)] => Ok(values.clone()),
        _ => args
            .iter()
            .map(|a| scalar(a, "in").map(str::to_string))
            .collect(),
    }
}

fn sort_spec(raw: &str) -> SortSpec {
    match raw.as_bytes().first() {
        Some(b'-') => SortSpec {
            field: raw[1..].to_string(),
            direction: SortDirection::Desc,
        },
        Some(b'+') => SortSpec {
            field: raw[1..].to_string(),
            direction: SortDirection::Asc,
        },
        _ => SortSpec {
            field: raw.to_string(),
            direction: SortDirection::Asc,
        },
    }
}

fn parse_count(raw: &str) -> Result<usize> {
    raw.parse()
        .map_err(|_| bad(&format!("invalid count: {}", raw)))
}

/// Quote values that would otherwise break the backend query parser.
/// `*` passes through for wildcard and presence checks.
pub fn escape_value(value: &str) -> String {
    let plain = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '*' | '|' | '@'));
    if plain {
        value.to_string()
    } else {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

fn bad(message: &str) -> Error {
    Error::InvalidQuery(message.to_string())
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_separators(&mut self) {
        while self.peek() == Some(b'&') {
            self.pos += 1;
        }
    }

    fn call(&mut self) -> Result<Call> {
        let name = self.ident()?;
        if name.is_empty() {
            return Err(bad("expected operator name"));
        }
        if self.peek() != Some(b'(') {
            return Err(bad(&format!("expected ( after {}", name)));
        }
        self.pos += 1;

        let mut args = Vec::new();
        if self.peek() == Some(b')') {
            self.pos += 1;
            return Ok(Call { name, args });
        }
        loop {
            args.push(self.arg()?);
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b')') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(bad(&format!("unterminated {}", name))),
            }
        }
        Ok(Call { name, args })
    }

    fn arg(&mut self) -> Result<Arg> {
        if self.peek() == Some(b'(') {
            return self.list();
        }

        // An identifier directly followed by ( is a nested call.
        let mark = self.pos;
        let name = self.ident()?;
        if !name.is_empty() && self.peek() == Some(b'(') {
            self.pos = mark;
            return Ok(Arg::Call(self.call()?));
        }
        self.pos = mark;
        Ok(Arg::Value(self.value()?))
    }

    fn list(&mut self) -> Result<Arg> {
        self.pos += 1;
        let mut items = Vec::new();
        if self.peek() == Some(b')') {
            self.pos += 1;
            return Ok(Arg::List(items));
        }
        loop {
            items.push(self.value()?);
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b')') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(bad("unterminated value list")),
            }
        }
        Ok(Arg::List(items))
    }

    fn ident(&mut self) -> Result<String> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        self.token(start)
    }

    fn value(&mut self) -> Result<String> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if matches!(c, b',' | b')' | b'(' | b'&') {
                break;
            }
            self.pos += 1;
        }
        self.token(start)
    }

    fn token(&self, start: usize) -> Result<String> {
        let raw = std::str::from_utf8(&self.bytes[start..self.pos])
            .map_err(|_| bad("query is not valid UTF-8"))?;
        Ok(percent_decode_str(raw)
            .decode_utf8()
            .map_err(|_| bad("query is not valid UTF-8"))?
            .into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_eq() {
        let calls = parse("eq(genome_id,83332.12)").unwrap();
        assert_eq!(
            calls,
            vec![Call {
                name: "eq".to_string(),
                args: vec![
                    Arg::Value("genome_id".to_string()),
                    Arg::Value("83332.12".to_string())
                ],
            }]
        );
    }

    #[test]
    fn test_parse_decodes_tokens() {
        let calls = parse("eq(genome_name,Mycobacterium%20tuberculosis)").unwrap();
        assert_eq!(
            calls[0].args[1],
            Arg::Value("Mycobacterium tuberculosis".to_string())
        );
    }

    #[test]
    fn test_parse_tolerates_stray_separators() {
        let calls = parse("&eq(genome_id,83332.12)&&limit(5)&").unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].name, "limit");
    }

    #[test]
    fn test_parse_in_list() {
        let calls = parse("in(feature_id,(a,b,c))").unwrap();
        assert_eq!(
            calls[0].args[1],
            Arg::List(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
    }

    #[test]
    fn test_parse_rejects_unbalanced() {
        assert!(parse("eq(genome_id,83332.12").is_err());
        assert!(parse("frob").is_err());
    }

    #[test]
    fn test_translate_simple_eq() {
        let query = compile("eq(genome_id,83332.12)").unwrap();
        assert_eq!(query.q, "genome_id:83332.12");
        assert_eq!(query.rows, None);
    }

    #[test]
    fn test_translate_quotes_values_with_spaces() {
        let query = compile("eq(genome_name,Mycobacterium%20tuberculosis)").unwrap();
        assert_eq!(query.q, "genome_name:\"Mycobacterium tuberculosis\"");
    }

    #[test]
    fn test_translate_ne() {
        let query = compile("ne(feature_type,source)").unwrap();
        assert_eq!(query.q, "!(feature_type:source)");
    }

    #[test]
    fn test_translate_in() {
        let query = compile("in(genome_id,(83332.12,208964.12))").unwrap();
        assert_eq!(query.q, "genome_id:(83332.12 OR 208964.12)");
    }

    #[test]
    fn test_translate_select_sort_limit() {
        let query =
            compile("eq(annotation,PATRIC)&select(patric_id,gene)&sort(+start,-end)&limit(100,50)")
                .unwrap();
        assert_eq!(query.q, "annotation:PATRIC");
        assert_eq!(query.fields.as_deref(), Some("patric_id,gene"));
        assert_eq!(query.sort.len(), 2);
        assert_eq!(query.sort[0].field, "start");
        assert_eq!(query.sort[0].direction, SortDirection::Asc);
        assert_eq!(query.sort[1].field, "end");
        assert_eq!(query.sort[1].direction, SortDirection::Desc);
        assert_eq!(query.rows, Some(100));
        assert_eq!(query.start, Some(50));
    }

    #[test]
    fn test_translate_region_overlap_query() {
        // The feature-overlap shape the genome browser sends.
        let rql = "and(eq(genome_id,83332.12),eq(accession,NC_000962),\
                   or(between(start,100,2000),between(end,100,2000),\
                   and(lt(start,100),gt(end,2000))),ne(feature_type,source))";
        let query = compile(rql).unwrap();
        assert_eq!(
            query.q,
            "(genome_id:83332.12 AND accession:NC_000962 AND \
             (start:[100 TO 2000] OR end:[100 TO 2000] OR \
             (start:[* TO 100} AND end:{2000 TO *])) AND !(feature_type:source))"
        );
    }

    #[test]
    fn test_translate_keyword() {
        let query = compile("keyword(kinase)").unwrap();
        assert_eq!(query.q, "(kinase)");
    }

    #[test]
    fn test_translate_not() {
        let query = compile("not(eq(feature_type,source))").unwrap();
        assert_eq!(query.q, "!feature_type:source");
    }

    #[test]
    fn test_translate_multiple_terms_joined_with_and() {
        let query = compile("eq(genome_id,83332.12)&eq(annotation,PATRIC)").unwrap();
        assert_eq!(query.q, "genome_id:83332.12 AND annotation:PATRIC");
    }

    #[test]
    fn test_translate_rejects_unknown_operator() {
        assert!(compile("frobnicate(a,b)").is_err());
    }

    #[test]
    fn test_escape_preserves_wildcard_and_pipes() {
        let query = compile("eq(patric_id,fig%7C83332.12.peg.1)").unwrap();
        assert_eq!(query.q, "patric_id:fig|83332.12.peg.1");
        let query = compile("eq(plfam_id,*)").unwrap();
        assert_eq!(query.q, "plfam_id:*");
    }
}
