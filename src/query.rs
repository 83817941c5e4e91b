//! Collection query builder
//!
//! ## Table of Contents
//! - **QueryValue**: Nested query tree, flattened to bracketed key paths
//! - **CollectionQuery**: populate / fields / filters / sort / pagination
//! - **team_member_by_slug**: The detail page query
//!
//! Keys flatten the way the content API expects them:
//! `populate[photo][fields][0]=alternativeText`. Keys and values are
//! percent-encoded, leaving only RFC 3986 unreserved characters literal.

use crate::config::ContentConfig;
use crate::error::{CmsError, Result};
use crate::media::join_url;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Url;

const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Fields requested for every media relation
pub const MEDIA_FIELDS: [&str; 3] = ["alternativeText", "name", "url"];

/// Top-level fields requested for a team member
pub const MEMBER_FIELDS: [&str; 3] = ["name", "description", "content"];

/// A node of the nested query tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    /// Leaf value
    Scalar(String),
    /// Indexed list (`key[0]`, `key[1]`, ...)
    List(Vec<QueryValue>),
    /// Ordered map (`key[child]`)
    Map(Vec<(String, QueryValue)>),
}

impl QueryValue {
    /// Build a list of scalars
    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(items.into_iter().map(|s| Self::Scalar(s.into())).collect())
    }

    /// Flatten into unencoded `(key, value)` pairs
    pub fn flatten(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        match self {
            Self::Map(entries) => {
                for (key, value) in entries {
                    value.flatten_into(key.clone(), &mut out);
                }
            }
            // A bare scalar or list has no key to hang on.
            Self::Scalar(_) | Self::List(_) => {}
        }
        out
    }

    fn flatten_into(&self, prefix: String, out: &mut Vec<(String, String)>) {
        match self {
            Self::Scalar(value) => out.push((prefix, value.clone())),
            Self::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    item.flatten_into(format!("{}[{}]", prefix, i), out);
                }
            }
            Self::Map(entries) => {
                for (key, value) in entries {
                    value.flatten_into(format!("{}[{}]", prefix, key), out);
                }
            }
        }
    }
}

/// Filter operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// Equal
    Eq,
    /// Not equal
    Ne,
    /// Substring, case-sensitive
    Contains,
    /// Substring, case-insensitive
    ContainsI,
}

impl FilterOp {
    /// Operator token on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "$eq",
            FilterOp::Ne => "$ne",
            FilterOp::Contains => "$contains",
            FilterOp::ContainsI => "$containsi",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Filter {
    field: String,
    op: FilterOp,
    value: String,
}

/// Query against a content collection endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionQuery {
    populate: Vec<(String, Vec<String>)>,
    fields: Vec<String>,
    filters: Vec<Filter>,
    sort: Vec<String>,
    locale: Option<String>,
    page: Option<(u32, u32)>,
}

impl CollectionQuery {
    /// Create an empty query
    pub fn new() -> Self {
        Self::default()
    }

    /// Expand a relation inline, restricted to the given fields
    pub fn populate<I, S>(mut self, relation: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.populate
            .push((relation.into(), fields.into_iter().map(Into::into).collect()));
        self
    }

    /// Restrict top-level fields
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Add a filter term
    pub fn filter(mut self, field: impl Into<String>, op: FilterOp, value: impl Into<String>) -> Self {
        self.filters.push(Filter {
            field: field.into(),
            op,
            value: value.into(),
        });
        self
    }

    /// Add an equality filter
    pub fn filter_eq(self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filter(field, FilterOp::Eq, value)
    }

    /// Add a sort key, e.g. `name:asc`
    pub fn sort(mut self, key: impl Into<String>) -> Self {
        self.sort.push(key.into());
        self
    }

    /// Request a specific locale
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Request one page of results
    pub fn page(mut self, page: u32, page_size: u32) -> Self {
        self.page = Some((page, page_size));
        self
    }

    /// Filter terms as `(field, op, value)`
    pub fn filter_terms(&self) -> impl Iterator<Item = (&str, FilterOp, &str)> {
        self.filters
            .iter()
            .map(|f| (f.field.as_str(), f.op, f.value.as_str()))
    }

    /// Build the nested query tree
    pub fn to_value(&self) -> QueryValue {
        let mut root = Vec::new();

        if !self.populate.is_empty() {
            let relations = self
                .populate
                .iter()
                .map(|(relation, fields)| {
                    let body = if fields.is_empty() {
                        QueryValue::Map(Vec::new())
                    } else {
                        QueryValue::Map(vec![(
                            "fields".to_string(),
                            QueryValue::list(fields.iter().cloned()),
                        )])
                    };
                    (relation.clone(), body)
                })
                .collect();
            root.push(("populate".to_string(), QueryValue::Map(relations)));
        }

        if !self.fields.is_empty() {
            root.push((
                "fields".to_string(),
                QueryValue::list(self.fields.iter().cloned()),
            ));
        }

        if !self.filters.is_empty() {
            let mut by_field: Vec<(String, QueryValue)> = Vec::new();
            for filter in &self.filters {
                let term = (
                    filter.op.as_str().to_string(),
                    QueryValue::Scalar(filter.value.clone()),
                );
                match by_field.iter().position(|(field, _)| *field == filter.field) {
                    Some(pos) => {
                        if let QueryValue::Map(terms) = &mut by_field[pos].1 {
                            terms.push(term);
                        }
                    }
                    None => by_field.push((filter.field.clone(), QueryValue::Map(vec![term]))),
                }
            }
            root.push(("filters".to_string(), QueryValue::Map(by_field)));
        }

        if !self.sort.is_empty() {
            root.push(("sort".to_string(), QueryValue::list(self.sort.iter().cloned())));
        }

        if let Some(locale) = &self.locale {
            root.push(("locale".to_string(), QueryValue::Scalar(locale.clone())));
        }

        if let Some((page, page_size)) = self.page {
            root.push((
                "pagination".to_string(),
                QueryValue::Map(vec![
                    ("page".to_string(), QueryValue::Scalar(page.to_string())),
                    ("pageSize".to_string(), QueryValue::Scalar(page_size.to_string())),
                ]),
            ));
        }

        QueryValue::Map(root)
    }

    /// Unencoded `(key, value)` pairs in wire order
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.to_value().flatten()
    }

    /// Percent-encoded query string, without the leading `?`
    pub fn encode(&self) -> String {
        self.pairs()
            .iter()
            .map(|(k, v)| {
                format!(
                    "{}={}",
                    utf8_percent_encode(k, QUERY_ENCODE_SET),
                    utf8_percent_encode(v, QUERY_ENCODE_SET)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Absolute request URL for this query
    pub fn to_url(&self, config: &ContentConfig) -> Result<Url> {
        let base = join_url(&config.origin, &config.resource_path);
        let query = self.encode();
        let raw = if query.is_empty() {
            base
        } else {
            format!("{}?{}", base, query)
        };
        Url::parse(&raw).map_err(|e| CmsError::config(format!("Invalid request URL {:?}: {}", raw, e)))
    }
}

/// Query for the team member whose slug equals `slug`
///
/// The slug is passed through as-is.
pub fn team_member_by_slug(slug: &str) -> CollectionQuery {
    CollectionQuery::new()
        .populate("photo", MEDIA_FIELDS)
        .populate("photo1", MEDIA_FIELDS)
        .fields(MEMBER_FIELDS)
        .filter_eq("slug", slug)
}
