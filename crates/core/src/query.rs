//! Composition of listing filters into a single store predicate.
//!
//! Independent optional inputs are combined with implicit AND. An input that
//! was not supplied adds no constraint, so a builder with nothing added yields
//! [`Filter::All`].

use mongodb::bson::{Bson, Document, doc};
use serde::Deserialize;

/// Upper bound on the number of records a listing returns.
pub const MAX_RESULTS: i64 = 1000;

/// A predicate over stored documents.
#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    /// Matches every document.
    All,
    /// `field == value`.
    Eq {
        /// Document field.
        field: String,
        /// Expected value.
        value: Bson,
    },
    /// Case-insensitive substring match of a string field.
    Contains {
        /// Document field.
        field: String,
        /// Literal text to look for.
        needle: String,
    },
    /// Every inner filter must match.
    And(Vec<Filter>),
    /// At least one inner filter must match. Never empty when built by
    /// [`QueryBuilder`].
    Or(Vec<Filter>),
}

impl Filter {
    /// `field == value`.
    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Case-insensitive substring match.
    pub fn contains(field: impl Into<String>, needle: impl Into<String>) -> Self {
        Self::Contains {
            field: field.into(),
            needle: needle.into(),
        }
    }

    /// Renders the predicate as a MongoDB filter document.
    ///
    /// Substring needles are regex-escaped, user input never reaches the
    /// `$regex` engine as a pattern.
    #[must_use]
    pub fn to_document(&self) -> Document {
        match self {
            Self::All => Document::new(),
            Self::Eq { field, value } => {
                let mut document = Document::new();
                document.insert(field.clone(), value.clone());
                document
            }
            Self::Contains { field, needle } => {
                let mut document = Document::new();
                document.insert(
                    field.clone(),
                    doc! { "$regex": regex::escape(needle), "$options": "i" },
                );
                document
            }
            Self::And(filters) => {
                let parts: Vec<Document> = filters
                    .iter()
                    .filter(|f| !matches!(f, Self::All))
                    .map(Self::to_document)
                    .collect();
                merge_or_and(parts)
            }
            Self::Or(filters) => {
                let parts: Vec<Bson> = filters
                    .iter()
                    .map(|f| Bson::Document(f.to_document()))
                    .collect();
                doc! { "$or": parts }
            }
        }
    }

    /// Evaluates the predicate against a document.
    #[must_use]
    pub fn matches(&self, document: &Document) -> bool {
        match self {
            Self::All => true,
            Self::Eq { field, value } => document.get(field) == Some(value),
            Self::Contains { field, needle } => match document.get(field) {
                Some(Bson::String(haystack)) => {
                    haystack.to_lowercase().contains(&needle.to_lowercase())
                }
                _ => false,
            },
            Self::And(filters) => filters.iter().all(|f| f.matches(document)),
            Self::Or(filters) => filters.iter().any(|f| f.matches(document)),
        }
    }
}

// `{a: 1}` and `{b: 2}` merge into `{a: 1, b: 2}`; key collisions fall back to `$and`.
fn merge_or_and(parts: Vec<Document>) -> Document {
    match parts.len() {
        0 => Document::new(),
        1 => parts.into_iter().next().unwrap_or_default(),
        _ => {
            let mut merged = Document::new();
            for part in &parts {
                for (key, value) in part {
                    if merged.insert(key.clone(), value.clone()).is_some() {
                        let all: Vec<Bson> = parts.iter().cloned().map(Bson::Document).collect();
                        return doc! { "$and": all };
                    }
                }
            }
            merged
        }
    }
}

/// Builds a [`Filter`] from optional inputs.
///
/// ```
/// use gazette_core::{Filter, QueryBuilder};
///
/// let filter = QueryBuilder::new()
///     .eq_opt("category_id", None::<&str>)
///     .flag("published", false)
///     .build();
/// assert_eq!(filter, Filter::All);
/// ```
#[derive(Clone, Debug, Default)]
pub struct QueryBuilder {
    clauses: Vec<Filter>,
}

impl QueryBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires `field == value`.
    #[must_use]
    pub fn eq(mut self, field: &str, value: impl Into<Bson>) -> Self {
        self.clauses.push(Filter::eq(field, value));
        self
    }

    /// Requires `field == value` when a non-empty value is supplied.
    #[must_use]
    pub fn eq_opt<V>(self, field: &str, value: Option<V>) -> Self
    where
        V: AsRef<str>,
    {
        let value: Option<&str> = value.as_ref().map(|v| AsRef::<str>::as_ref(v));
        match value {
            Some(value) if !value.is_empty() => self.eq(field, value),
            _ => self,
        }
    }

    /// Requires `field == true` when `enabled`; otherwise adds nothing.
    #[must_use]
    pub fn flag(self, field: &str, enabled: bool) -> Self {
        if enabled { self.eq(field, true) } else { self }
    }

    /// Requires any of `fields` to contain `needle`, ignoring case.
    ///
    /// The alternatives are OR'd together and the result is AND'd with the
    /// other clauses. Absent or empty needles add nothing.
    #[must_use]
    pub fn search<V>(mut self, fields: &[&str], needle: Option<V>) -> Self
    where
        V: AsRef<str>,
    {
        let Some(needle) = needle else {
            return self;
        };
        let needle = needle.as_ref();
        if needle.is_empty() || fields.is_empty() {
            return self;
        }
        let alternatives = fields
            .iter()
            .map(|field| Filter::contains(*field, needle))
            .collect();
        self.clauses.push(Filter::Or(alternatives));
        self
    }

    /// Finishes the predicate.
    #[must_use]
    pub fn build(mut self) -> Filter {
        match self.clauses.len() {
            0 => Filter::All,
            1 => self.clauses.remove(0),
            _ => Filter::And(self.clauses),
        }
    }
}

/// Sort key of a [`FindQuery`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sort {
    /// Document field.
    pub field: String,
    /// Largest first when `true`.
    pub descending: bool,
}

/// A complete listing request handed to a [`DocumentStore`](crate::DocumentStore).
#[derive(Clone, Debug, PartialEq)]
pub struct FindQuery {
    /// Predicate.
    pub filter: Filter,
    /// Optional ordering; store default order otherwise.
    pub sort: Option<Sort>,
    /// Result cap.
    pub limit: i64,
}

impl FindQuery {
    /// Query with the default cap of [`MAX_RESULTS`] and store order.
    #[must_use]
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            sort: None,
            limit: MAX_RESULTS,
        }
    }

    /// Orders by `field`, largest first.
    #[must_use]
    pub fn sort_desc(mut self, field: &str) -> Self {
        self.sort = Some(Sort {
            field: field.to_owned(),
            descending: true,
        });
        self
    }

    /// Overrides the result cap.
    #[must_use]
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }
}

/// Filters accepted when listing articles.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ArticleFilters {
    /// Exact category match.
    pub category_id: Option<String>,
    /// Case-insensitive text searched in title and content.
    pub search: Option<String>,
    /// Only published articles when `true`; both otherwise.
    pub published_only: bool,
}

impl ArticleFilters {
    /// Composes the article listing predicate.
    #[must_use]
    pub fn to_filter(&self) -> Filter {
        QueryBuilder::new()
            .eq_opt("category_id", self.category_id.as_deref())
            .flag("published", self.published_only)
            .search(&["title", "content"], self.search.as_deref())
            .build()
    }
}

/// Filters accepted when listing the comments of an article.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct CommentFilters {
    /// Article whose comments are listed. Always applied.
    pub article_id: String,
    /// Only approved comments when `true`; both otherwise.
    #[serde(default)]
    pub approved_only: bool,
}

impl CommentFilters {
    /// Comments of `article_id`, approved or not.
    pub fn for_article(article_id: impl Into<String>) -> Self {
        Self {
            article_id: article_id.into(),
            approved_only: false,
        }
    }

    /// Composes the comment listing predicate.
    #[must_use]
    pub fn to_filter(&self) -> Filter {
        QueryBuilder::new()
            .eq("article_id", self.article_id.as_str())
            .flag("approved", self.approved_only)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, content: &str, published: bool) -> Document {
        doc! {
            "id": "a1",
            "title": title,
            "content": content,
            "category_id": "c1",
            "published": published,
        }
    }

    #[test]
    fn test_no_filters_match_everything() {
        let filter = ArticleFilters::default().to_filter();
        assert_eq!(filter, Filter::All);
        assert_eq!(filter.to_document(), Document::new());
        assert!(filter.matches(&article("x", "y", false)));
    }

    #[test]
    fn test_empty_strings_are_absent() {
        let filters = ArticleFilters {
            category_id: Some(String::new()),
            search: Some(String::new()),
            published_only: false,
        };
        assert_eq!(filters.to_filter(), Filter::All);
    }

    #[test]
    fn test_article_filters_document_shape() {
        let filters = ArticleFilters {
            category_id: Some("c1".into()),
            search: Some("RDC".into()),
            published_only: true,
        };
        let document = filters.to_filter().to_document();
        assert_eq!(
            document,
            doc! {
                "category_id": "c1",
                "published": true,
                "$or": [
                    { "title": { "$regex": "RDC", "$options": "i" } },
                    { "content": { "$regex": "RDC", "$options": "i" } },
                ],
            }
        );
    }

    #[test]
    fn test_search_is_escaped() {
        let document = QueryBuilder::new()
            .search(&["title"], Some("1+1=2 (.*)"))
            .build()
            .to_document();
        let alternatives = document.get_array("$or").unwrap();
        let pattern = alternatives[0]
            .as_document()
            .unwrap()
            .get_document("title")
            .unwrap()
            .get_str("$regex")
            .unwrap();
        assert_eq!(pattern, r"1\+1=2 \(\.\*\)");
    }

    #[test]
    fn test_search_matches_title_or_content_ignoring_case() {
        let filter = ArticleFilters {
            search: Some("rdc".into()),
            ..Default::default()
        }
        .to_filter();
        assert!(filter.matches(&article("Elections en RDC", "...", true)));
        assert!(filter.matches(&article("Elections", "La Rdc vote", false)));
        assert!(!filter.matches(&article("Elections", "Kinshasa", false)));
    }

    #[test]
    fn test_search_needle_is_literal() {
        let filter = QueryBuilder::new().search(&["title"], Some("a.c")).build();
        assert!(filter.matches(&article("xa.cx", "", false)));
        assert!(!filter.matches(&article("abc", "", false)));
    }

    #[test]
    fn test_published_only() {
        let filter = ArticleFilters {
            published_only: true,
            ..Default::default()
        }
        .to_filter();
        assert!(filter.matches(&article("t", "c", true)));
        assert!(!filter.matches(&article("t", "c", false)));
    }

    #[test]
    fn test_comment_filters() {
        let mut filters = CommentFilters::for_article("a1");
        assert_eq!(filters.to_filter().to_document(), doc! { "article_id": "a1" });

        filters.approved_only = true;
        let filter = filters.to_filter();
        assert!(filter.matches(&doc! { "article_id": "a1", "approved": true }));
        assert!(!filter.matches(&doc! { "article_id": "a1", "approved": false }));
        assert!(!filter.matches(&doc! { "article_id": "a2", "approved": true }));
    }

    #[test]
    fn test_colliding_keys_fall_back_to_and() {
        let filter = QueryBuilder::new()
            .search(&["title"], Some("a"))
            .search(&["content"], Some("b"))
            .build();
        let document = filter.to_document();
        assert_eq!(document.get_array("$and").unwrap().len(), 2);
    }

    #[test]
    fn test_find_query_defaults() {
        let query = FindQuery::new(Filter::All).sort_desc("created_at");
        assert_eq!(query.limit, MAX_RESULTS);
        assert_eq!(
            query.sort,
            Some(Sort {
                field: "created_at".into(),
                descending: true,
            })
        );
    }
}
