use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use mongodb::bson::{Bson, Document};
use parking_lot::RwLock;

use super::{Collection, DocumentStore};
use crate::Result;
use crate::query::{Filter, FindQuery};

/// An in-process [`DocumentStore`].
///
/// Documents are kept in insertion order per collection and filters are
/// evaluated with [`Filter::matches`]. Useful for tests and for running the
/// server without a database; nothing is persisted.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in `collection`.
    #[must_use]
    pub fn len(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .get(&collection)
            .map_or(0, Vec::len)
    }

    /// Returns `true` if `collection` holds no documents.
    #[must_use]
    pub fn is_empty(&self, collection: Collection) -> bool {
        self.len(collection) == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_one(&self, collection: Collection, document: Document) -> Result<()> {
        self.collections
            .write()
            .entry(collection)
            .or_default()
            .push(document);
        Ok(())
    }

    async fn find_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Document>> {
        let collections = self.collections.read();
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|doc| filter.matches(doc)))
            .cloned())
    }

    async fn find(&self, collection: Collection, query: &FindQuery) -> Result<Vec<Document>> {
        let mut found: Vec<Document> = {
            let collections = self.collections.read();
            collections
                .get(&collection)
                .map(|docs| {
                    docs.iter()
                        .filter(|doc| query.filter.matches(doc))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        };
        if let Some(sort) = &query.sort {
            found.sort_by(|a, b| {
                let ordering = compare(a.get(&sort.field), b.get(&sort.field));
                if sort.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }
        found.truncate(usize::try_from(query.limit.max(0)).unwrap_or(usize::MAX));
        Ok(found)
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        changes: Document,
    ) -> Result<u64> {
        let mut collections = self.collections.write();
        let Some(doc) = collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|doc| filter.matches(doc)))
        else {
            return Ok(0);
        };
        for (key, value) in changes {
            doc.insert(key, value);
        }
        Ok(1)
    }

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<u64> {
        let mut collections = self.collections.write();
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(0);
        };
        match docs.iter().position(|doc| filter.matches(doc)) {
            Some(index) => {
                docs.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_many(&self, collection: Collection, filter: &Filter) -> Result<u64> {
        let mut collections = self.collections.write();
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|doc| !filter.matches(doc));
        Ok((before - docs.len()) as u64)
    }
}

// Missing values sort first, values of different kinds compare as equal.
fn compare(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (a, b) {
            (Bson::String(a), Bson::String(b)) => a.cmp(b),
            (Bson::Boolean(a), Bson::Boolean(b)) => a.cmp(b),
            (Bson::Int32(a), Bson::Int32(b)) => a.cmp(b),
            (Bson::Int64(a), Bson::Int64(b)) => a.cmp(b),
            (Bson::Double(a), Bson::Double(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Bson::DateTime(a), Bson::DateTime(b)) => a.cmp(b),
            _ => Ordering::Equal,
        },
    }
}
