//! Document store contract and its backends.
mod memory;
mod mongo;

use std::fmt::{self, Debug, Display, Formatter};

use async_trait::async_trait;
use mongodb::bson::Document;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use crate::Result;
use crate::query::{Filter, FindQuery};

/// Collections the content backend persists to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Category documents.
    Categories,
    /// Article documents.
    Articles,
    /// Comment documents.
    Comments,
}

impl Collection {
    /// Every collection, in creation order.
    pub const ALL: [Self; 3] = [Self::Categories, Self::Articles, Self::Comments];

    /// Collection name in the store.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Categories => "categories",
            Self::Articles => "articles",
            Self::Comments => "comments",
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collection scoped persistence used by the repositories.
///
/// Every operation is atomic on a single document only. Implementations must
/// be safe for concurrent use and must never return the store's own `_id`
/// key in documents they hand back.
#[async_trait]
pub trait DocumentStore: Debug + Send + Sync + 'static {
    /// Inserts a full document.
    async fn insert_one(&self, collection: Collection, document: Document) -> Result<()>;

    /// Returns the first document matching `filter`.
    async fn find_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Document>>;

    /// Returns the documents matching `query`, sorted and capped as requested.
    async fn find(&self, collection: Collection, query: &FindQuery) -> Result<Vec<Document>>;

    /// Sets `changes` on the first document matching `filter`.
    ///
    /// Returns the number of matched documents, `0` or `1`.
    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        changes: Document,
    ) -> Result<u64>;

    /// Deletes the first document matching `filter`, returning the number deleted.
    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<u64>;

    /// Deletes every document matching `filter`, returning the number deleted.
    async fn delete_many(&self, collection: Collection, filter: &Filter) -> Result<u64>;

    /// Creates the indexes lookups rely on. Idempotent.
    async fn ensure_indexes(&self) -> Result<()> {
        Ok(())
    }

    /// Releases connections. The store must not be used afterwards.
    async fn close(&self) {}
}
