use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{Document, doc};
use mongodb::options::IndexOptions;
use mongodb::{Client, Database, IndexModel};

use super::{Collection, DocumentStore};
use crate::query::{Filter, FindQuery};
use crate::{Error, Result};

/// [`DocumentStore`] backed by a MongoDB database.
///
/// The driver owns the connection pool; cloning the store is cheap and shares
/// it. Application ids live in the `id` field, MongoDB's `_id` is projected out
/// of every read.
#[derive(Clone, Debug)]
pub struct MongoStore {
    client: Client,
    database: Database,
}

impl MongoStore {
    /// Connects to `uri` and selects `database`.
    pub async fn connect(uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri).await.map_err(Error::store)?;
        Ok(Self::with_client(client, database))
    }

    /// Uses an existing client.
    #[must_use]
    pub fn with_client(client: Client, database: &str) -> Self {
        let database = client.database(database);
        Self { client, database }
    }

    fn collection(&self, collection: Collection) -> mongodb::Collection<Document> {
        self.database.collection(collection.as_str())
    }
}

fn without_object_id() -> Document {
    doc! { "_id": 0 }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn insert_one(&self, collection: Collection, document: Document) -> Result<()> {
        self.collection(collection)
            .insert_one(document)
            .await
            .map_err(Error::store)?;
        Ok(())
    }

    async fn find_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Document>> {
        self.collection(collection)
            .find_one(filter.to_document())
            .projection(without_object_id())
            .await
            .map_err(Error::store)
    }

    async fn find(&self, collection: Collection, query: &FindQuery) -> Result<Vec<Document>> {
        let coll = self.collection(collection);
        let mut find = coll
            .find(query.filter.to_document())
            .projection(without_object_id())
            .limit(query.limit);
        if let Some(sort) = &query.sort {
            let mut order = Document::new();
            order.insert(sort.field.clone(), if sort.descending { -1 } else { 1 });
            find = find.sort(order);
        }
        let mut cursor = find.await.map_err(Error::store)?;
        let mut documents = Vec::new();
        while let Some(document) = cursor.try_next().await.map_err(Error::store)? {
            documents.push(document);
        }
        Ok(documents)
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        changes: Document,
    ) -> Result<u64> {
        let result = self
            .collection(collection)
            .update_one(filter.to_document(), doc! { "$set": changes })
            .await
            .map_err(Error::store)?;
        Ok(result.matched_count)
    }

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<u64> {
        let result = self
            .collection(collection)
            .delete_one(filter.to_document())
            .await
            .map_err(Error::store)?;
        Ok(result.deleted_count)
    }

    async fn delete_many(&self, collection: Collection, filter: &Filter) -> Result<u64> {
        let result = self
            .collection(collection)
            .delete_many(filter.to_document())
            .await
            .map_err(Error::store)?;
        Ok(result.deleted_count)
    }

    async fn ensure_indexes(&self) -> Result<()> {
        for collection in Collection::ALL {
            let model = IndexModel::builder()
                .keys(doc! { "id": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build();
            self.collection(collection)
                .create_index(model)
                .await
                .map_err(Error::store)?;
            tracing::debug!(%collection, "unique id index ready");
        }
        let model = IndexModel::builder()
            .keys(doc! { "article_id": 1, "created_at": -1 })
            .build();
        self.collection(Collection::Comments)
            .create_index(model)
            .await
            .map_err(Error::store)?;
        Ok(())
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
    }
}
