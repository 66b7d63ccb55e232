use std::sync::Arc;

use super::{by_id, decode, decode_all, encode};
use crate::error::Entity;
use crate::models::{Category, NewCategory, new_id};
use crate::query::{Filter, FindQuery};
use crate::store::{Collection, DocumentStore};
use crate::{Error, Result, timestamp};

/// Categories. There is no update; deleting a category leaves the articles
/// filed under it untouched.
#[derive(Clone, Debug)]
pub struct CategoryRepository {
    store: Arc<dyn DocumentStore>,
}

impl CategoryRepository {
    /// Creates a repository over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Persists a new category.
    pub async fn create(&self, input: NewCategory) -> Result<Category> {
        let category = Category {
            id: new_id(),
            name: input.name,
            description: input.description,
            color: input.color,
            created_at: timestamp::now(),
        };
        self.store
            .insert_one(Collection::Categories, encode(&category)?)
            .await?;
        tracing::info!(id = %category.id, name = %category.name, "category created");
        Ok(category)
    }

    /// All categories in store order, up to the result cap.
    pub async fn list(&self) -> Result<Vec<Category>> {
        let documents = self
            .store
            .find(Collection::Categories, &FindQuery::new(Filter::All))
            .await?;
        decode_all(documents)
    }

    /// The category with `id`.
    pub async fn get_by_id(&self, id: &str) -> Result<Category> {
        match self.store.find_one(Collection::Categories, &by_id(id)).await? {
            Some(document) => decode(document),
            None => Err(Error::not_found(Entity::Category, id)),
        }
    }

    /// Current name of the category, if it exists.
    pub(crate) async fn find_name(&self, id: &str) -> Result<Option<String>> {
        match self.get_by_id(id).await {
            Ok(category) => Ok(Some(category.name)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Deletes the category only.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let deleted = self
            .store
            .delete_one(Collection::Categories, &by_id(id))
            .await?;
        if deleted == 0 {
            return Err(Error::not_found(Entity::Category, id));
        }
        tracing::info!(id, "category deleted");
        Ok(())
    }
}
