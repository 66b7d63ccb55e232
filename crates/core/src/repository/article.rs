use std::sync::Arc;

use mongodb::bson::{Bson, Document};

use super::{CategoryRepository, by_id, decode, decode_all, encode};
use crate::cascade::CascadeCoordinator;
use crate::error::Entity;
use crate::models::{Article, ArticleChanges, NewArticle, new_id};
use crate::query::{ArticleFilters, FindQuery};
use crate::store::{Collection, DocumentStore};
use crate::{Error, Result, timestamp};

/// Articles.
///
/// `category_name` is a write-time copy of the referenced category's name: it
/// is resolved on create and whenever an update supplies `category_id`, and is
/// never refreshed when the category itself changes or disappears.
#[derive(Clone, Debug)]
pub struct ArticleRepository {
    store: Arc<dyn DocumentStore>,
    categories: CategoryRepository,
    cascade: CascadeCoordinator,
}

impl ArticleRepository {
    /// Creates a repository over `store`, resolving names through `categories`.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, categories: CategoryRepository) -> Self {
        let cascade = CascadeCoordinator::new(store.clone());
        Self {
            store,
            categories,
            cascade,
        }
    }

    /// Persists a new article. An unknown category leaves `category_name` unset.
    pub async fn create(&self, input: NewArticle) -> Result<Article> {
        let category_name = self.categories.find_name(&input.category_id).await?;
        let now = timestamp::now();
        let article = Article {
            id: new_id(),
            title: input.title,
            content: input.content,
            author: input.author,
            category_id: input.category_id,
            category_name,
            image_url: input.image_url,
            published: input.published,
            created_at: now,
            updated_at: now,
        };
        self.store
            .insert_one(Collection::Articles, encode(&article)?)
            .await?;
        tracing::info!(id = %article.id, category_id = %article.category_id, "article created");
        Ok(article)
    }

    /// Articles matching `filters`, newest first, up to the result cap.
    pub async fn list(&self, filters: &ArticleFilters) -> Result<Vec<Article>> {
        let query = FindQuery::new(filters.to_filter()).sort_desc("created_at");
        let documents = self.store.find(Collection::Articles, &query).await?;
        decode_all(documents)
    }

    /// The article with `id`.
    pub async fn get_by_id(&self, id: &str) -> Result<Article> {
        match self.store.find_one(Collection::Articles, &by_id(id)).await? {
            Some(document) => decode(document),
            None => Err(Error::not_found(Entity::Article, id)),
        }
    }

    /// Returns `true` if an article with `id` exists.
    pub async fn exists(&self, id: &str) -> Result<bool> {
        Ok(self
            .store
            .find_one(Collection::Articles, &by_id(id))
            .await?
            .is_some())
    }

    /// Merges the supplied fields into the article and returns the result.
    ///
    /// Fails with [`Error::Validation`] before touching the store when nothing
    /// is supplied. `updated_at` is always refreshed.
    pub async fn update(&self, id: &str, changes: ArticleChanges) -> Result<Article> {
        if changes.is_empty() {
            return Err(Error::Validation("no fields to update".into()));
        }

        let mut set = Document::new();
        if let Some(title) = changes.title {
            set.insert("title", title);
        }
        if let Some(content) = changes.content {
            set.insert("content", content);
        }
        if let Some(author) = changes.author {
            set.insert("author", author);
        }
        if let Some(image_url) = changes.image_url {
            set.insert("image_url", image_url);
        }
        if let Some(published) = changes.published {
            set.insert("published", published);
        }
        if let Some(category_id) = changes.category_id {
            let category_name = self.categories.find_name(&category_id).await?;
            set.insert("category_id", category_id);
            set.insert("category_name", category_name.map_or(Bson::Null, Bson::String));
        }
        set.insert("updated_at", timestamp::format(&timestamp::now()));

        let matched = self
            .store
            .update_one(Collection::Articles, &by_id(id), set)
            .await?;
        if matched == 0 {
            return Err(Error::not_found(Entity::Article, id));
        }
        tracing::info!(id, "article updated");
        self.get_by_id(id).await
    }

    /// Deletes the article, then purges its comments.
    ///
    /// The purge is best effort: once the article is gone the call succeeds
    /// even if comments could not be removed.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let deleted = self
            .store
            .delete_one(Collection::Articles, &by_id(id))
            .await?;
        if deleted == 0 {
            return Err(Error::not_found(Entity::Article, id));
        }
        let purged = self.cascade.article_deleted(id).await;
        tracing::info!(id, purged, "article deleted");
        Ok(())
    }
}
