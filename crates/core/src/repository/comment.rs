use std::sync::Arc;

use mongodb::bson::doc;

use super::{ArticleRepository, by_id, decode, decode_all, encode};
use crate::error::Entity;
use crate::models::{Comment, NewComment, new_id};
use crate::query::{CommentFilters, FindQuery};
use crate::store::{Collection, DocumentStore};
use crate::{Error, Result, timestamp};

/// Comments. The only mutation after creation is approval.
#[derive(Clone, Debug)]
pub struct CommentRepository {
    store: Arc<dyn DocumentStore>,
    articles: ArticleRepository,
}

impl CommentRepository {
    /// Creates a repository over `store`, checking parents through `articles`.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, articles: ArticleRepository) -> Self {
        Self { store, articles }
    }

    /// Persists a new, unapproved comment on an existing article.
    pub async fn create(&self, input: NewComment) -> Result<Comment> {
        if !self.articles.exists(&input.article_id).await? {
            return Err(Error::not_found(Entity::Article, input.article_id));
        }
        let comment = Comment {
            id: new_id(),
            article_id: input.article_id,
            author: input.author,
            content: input.content,
            approved: false,
            created_at: timestamp::now(),
        };
        self.store
            .insert_one(Collection::Comments, encode(&comment)?)
            .await?;
        tracing::info!(id = %comment.id, article_id = %comment.article_id, "comment created");
        Ok(comment)
    }

    /// Comments matching `filters`, newest first, up to the result cap.
    pub async fn list(&self, filters: &CommentFilters) -> Result<Vec<Comment>> {
        let query = FindQuery::new(filters.to_filter()).sort_desc("created_at");
        let documents = self.store.find(Collection::Comments, &query).await?;
        decode_all(documents)
    }

    /// The comment with `id`.
    pub async fn get_by_id(&self, id: &str) -> Result<Comment> {
        match self.store.find_one(Collection::Comments, &by_id(id)).await? {
            Some(document) => decode(document),
            None => Err(Error::not_found(Entity::Comment, id)),
        }
    }

    /// Marks the comment approved and returns it. Approving twice is harmless.
    pub async fn approve(&self, id: &str) -> Result<Comment> {
        let matched = self
            .store
            .update_one(Collection::Comments, &by_id(id), doc! { "approved": true })
            .await?;
        if matched == 0 {
            return Err(Error::not_found(Entity::Comment, id));
        }
        tracing::info!(id, "comment approved");
        self.get_by_id(id).await
    }

    /// Deletes the comment only.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let deleted = self
            .store
            .delete_one(Collection::Comments, &by_id(id))
            .await?;
        if deleted == 0 {
            return Err(Error::not_found(Entity::Comment, id));
        }
        tracing::info!(id, "comment deleted");
        Ok(())
    }
}
