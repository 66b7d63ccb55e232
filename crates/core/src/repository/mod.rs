//! Per-entity repositories.
//!
//! Repositories are the only place where domain records are converted to and
//! from stored documents. They are cheap to clone; every clone shares the same
//! [`DocumentStore`].

mod article;
mod category;
mod comment;

use std::sync::Arc;

use mongodb::bson::{self, Document};
use serde::Serialize;
use serde::de::DeserializeOwned;

pub use article::ArticleRepository;
pub use category::CategoryRepository;
pub use comment::CommentRepository;

use crate::query::Filter;
use crate::store::DocumentStore;
use crate::{Error, Result};

/// The repositories of every entity, wired to one store.
#[derive(Clone, Debug)]
pub struct Repositories {
    /// Categories.
    pub categories: CategoryRepository,
    /// Articles, with category name resolution and comment cascade.
    pub articles: ArticleRepository,
    /// Comments.
    pub comments: CommentRepository,
}

impl Repositories {
    /// Wires the repositories to `store`.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        let categories = CategoryRepository::new(store.clone());
        let articles = ArticleRepository::new(store.clone(), categories.clone());
        let comments = CommentRepository::new(store, articles.clone());
        Self {
            categories,
            articles,
            comments,
        }
    }
}

fn by_id(id: &str) -> Filter {
    Filter::eq("id", id)
}

fn encode<T: Serialize>(record: &T) -> Result<Document> {
    bson::to_document(record).map_err(Error::store)
}

fn decode<T: DeserializeOwned>(document: Document) -> Result<T> {
    bson::from_document(document).map_err(Error::store)
}

fn decode_all<T: DeserializeOwned>(documents: Vec<Document>) -> Result<Vec<T>> {
    documents.into_iter().map(decode).collect()
}
