//! Core of the Gazette content backend.
//!
//! This crate owns the domain model (categories, articles and comments), the
//! [`DocumentStore`] contract with its MongoDB and in-memory backends, the
//! [`QueryBuilder`] used to compose listing filters, and the repositories that
//! keep denormalized fields and dependent records consistent.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use gazette_core::{MemoryStore, Repositories, models::NewCategory};
//!
//! # async fn demo() -> gazette_core::Result<()> {
//! let repos = Repositories::new(Arc::new(MemoryStore::new()));
//! let category = repos
//!     .categories
//!     .create(NewCategory {
//!         name: "Politics".into(),
//!         description: "National politics".into(),
//!         color: "#007FFF".into(),
//!     })
//!     .await?;
//! assert_eq!(repos.categories.list().await?.len(), 1);
//! # let _ = category;
//! # Ok(())
//! # }
//! ```

mod cascade;
mod error;

pub mod models;
pub mod query;
pub mod repository;
pub mod store;
pub mod timestamp;

pub use mongodb::bson;

pub use self::error::{BoxedError, Entity, Error, Result};
pub use self::query::{
    ArticleFilters, CommentFilters, Filter, FindQuery, MAX_RESULTS, QueryBuilder,
};
pub use self::repository::{ArticleRepository, CategoryRepository, CommentRepository, Repositories};
pub use self::store::{Collection, DocumentStore, MemoryStore, MongoStore};
