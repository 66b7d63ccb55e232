use std::sync::Arc;

use crate::query::Filter;
use crate::store::{Collection, DocumentStore};

/// Removes records that depend on a deleted article.
///
/// The store has no foreign keys, so this runs as a second, separate step
/// after the article itself is gone. A failure here leaves orphaned comments
/// behind; it is logged and never reported to the caller.
#[derive(Clone, Debug)]
pub(crate) struct CascadeCoordinator {
    store: Arc<dyn DocumentStore>,
}

impl CascadeCoordinator {
    pub(crate) fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Purges the comments of `article_id`, returning how many were removed.
    pub(crate) async fn article_deleted(&self, article_id: &str) -> u64 {
        let filter = Filter::eq("article_id", article_id);
        match self.store.delete_many(Collection::Comments, &filter).await {
            Ok(purged) => {
                tracing::debug!(article_id, purged, "purged comments of deleted article");
                purged
            }
            Err(e) => {
                tracing::warn!(
                    article_id,
                    error = %e,
                    "failed to purge comments of deleted article, orphans remain"
                );
                0
            }
        }
    }
}
