//! Repository seam for catalog persistence.
//!
//! The catalog service depends on this trait rather than on [`BookStore`]
//! directly, so storage can be swapped (or failed on purpose) without
//! touching the orchestration code.

use std::sync::Arc;

use async_trait::async_trait;

use super::{BookRecord, BookStore, Result};

/// Data-access contract for the book catalog.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Returns every stored record. Ordering is implementation-defined.
    async fn get_all(&self) -> Result<Vec<BookRecord>>;

    /// Returns the record for `isbn`, or `None` when absent.
    async fn get_by_isbn(&self, isbn: &str) -> Result<Option<BookRecord>>;

    /// Inserts or fully replaces the record with the same ISBN.
    async fn insert(&self, record: &BookRecord) -> Result<()>;
}

#[async_trait]
impl CatalogRepository for BookStore {
    async fn get_all(&self) -> Result<Vec<BookRecord>> {
        BookStore::get_all(self).await
    }

    async fn get_by_isbn(&self, isbn: &str) -> Result<Option<BookRecord>> {
        BookStore::get_by_isbn(self, isbn).await
    }

    async fn insert(&self, record: &BookRecord) -> Result<()> {
        BookStore::insert(self, record).await
    }
}

#[async_trait]
impl<T: CatalogRepository + ?Sized> CatalogRepository for Arc<T> {
    async fn get_all(&self) -> Result<Vec<BookRecord>> {
        (**self).get_all().await
    }

    async fn get_by_isbn(&self, isbn: &str) -> Result<Option<BookRecord>> {
        (**self).get_by_isbn(isbn).await
    }

    async fn insert(&self, record: &BookRecord) -> Result<()> {
        (**self).insert(record).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::Database;

    async fn count(repo: &impl CatalogRepository) -> usize {
        repo.get_all().await.unwrap().len()
    }

    #[tokio::test]
    async fn test_catalog_repository_trait_delegates_to_store() {
        let store = BookStore::new(Database::new_in_memory().await.unwrap());
        let record = BookRecord::new("9780140449136", "The Odyssey", "Homer");

        CatalogRepository::insert(&store, &record).await.unwrap();

        assert_eq!(count(&store).await, 1);
        assert_eq!(
            CatalogRepository::get_by_isbn(&store, "9780140449136")
                .await
                .unwrap(),
            Some(record)
        );
    }

    #[tokio::test]
    async fn test_catalog_repository_through_shared_trait_object() {
        let store = BookStore::new(Database::new_in_memory().await.unwrap());
        let shared: Arc<dyn CatalogRepository> = Arc::new(store);

        shared
            .insert(&BookRecord::new("123", "Shared", "Someone"))
            .await
            .unwrap();

        assert_eq!(count(&shared).await, 1);
    }
}
