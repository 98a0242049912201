//! Catalog service: the orchestration surface presentation layers talk to.
//!
//! The service keeps an in-memory mirror of the catalog so list and detail
//! views never wait on I/O. The mirror is a read cache over the store: every
//! mutation writes through to the store and then rebuilds the mirror from a
//! full re-read. Readers always see a complete snapshot, either the one from
//! before a mutation or the one from after it.
//!
//! # Example
//!
//! ```no_run
//! use bookshelf_core::catalog::BookStore;
//! use bookshelf_core::lookup::OpenLibraryClient;
//! use bookshelf_core::service::{CatalogService, LookupOutcome};
//! use bookshelf_core::Database;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = BookStore::new(Database::new(Path::new("books.db")).await?);
//! let service = CatalogService::open(store, OpenLibraryClient::new()?).await?;
//!
//! match service.lookup_and_add("9780140449136").await {
//!     LookupOutcome::Added(book) => println!("Added {}", book.title),
//!     LookupOutcome::NotFound { isbn } => println!("Nothing known about {isbn}"),
//!     LookupOutcome::Failed(err) => eprintln!("{err}"),
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod outcome;

pub use error::{CatalogError, ValidationError};
pub use outcome::LookupOutcome;

use std::sync::{Arc, RwLock};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::catalog::{BookRecord, CatalogRepository, StorageError};
use crate::isbn;
use crate::lookup::MetadataLookup;

/// Orchestrates the catalog store, the metadata source and the mirror.
///
/// The store handle and the lookup client are passed in at construction;
/// the service owns the mirror and is its only writer.
pub struct CatalogService<R, L> {
    store: R,
    lookup: L,
    mirror: RwLock<Arc<Vec<BookRecord>>>,
    // Serializes "read store, swap mirror" so an older read never lands last.
    refresh_gate: Mutex<()>,
}

impl<R, L> std::fmt::Debug for CatalogService<R, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("mirrored_books", &self.snapshot().len())
            .finish_non_exhaustive()
    }
}

impl<R, L> CatalogService<R, L> {
    /// Returns the current mirror snapshot without copying the records.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Vec<BookRecord>> {
        match self.mirror.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Returns every book in the mirror. Never touches the store.
    #[must_use]
    pub fn list_books(&self) -> Vec<BookRecord> {
        self.snapshot().as_ref().clone()
    }

    /// Finds a book by ISBN in the mirror. Never touches the store.
    ///
    /// An exact key match wins; otherwise the normalized form of `isbn` is
    /// tried, so `978-0-14-044913-6` finds `9780140449136`.
    #[must_use]
    pub fn find_by_isbn(&self, isbn: &str) -> Option<BookRecord> {
        let snapshot = self.snapshot();
        if let Some(book) = snapshot.iter().find(|book| book.isbn == isbn) {
            return Some(book.clone());
        }
        let normalized = isbn::normalize(isbn);
        snapshot
            .iter()
            .find(|book| book.isbn == normalized)
            .cloned()
    }

    fn replace_mirror(&self, books: Vec<BookRecord>) {
        let next = Arc::new(books);
        match self.mirror.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }
}

impl<R: CatalogRepository, L: MetadataLookup> CatalogService<R, L> {
    /// Creates a service with an empty mirror. Call [`refresh`](Self::refresh)
    /// before serving reads, or use [`open`](Self::open).
    #[must_use]
    pub fn new(store: R, lookup: L) -> Self {
        Self {
            store,
            lookup,
            mirror: RwLock::new(Arc::new(Vec::new())),
            refresh_gate: Mutex::new(()),
        }
    }

    /// Creates a service and loads the mirror from the store.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Storage`] if the initial load fails.
    pub async fn open(store: R, lookup: L) -> Result<Self, CatalogError> {
        let service = Self::new(store, lookup);
        service.refresh().await?;
        info!(
            books = service.snapshot().len(),
            source = service.lookup.name(),
            "Catalog loaded"
        );
        Ok(service)
    }

    /// Returns the store this service writes through to.
    #[must_use]
    pub fn store(&self) -> &R {
        &self.store
    }

    /// Rebuilds the mirror from a full read of the store.
    ///
    /// On failure the mirror keeps its last-known-good snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store cannot be read.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), StorageError> {
        let _gate = self.refresh_gate.lock().await;
        let books = match self.store.get_all().await {
            Ok(books) => books,
            Err(error) => {
                warn!(error = %error, kind = %error.kind(), "Catalog refresh failed; keeping previous snapshot");
                return Err(error);
            }
        };
        debug!(count = books.len(), "Mirror refreshed");
        self.replace_mirror(books);
        Ok(())
    }

    /// Validates, stores and mirrors a record, replacing any record with the
    /// same ISBN.
    ///
    /// The ISBN is normalized before storing, so manual entry and scanning
    /// land on the same key. The returned record carries the stored ISBN.
    /// The record is visible through [`list_books`](Self::list_books) and
    /// [`find_by_isbn`](Self::find_by_isbn) once this returns `Ok`.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Validation`] for an empty ISBN or title; nothing is written.
    /// - [`CatalogError::Storage`] if the write fails, or if the write
    ///   succeeded but the follow-up refresh failed. In the latter case the
    ///   record is durable and appears after the next successful refresh.
    #[instrument(skip(self, record), fields(isbn = %record.isbn))]
    pub async fn add_book(&self, record: BookRecord) -> Result<BookRecord, CatalogError> {
        let record = BookRecord {
            isbn: isbn::normalize(&record.isbn),
            ..record
        };
        validate(&record)?;
        self.store.insert(&record).await?;
        self.refresh().await?;
        info!(title = %record.title, "Book added to catalog");
        Ok(record)
    }

    /// Manual-entry form of [`add_book`](Self::add_book).
    ///
    /// # Errors
    ///
    /// Same as [`add_book`](Self::add_book).
    pub async fn add_book_details(
        &self,
        isbn: &str,
        title: &str,
        author: &str,
    ) -> Result<BookRecord, CatalogError> {
        self.add_book(BookRecord::new(isbn, title, author)).await
    }

    /// Looks up `raw_isbn` at the metadata source and, on success, adds the
    /// resulting record.
    ///
    /// The ISBN is normalized first (labels, spaces and hyphens removed).
    /// Exactly one outcome is returned; lookup failures never escape as
    /// errors. A storage failure after a successful fetch is reported as
    /// [`LookupOutcome::Failed`] with [`CatalogError::Storage`]; see
    /// [`add_book`](Self::add_book) for when the record is nevertheless
    /// stored.
    #[instrument(skip(self), fields(isbn = %raw_isbn))]
    pub async fn lookup_and_add(&self, raw_isbn: &str) -> LookupOutcome {
        let isbn = isbn::normalize(raw_isbn);
        if isbn.is_empty() {
            warn!("Rejected lookup for empty ISBN");
            return LookupOutcome::Failed(ValidationError::EmptyIsbn.into());
        }
        if !isbn::checksum_valid(&isbn) {
            warn!(normalized = %isbn, "ISBN check digit mismatch; looking up anyway");
        }

        debug!(normalized = %isbn, source = self.lookup.name(), "Fetching metadata");
        let outcome = match self.lookup.fetch(&isbn).await {
            Ok(record) => match self.add_book(record).await {
                Ok(record) => LookupOutcome::Added(record),
                Err(error) => {
                    warn!(error = %error, error_kind = error.kind_label(), "Fetched book could not be stored");
                    LookupOutcome::Failed(error)
                }
            },
            Err(error) if error.is_not_found() => LookupOutcome::NotFound { isbn },
            Err(error) => {
                warn!(error = %error, error_kind = error.kind_label(), "Metadata lookup failed");
                LookupOutcome::Failed(error.into())
            }
        };

        info!(outcome = outcome.label(), "Lookup finished");
        outcome
    }
}

impl<R, L> CatalogService<R, L>
where
    R: CatalogRepository + 'static,
    L: MetadataLookup + 'static,
{
    /// Runs [`lookup_and_add`](Self::lookup_and_add) on the tokio runtime and
    /// returns a handle that resolves to its single outcome.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_lookup_and_add(self: &Arc<Self>, isbn: impl Into<String>) -> JoinHandle<LookupOutcome> {
        let service = Arc::clone(self);
        let isbn = isbn.into();
        tokio::spawn(async move { service.lookup_and_add(&isbn).await })
    }
}

fn validate(record: &BookRecord) -> Result<(), ValidationError> {
    if record.isbn.is_empty() {
        return Err(ValidationError::EmptyIsbn);
    }
    if record.title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::Database;
    use crate::catalog::{BookStore, StorageErrorKind};
    use crate::lookup::{LookupError, TransportFailure};

    /// Lookup stub answering from a fixed table; unknown ISBNs are `NotFound`.
    #[derive(Default)]
    struct StubLookup {
        answers: HashMap<String, std::result::Result<BookRecord, LookupError>>,
        calls: AtomicUsize,
    }

    impl StubLookup {
        fn with(mut self, isbn: &str, answer: std::result::Result<BookRecord, LookupError>) -> Self {
            self.answers.insert(isbn.to_string(), answer);
            self
        }
    }

    #[async_trait]
    impl MetadataLookup for StubLookup {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn fetch(&self, isbn: &str) -> std::result::Result<BookRecord, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answers
                .get(isbn)
                .cloned()
                .unwrap_or_else(|| Err(LookupError::not_found(isbn)))
        }
    }

    /// Store wrapper that counts writes and can be switched to fail.
    struct FlakyStore {
        inner: BookStore,
        inserts: AtomicUsize,
        fail_reads: AtomicBool,
        fail_writes: AtomicBool,
    }

    impl FlakyStore {
        async fn new() -> Self {
            Self {
                inner: BookStore::new(Database::new_in_memory().await.unwrap()),
                inserts: AtomicUsize::new(0),
                fail_reads: AtomicBool::new(false),
                fail_writes: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl CatalogRepository for FlakyStore {
        async fn get_all(&self) -> crate::catalog::Result<Vec<BookRecord>> {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(StorageError::new(StorageErrorKind::Io, "read failed"));
            }
            self.inner.get_all().await
        }

        async fn get_by_isbn(&self, isbn: &str) -> crate::catalog::Result<Option<BookRecord>> {
            self.inner.get_by_isbn(isbn).await
        }

        async fn insert(&self, record: &BookRecord) -> crate::catalog::Result<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StorageError::new(StorageErrorKind::Io, "write failed"));
            }
            self.inserts.fetch_add(1, Ordering::SeqCst);
            self.inner.insert(record).await
        }
    }

    fn odyssey() -> BookRecord {
        BookRecord::new("9780140449136", "The Odyssey", "Homer")
    }

    // ==================== add_book ====================

    #[tokio::test]
    async fn test_add_book_read_your_write() {
        let service = CatalogService::open(FlakyStore::new().await, StubLookup::default())
            .await
            .unwrap();

        let added = service.add_book(odyssey()).await.unwrap();

        assert_eq!(added, odyssey());
        assert!(service.list_books().contains(&odyssey()));
        assert_eq!(service.find_by_isbn("9780140449136"), Some(odyssey()));
    }

    #[tokio::test]
    async fn test_add_book_validation_gate_performs_no_write() {
        let service = CatalogService::open(FlakyStore::new().await, StubLookup::default())
            .await
            .unwrap();

        let empty_isbn = service.add_book_details("", "X", "Y").await.unwrap_err();
        let empty_title = service.add_book_details("123", "", "Y").await.unwrap_err();
        let blank_title = service.add_book_details("123", "   ", "Y").await.unwrap_err();

        assert!(matches!(
            empty_isbn,
            CatalogError::Validation(ValidationError::EmptyIsbn)
        ));
        assert!(matches!(
            empty_title,
            CatalogError::Validation(ValidationError::EmptyTitle)
        ));
        assert!(matches!(
            blank_title,
            CatalogError::Validation(ValidationError::EmptyTitle)
        ));
        assert_eq!(service.store().inserts.load(Ordering::SeqCst), 0);
        assert!(service.list_books().is_empty());
    }

    #[tokio::test]
    async fn test_add_book_same_isbn_last_write_wins() {
        let service = CatalogService::open(FlakyStore::new().await, StubLookup::default())
            .await
            .unwrap();

        service.add_book_details("123", "Old", "A").await.unwrap();
        service.add_book_details("123", "New", "B").await.unwrap();

        assert_eq!(service.list_books(), vec![BookRecord::new("123", "New", "B")]);
    }

    #[tokio::test]
    async fn test_add_book_storage_failure_keeps_mirror() {
        let service = CatalogService::open(FlakyStore::new().await, StubLookup::default())
            .await
            .unwrap();
        service.add_book(odyssey()).await.unwrap();

        service.store().fail_writes.store(true, Ordering::SeqCst);
        let err = service
            .add_book_details("123", "Unsaved", "Nobody")
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogError::Storage(_)));
        assert_eq!(service.list_books(), vec![odyssey()]);
    }

    #[tokio::test]
    async fn test_add_book_manual_and_scanned_isbn_share_one_key() {
        let lookup = StubLookup::default().with("9780140449136", Ok(odyssey()));
        let service = CatalogService::open(FlakyStore::new().await, lookup)
            .await
            .unwrap();

        let padded = service
            .add_book_details(" 9780140449136 ", "The Odyssey", "Homer")
            .await
            .unwrap();
        service
            .add_book_details("978-0-14-044913-6", "The Odyssey", "Homer")
            .await
            .unwrap();
        let scanned = service.lookup_and_add("9780140449136").await;

        assert_eq!(padded.isbn, "9780140449136");
        assert!(scanned.is_added(), "{scanned:?}");
        assert_eq!(service.list_books(), vec![odyssey()]);
        assert_eq!(service.store().inner.get_all().await.unwrap(), vec![odyssey()]);
        assert_eq!(service.find_by_isbn("9780140449136"), Some(odyssey()));
        assert_eq!(service.find_by_isbn("978-0-14-044913-6"), Some(odyssey()));
    }

    #[tokio::test]
    async fn test_add_book_normalizes_lowercase_check_digit() {
        let service = CatalogService::open(FlakyStore::new().await, StubLookup::default())
            .await
            .unwrap();

        let added = service
            .add_book_details("0-8044-2957-x", "Some Title", "Someone")
            .await
            .unwrap();

        assert_eq!(added.isbn, "080442957X");
        assert!(service.find_by_isbn("080442957X").is_some());
    }

    #[tokio::test]
    async fn test_add_book_blank_isbn_is_validation_error() {
        let service = CatalogService::open(FlakyStore::new().await, StubLookup::default())
            .await
            .unwrap();

        let err = service.add_book_details(" - ", "Title", "A").await.unwrap_err();

        assert!(matches!(
            err,
            CatalogError::Validation(ValidationError::EmptyIsbn)
        ));
        assert_eq!(service.store().inserts.load(Ordering::SeqCst), 0);
    }

    // ==================== refresh / mirror ====================

    #[tokio::test]
    async fn test_new_service_mirror_is_empty_until_refresh() {
        let store = FlakyStore::new().await;
        store.inner.insert(&odyssey()).await.unwrap();
        let service = CatalogService::new(store, StubLookup::default());

        assert!(service.list_books().is_empty());
        service.refresh().await.unwrap();
        assert_eq!(service.list_books(), vec![odyssey()]);
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_last_known_good_snapshot() {
        let service = CatalogService::open(FlakyStore::new().await, StubLookup::default())
            .await
            .unwrap();
        service.add_book(odyssey()).await.unwrap();

        service.store().fail_reads.store(true, Ordering::SeqCst);
        let err = service.refresh().await.unwrap_err();

        assert_eq!(err.kind(), StorageErrorKind::Io);
        assert_eq!(service.list_books(), vec![odyssey()]);
    }

    #[tokio::test]
    async fn test_open_propagates_initial_load_failure() {
        let store = FlakyStore::new().await;
        store.fail_reads.store(true, Ordering::SeqCst);

        let result = CatalogService::open(store, StubLookup::default()).await;

        assert!(matches!(result, Err(CatalogError::Storage(_))));
    }

    #[tokio::test]
    async fn test_find_by_isbn_reads_mirror_not_store() {
        let service = CatalogService::open(FlakyStore::new().await, StubLookup::default())
            .await
            .unwrap();

        // Written behind the service's back: invisible until a refresh.
        service.store().inner.insert(&odyssey()).await.unwrap();
        assert_eq!(service.find_by_isbn("9780140449136"), None);

        service.refresh().await.unwrap();
        assert_eq!(service.find_by_isbn("9780140449136"), Some(odyssey()));
    }

    // ==================== lookup_and_add ====================

    #[tokio::test]
    async fn test_lookup_and_add_success_persists_and_mirrors() {
        let lookup = StubLookup::default().with("9780140449136", Ok(odyssey()));
        let service = CatalogService::open(FlakyStore::new().await, lookup)
            .await
            .unwrap();

        let outcome = service.lookup_and_add("9780140449136").await;

        assert_eq!(outcome.record(), Some(&odyssey()));
        assert_eq!(service.list_books(), vec![odyssey()]);
        assert_eq!(
            service
                .store()
                .inner
                .get_by_isbn("9780140449136")
                .await
                .unwrap(),
            Some(odyssey())
        );
    }

    #[tokio::test]
    async fn test_lookup_and_add_normalizes_typed_isbn() {
        let lookup = StubLookup::default().with("9780140449136", Ok(odyssey()));
        let service = CatalogService::open(FlakyStore::new().await, lookup)
            .await
            .unwrap();

        let outcome = service.lookup_and_add(" ISBN 978-0-14-044913-6 ").await;

        assert!(outcome.is_added(), "{outcome:?}");
    }

    #[tokio::test]
    async fn test_lookup_and_add_not_found_leaves_store_unchanged() {
        let service = CatalogService::open(FlakyStore::new().await, StubLookup::default())
            .await
            .unwrap();

        let outcome = service.lookup_and_add("9780000000002").await;

        match outcome {
            LookupOutcome::NotFound { isbn } => assert_eq!(isbn, "9780000000002"),
            other => panic!("expected NotFound, got {other:?}"),
        }
        assert_eq!(service.store().inserts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_lookup_and_add_transport_error_is_failed() {
        let lookup = StubLookup::default().with(
            "9780140449136",
            Err(LookupError::transport(
                "9780140449136",
                TransportFailure::Timeout,
                "timed out",
            )),
        );
        let service = CatalogService::open(FlakyStore::new().await, lookup)
            .await
            .unwrap();

        let outcome = service.lookup_and_add("9780140449136").await;

        assert!(matches!(
            outcome.error(),
            Some(CatalogError::Lookup(LookupError::Transport { .. }))
        ));
        assert!(service.list_books().is_empty());
        assert_eq!(service.store().inserts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_lookup_and_add_malformed_is_failed_and_distinguishable() {
        let lookup = StubLookup::default().with(
            "9780140449136",
            Err(LookupError::malformed("9780140449136", "missing field 'title'")),
        );
        let service = CatalogService::open(FlakyStore::new().await, lookup)
            .await
            .unwrap();

        let outcome = service.lookup_and_add("9780140449136").await;

        assert!(outcome.is_failed());
        assert_eq!(outcome.error().unwrap().kind_label(), "malformed_response");
    }

    #[tokio::test]
    async fn test_lookup_and_add_storage_failure_is_failed() {
        let lookup = StubLookup::default().with("9780140449136", Ok(odyssey()));
        let service = CatalogService::open(FlakyStore::new().await, lookup)
            .await
            .unwrap();
        service.store().fail_writes.store(true, Ordering::SeqCst);

        let outcome = service.lookup_and_add("9780140449136").await;

        assert!(matches!(outcome.error(), Some(CatalogError::Storage(_))));
        assert!(service.list_books().is_empty());
    }

    #[tokio::test]
    async fn test_lookup_and_add_refresh_failure_after_write_is_failed_but_durable() {
        let lookup = StubLookup::default().with("9780140449136", Ok(odyssey()));
        let service = CatalogService::open(FlakyStore::new().await, lookup)
            .await
            .unwrap();
        service.store().fail_reads.store(true, Ordering::SeqCst);

        let outcome = service.lookup_and_add("9780140449136").await;

        assert!(matches!(outcome.error(), Some(CatalogError::Storage(_))));
        assert!(service.list_books().is_empty());
        assert_eq!(
            service
                .store()
                .inner
                .get_by_isbn("9780140449136")
                .await
                .unwrap(),
            Some(odyssey())
        );

        service.store().fail_reads.store(false, Ordering::SeqCst);
        service.refresh().await.unwrap();
        assert_eq!(service.find_by_isbn("9780140449136"), Some(odyssey()));
    }

    #[tokio::test]
    async fn test_lookup_and_add_empty_isbn_skips_network() {
        let service = CatalogService::open(FlakyStore::new().await, StubLookup::default())
            .await
            .unwrap();

        let outcome = service.lookup_and_add("  - ").await;

        assert!(matches!(
            outcome.error(),
            Some(CatalogError::Validation(ValidationError::EmptyIsbn))
        ));
        assert_eq!(service.lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_lookup_and_add_issues_exactly_one_fetch() {
        let service = CatalogService::open(FlakyStore::new().await, StubLookup::default())
            .await
            .unwrap();

        let _ = service.lookup_and_add("9780140449136").await;

        assert_eq!(service.lookup.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_spawn_lookup_and_add_delivers_outcome() {
        let lookup = StubLookup::default().with("9780140449136", Ok(odyssey()));
        let service = Arc::new(
            CatalogService::open(FlakyStore::new().await, lookup)
                .await
                .unwrap(),
        );

        let outcome = service
            .spawn_lookup_and_add("9780140449136")
            .await
            .unwrap();

        assert!(outcome.is_added());
        assert_eq!(service.find_by_isbn("9780140449136"), Some(odyssey()));
    }

    // ==================== concurrency ====================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds_distinct_isbns_all_mirrored() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db = Database::new(&temp_dir.path().join("books.db"))
            .await
            .unwrap();
        let service = Arc::new(
            CatalogService::open(BookStore::new(db), StubLookup::default())
                .await
                .unwrap(),
        );

        let mut handles = Vec::new();
        for n in 0..20 {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                service
                    .add_book_details(&format!("10000000{n:02}"), &format!("Title {n:02}"), "Author")
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let books = service.list_books();
        assert_eq!(books.len(), 20);
        for n in 0..20 {
            assert!(service.find_by_isbn(&format!("10000000{n:02}")).is_some());
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds_same_isbn_leave_one_consistent_record() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db = Database::new(&temp_dir.path().join("books.db"))
            .await
            .unwrap();
        let service = Arc::new(
            CatalogService::open(BookStore::new(db), StubLookup::default())
                .await
                .unwrap(),
        );

        let mut handles = Vec::new();
        for n in 0..20 {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                service
                    .add_book_details("1", &format!("T{n}"), &format!("A{n}"))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stored = service.store().get_all().await.unwrap();
        assert_eq!(stored.len(), 1);
        let winner = &stored[0];
        assert_eq!(winner.isbn, "1");
        let suffix = winner.title.strip_prefix('T').unwrap();
        assert_eq!(winner.author, format!("A{suffix}"));
        assert!((0..20).any(|n| n.to_string() == suffix));
        assert_eq!(service.list_books(), stored);
    }
}
