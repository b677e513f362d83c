//! Catalog mutations and the events they publish
//!
//! The service validates input against store invariants, applies the
//! mutation, and fans the result out to subscribers via the event broker.
//! A failed validation leaves both the store and the broker untouched.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::events::{EventBroker, Listener};
use crate::store::{Book, NewBook, Store};

/// Topic carrying one event per successfully created book.
pub const BOOK_ADDED_TOPIC: &str = "BOOK_ADDED";

/// Events published when the catalog changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BookEvent {
    /// A book was created. Carries the mutation input exactly as supplied,
    /// before the store assigned an id; the stored record returned to the
    /// mutation caller is a different representation of the same book.
    Added { book: NewBook },
}

/// User-correctable failures of catalog mutations.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    /// A referenced entity does not exist; `invalid_args` names the mutation
    /// arguments at fault.
    #[error("Author is not found")]
    InvalidInput { invalid_args: Vec<String> },
}

/// Owns the store and the broker; the single write path into the catalog.
pub struct CatalogService {
    store: Arc<Store>,
    broker: EventBroker<BookEvent>,
}

impl CatalogService {
    pub fn new(store: Arc<Store>, event_capacity: usize) -> Self {
        Self {
            store,
            broker: EventBroker::new(event_capacity),
        }
    }

    /// Create a book. The referenced author must already exist; on success
    /// the stored book (with its freshly assigned id) is returned and the
    /// raw input is published to [`BOOK_ADDED_TOPIC`].
    pub fn create_book(&self, input: NewBook) -> Result<Book, CatalogError> {
        if self.store.find_author(&input.author_id).is_none() {
            return Err(CatalogError::InvalidInput {
                invalid_args: vec!["book".to_string()],
            });
        }

        let book = self.store.append_book(input.clone());
        tracing::debug!(book_id = %book.id, title = %book.title, "Book created");

        self.broker
            .publish(BOOK_ADDED_TOPIC, BookEvent::Added { book: input });
        Ok(book)
    }

    /// Register a listener for book-creation events.
    pub fn subscribe_book_added(&self) -> Listener<BookEvent> {
        self.broker.subscribe(BOOK_ADDED_TOPIC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    fn service() -> CatalogService {
        CatalogService::new(Arc::new(Store::new()), 16)
    }

    fn input(author_id: &str) -> NewBook {
        NewBook {
            title: "Fresh book".into(),
            published: chrono::DateTime::from_timestamp_millis(1_563_726_154_117),
            author_id: author_id.into(),
            price: "999".into(),
            number_of_pages: 7,
        }
    }

    #[tokio::test]
    async fn create_book_appends_and_publishes_the_raw_input() {
        let catalog = service();
        let mut listener = catalog.subscribe_book_added();
        let supplied = input("erbol");

        let created = catalog.create_book(supplied.clone()).unwrap();

        // The caller gets the stored record, id freshly assigned.
        assert!(!created.id.is_empty());
        assert_ne!(created.id, "book1");
        assert_eq!(created.title, supplied.title);
        assert_eq!(catalog.store.list_books(None).len(), 5);

        // The subscriber gets the input as supplied, without the id.
        let event = listener.recv().await.unwrap();
        assert_eq!(event, BookEvent::Added { book: supplied });
        assert_eq!(listener.try_recv(), None);
    }

    #[tokio::test]
    async fn unknown_author_fails_without_mutating_or_publishing() {
        let catalog = service();
        let mut listener = catalog.subscribe_book_added();

        let err = catalog.create_book(input("nobody")).unwrap_err();
        assert_matches!(
            err,
            CatalogError::InvalidInput { ref invalid_args } if invalid_args == &["book".to_string()]
        );

        assert_eq!(catalog.store.list_books(None).len(), 4);
        assert_eq!(listener.try_recv(), None);
    }

    #[test]
    fn publish_with_no_subscribers_still_creates_the_book() {
        let catalog = service();
        let created = catalog.create_book(input("erbol")).unwrap();
        assert_eq!(catalog.store.list_books(Some(&created.id)).len(), 1);
    }
}
