//! In-memory book and author collections
//!
//! The catalog dataset is ephemeral: it lives in process memory, is seeded at
//! startup, and is never persisted. Collections are insertion-ordered `Vec`s
//! behind reader/writer locks; identity is the `id` field, not the index.
//! Lookups are linear scans, which is fine at this data scale but would not
//! hold up for a real catalog.

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

/// A book in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub title: String,
    /// Publication instant; absent when the client supplied a value the
    /// timestamp scalar could not coerce.
    pub published: Option<DateTime<Utc>>,
    pub author_id: String,
    /// String-encoded to sidestep float precision on the wire.
    pub price: String,
    pub number_of_pages: i32,
}

/// A book as supplied by a client, before the store has assigned an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub published: Option<DateTime<Utc>>,
    pub author_id: String,
    pub price: String,
    pub number_of_pages: i32,
}

impl NewBook {
    fn into_book(self, id: String) -> Book {
        Book {
            id,
            title: self.title,
            published: self.published,
            author_id: self.author_id,
            price: self.price,
            number_of_pages: self.number_of_pages,
        }
    }
}

/// An author. The author set is a static seed; there are no author mutations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    pub name: String,
}

/// Authoritative in-memory store for books and authors.
pub struct Store {
    books: RwLock<Vec<Book>>,
    authors: RwLock<Vec<Author>>,
    /// Last id issued by [`append_book`](Store::append_book), in epoch millis.
    last_issued_id: Mutex<i64>,
}

impl Store {
    /// Create a store populated with the demo seed dataset.
    pub fn new() -> Self {
        Self {
            books: RwLock::new(seed_books()),
            authors: RwLock::new(seed_authors()),
            last_issued_id: Mutex::new(0),
        }
    }

    /// List books in insertion order, narrowed to at most one when an id
    /// filter is given.
    pub fn list_books(&self, filter_id: Option<&str>) -> Vec<Book> {
        let books = self.books.read();
        match filter_id {
            Some(id) => books.iter().filter(|b| b.id == id).cloned().collect(),
            None => books.clone(),
        }
    }

    /// List authors in insertion order, narrowed to at most one when an id
    /// filter is given.
    pub fn list_authors(&self, filter_id: Option<&str>) -> Vec<Author> {
        let authors = self.authors.read();
        match filter_id {
            Some(id) => authors.iter().filter(|a| a.id == id).cloned().collect(),
            None => authors.clone(),
        }
    }

    pub fn find_author(&self, id: &str) -> Option<Author> {
        self.authors.read().iter().find(|a| a.id == id).cloned()
    }

    /// Books belonging to `author_id`, in insertion order. When `filter_id`
    /// is given it is a conjunction with the ownership test, not an override.
    pub fn find_books_by_author(&self, author_id: &str, filter_id: Option<&str>) -> Vec<Book> {
        self.books
            .read()
            .iter()
            .filter(|b| b.author_id == author_id)
            .filter(|b| filter_id.is_none_or(|id| b.id == id))
            .cloned()
            .collect()
    }

    /// Append a new book, assigning a fresh id derived from the current time
    /// in milliseconds. Ids are kept strictly monotonic so that two appends
    /// within the same millisecond still get distinct ids.
    pub fn append_book(&self, book: NewBook) -> Book {
        let id = self.next_id();
        let book = book.into_book(id.to_string());
        self.books.write().push(book.clone());
        book
    }

    fn next_id(&self) -> i64 {
        let mut last = self.last_issued_id.lock();
        let now = Utc::now().timestamp_millis();
        *last = now.max(*last + 1);
        *last
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

fn millis(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ts)
}

fn seed_books() -> Vec<Book> {
    vec![
        Book {
            id: "book1".into(),
            title: "Some book 1".into(),
            published: millis(1_563_726_154_117),
            author_id: "erbol".into(),
            price: "777".into(),
            number_of_pages: 12,
        },
        Book {
            id: "book2".into(),
            title: "Some book 2".into(),
            published: millis(1_563_626_155_111),
            author_id: "erbol".into(),
            price: "413".into(),
            number_of_pages: 12,
        },
        Book {
            id: "book3".into(),
            title: "Some book 3".into(),
            published: millis(1_563_722_155_314),
            author_id: "erbol".into(),
            price: "23".into(),
            number_of_pages: 12,
        },
        Book {
            id: "book4".into(),
            title: "Some book 3".into(),
            published: millis(1_563_727_155_115),
            author_id: "erbol".into(),
            price: "413".into(),
            number_of_pages: 63,
        },
    ]
}

fn seed_authors() -> Vec<Author> {
    vec![Author {
        id: "erbol".into(),
        name: "Erbol".into(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_book(title: &str) -> NewBook {
        NewBook {
            title: title.to_string(),
            published: millis(1_563_726_154_117),
            author_id: "erbol".into(),
            price: "100".into(),
            number_of_pages: 42,
        }
    }

    #[test]
    fn lists_seed_books_in_insertion_order() {
        let store = Store::new();
        let ids: Vec<_> = store
            .list_books(None)
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec!["book1", "book2", "book3", "book4"]);
    }

    #[test]
    fn id_filter_returns_at_most_one() {
        let store = Store::new();
        let books = store.list_books(Some("book2"));
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "Some book 2");

        assert!(store.list_books(Some("no-such-book")).is_empty());
        assert_eq!(store.list_authors(Some("erbol")).len(), 1);
        assert!(store.list_authors(Some("nobody")).is_empty());
    }

    #[test]
    fn find_author_by_id() {
        let store = Store::new();
        assert_eq!(store.find_author("erbol").unwrap().name, "Erbol");
        assert_eq!(store.find_author("missing"), None);
    }

    #[test]
    fn books_by_author_is_a_conjunction_with_the_id_filter() {
        let store = Store::new();

        let all = store.find_books_by_author("erbol", None);
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].id, "book1");

        let one = store.find_books_by_author("erbol", Some("book2"));
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].id, "book2");

        // The id filter never widens the ownership test.
        assert!(store.find_books_by_author("someone-else", Some("book2")).is_empty());
    }

    #[test]
    fn append_assigns_fresh_monotonic_ids() {
        let store = Store::new();
        let before: Vec<_> = store.list_books(None).into_iter().map(|b| b.id).collect();

        let a = store.append_book(sample_book("First"));
        let b = store.append_book(sample_book("Second"));

        assert!(!before.contains(&a.id));
        assert!(!before.contains(&b.id));
        assert_ne!(a.id, b.id);
        assert!(b.id.parse::<i64>().unwrap() > a.id.parse::<i64>().unwrap());

        let books = store.list_books(None);
        assert_eq!(books.len(), 6);
        assert_eq!(books[4].title, "First");
        assert_eq!(books[5].title, "Second");
    }
}
