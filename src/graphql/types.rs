//! GraphQL type definitions
//!
//! These types mirror the store's domain models but are decorated with
//! async-graphql attributes; relation fields resolve through the store
//! handle carried in the request context.

use std::sync::Arc;

use async_graphql::{Context, InputObject, Object};
use serde::{Deserialize, Serialize};

use crate::store::{Author as AuthorRecord, Book as BookRecord, NewBook, Store};

use super::scalar::Date;

/// A book in the catalog.
///
/// `id` is optional because subscription payloads carry the mutation input
/// as supplied, before the store has assigned an id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: Option<String>,
    pub title: String,
    pub published: Date,
    pub author_id: String,
    pub price: String,
    pub number_of_pages: i32,
}

#[Object]
impl Book {
    async fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    async fn title(&self) -> &str {
        &self.title
    }

    async fn published(&self) -> Date {
        self.published
    }

    async fn author_id(&self) -> &str {
        &self.author_id
    }

    async fn price(&self) -> &str {
        &self.price
    }

    async fn number_of_pages(&self) -> i32 {
        self.number_of_pages
    }

    /// The author this book references. A dangling reference resolves to
    /// null, never an error.
    async fn author(&self, ctx: &Context<'_>) -> Option<Author> {
        let store = ctx.data_unchecked::<Arc<Store>>();
        store.find_author(&self.author_id).map(Author::from)
    }
}

impl From<BookRecord> for Book {
    fn from(r: BookRecord) -> Self {
        Book {
            id: Some(r.id),
            title: r.title,
            published: Date(r.published),
            author_id: r.author_id,
            price: r.price,
            number_of_pages: r.number_of_pages,
        }
    }
}

impl From<NewBook> for Book {
    fn from(r: NewBook) -> Self {
        Book {
            id: None,
            title: r.title,
            published: Date(r.published),
            author_id: r.author_id,
            price: r.price,
            number_of_pages: r.number_of_pages,
        }
    }
}

/// An author in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    pub name: String,
}

#[Object]
impl Author {
    async fn id(&self) -> &str {
        &self.id
    }

    async fn name(&self) -> &str {
        &self.name
    }

    /// Books belonging to this author. An `id` argument narrows within the
    /// author's books; it never widens past the ownership test.
    async fn books(&self, ctx: &Context<'_>, id: Option<String>) -> Vec<Book> {
        let store = ctx.data_unchecked::<Arc<Store>>();
        store
            .find_books_by_author(&self.id, id.as_deref())
            .into_iter()
            .map(Book::from)
            .collect()
    }
}

impl From<AuthorRecord> for Author {
    fn from(r: AuthorRecord) -> Self {
        Author {
            id: r.id,
            name: r.name,
        }
    }
}

/// Input for creating a book.
#[derive(Debug, InputObject)]
pub struct BookInput {
    pub title: String,
    /// Millisecond timestamp; a malformed value coerces to null.
    pub published: Date,
    pub author_id: String,
    pub price: String,
    pub number_of_pages: i32,
}

impl From<BookInput> for NewBook {
    fn from(input: BookInput) -> Self {
        NewBook {
            title: input.title,
            published: input.published.0,
            author_id: input.author_id,
            price: input.price,
            number_of_pages: input.number_of_pages,
        }
    }
}
