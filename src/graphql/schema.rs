//! GraphQL schema definition with queries, mutations, and subscriptions

use std::sync::Arc;

use async_graphql::{Context, ErrorExtensions, Object, Result, Schema, Value};

use crate::services::{CatalogError, CatalogService};
use crate::store::Store;

use super::subscriptions::SubscriptionRoot;
use super::types::{Author, Book, BookInput};

/// The GraphQL schema type
pub type BookwireSchema = Schema<QueryRoot, MutationRoot, SubscriptionRoot>;

/// Build the GraphQL schema with all resolvers
pub fn build_schema(store: Arc<Store>, catalog: Arc<CatalogService>) -> BookwireSchema {
    Schema::build(QueryRoot, MutationRoot, SubscriptionRoot)
        .data(store)
        .data(catalog)
        .finish()
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// All books in store order, or the singleton-or-empty list matching `id`.
    async fn books(&self, ctx: &Context<'_>, id: Option<String>) -> Vec<Book> {
        let store = ctx.data_unchecked::<Arc<Store>>();
        store
            .list_books(id.as_deref())
            .into_iter()
            .map(Book::from)
            .collect()
    }

    /// All authors in store order, or the singleton-or-empty list matching `id`.
    async fn authors(&self, ctx: &Context<'_>, id: Option<String>) -> Vec<Author> {
        let store = ctx.data_unchecked::<Arc<Store>>();
        store
            .list_authors(id.as_deref())
            .into_iter()
            .map(Author::from)
            .collect()
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Create a book. Fails with a BAD_USER_INPUT error when the referenced
    /// author does not exist; the catalog is left untouched in that case.
    async fn create_book(&self, ctx: &Context<'_>, book: BookInput) -> Result<Book> {
        let catalog = ctx.data_unchecked::<Arc<CatalogService>>();

        match catalog.create_book(book.into()) {
            Ok(created) => Ok(created.into()),
            Err(err) => {
                let CatalogError::InvalidInput { invalid_args } = &err;
                let args = Value::List(
                    invalid_args.iter().cloned().map(Value::String).collect(),
                );
                Err(err.extend_with(|_, e| {
                    e.set("code", "BAD_USER_INPUT");
                    e.set("invalidArgs", args);
                }))
            }
        }
    }
}
