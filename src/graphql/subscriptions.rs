//! GraphQL subscriptions for real-time updates
//!
//! Subscriptions allow clients to receive push updates over WebSocket. Each
//! subscriber gets its own listener on the event broker; dropping the stream
//! (client disconnect) deregisters the listener.

use std::sync::Arc;

use async_graphql::{Context, Subscription};
use futures::Stream;
use tokio_stream::StreamExt;

use crate::services::{BookEvent, CatalogService};

use super::types::Book;

pub struct SubscriptionRoot;

#[Subscription]
impl SubscriptionRoot {
    /// Subscribe to book-creation events.
    ///
    /// Delivers the createBook input exactly as the mutation received it,
    /// which is why the payload's `id` is null: the store assigns ids after
    /// the event snapshot is taken.
    async fn book_added<'ctx>(&self, ctx: &Context<'ctx>) -> impl Stream<Item = Book> + 'ctx {
        let catalog = ctx.data_unchecked::<Arc<CatalogService>>();

        catalog
            .subscribe_book_added()
            .into_stream()
            .map(|event| match event {
                BookEvent::Added { book } => Book::from(book),
            })
    }
}
