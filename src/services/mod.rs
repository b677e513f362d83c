//! Domain services shared across the GraphQL layer.

pub mod catalog;

pub use catalog::{BOOK_ADDED_TOPIC, BookEvent, CatalogError, CatalogService};
