//! GraphQL API with subscriptions for real-time updates
//!
//! This module provides the GraphQL API using async-graphql with support for
//! queries, mutations, and subscriptions over WebSocket. It is the single
//! API surface of the backend.

pub mod scalar;
mod schema;
mod subscriptions;
pub mod types;

pub use schema::{BookwireSchema, build_schema};
