//! Service layer: notification dispatch.
//!
//! [`Dispatcher`] coordinates the connection and room registries and is
//! the only write surface producers use.

pub mod dispatcher;

pub use dispatcher::Dispatcher;
