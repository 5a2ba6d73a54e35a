//! compass-storage
//!
//! S3 operations. Thin wrapper around the AWS S3 SDK, an [`store::ObjectStore`]
//! seam with S3 and in-memory backends, and typed repositories for each
//! record kind.

pub mod client;
pub mod error;
pub mod evaluators;
pub mod memory;
pub mod objects;
pub mod questions;
pub mod reports;
pub mod results;
pub mod state;
pub mod store;
pub mod subscriptions;
pub mod users;
