//! compass-billing
//!
//! Stripe integration: checkout and customer-portal sessions, webhook
//! signature verification, and syncing subscription state from webhook
//! events into storage.

pub mod client;
pub mod error;
pub mod sync;
pub mod webhook;
