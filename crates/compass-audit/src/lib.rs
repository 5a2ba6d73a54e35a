//! compass-audit
//!
//! Application-level audit trail. Events are emitted through `tracing` and
//! land in CloudWatch Logs next to the request log.

pub mod events;

pub use events::{AuditAction, AuditEvent};
