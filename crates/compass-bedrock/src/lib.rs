//! compass-bedrock
//!
//! Bedrock Converse calls used to read an MBTI type out of a report when
//! the local extraction stages come up empty.

pub mod client;
pub mod converse;
pub mod error;
pub mod extract;
