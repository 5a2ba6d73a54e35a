//! compass-mbti
//!
//! Reads an MBTI type out of an uploaded PDF report. A prioritized chain of
//! extraction stages is tried in order, cheapest first, until one of them
//! produces one of the 16 valid type codes.

pub mod chain;
pub mod error;
pub mod images;
pub mod ocr;
pub mod patterns;
pub mod raw;
pub mod stages;

pub use chain::{Extraction, ExtractionChain};
pub use error::ExtractError;
