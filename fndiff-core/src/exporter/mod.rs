//! Renderers for diff results.
//!
//! - `text`: the line-per-event report
//! - `json`: the serialized result

pub mod json;
pub mod text;
