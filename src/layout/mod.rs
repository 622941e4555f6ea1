//! Page layout analysis
//!
//! Reconstructs paragraph structure from line-level geometry:
//!
//! - **Line boxes** ([`LineBox`]) - pixel bounding boxes of recognized lines
//! - **Clustering** ([`cluster`]) - greedy gap/alignment paragraph grouping

mod cluster;
mod types;

// Re-export public API
pub use cluster::cluster;
pub use types::{LineBox, ParagraphSpan};
