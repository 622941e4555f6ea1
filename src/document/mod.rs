//! Document model and assembly
//!
//! Provides the typed content model and the streaming writer that
//! turns recognized page content into a reflowable HTML document:
//!
//! - **Blocks** ([`ContentBlock`], [`BlockFactory`]) - typed text/formula content
//! - **Validation** ([`validate`]) - placeholder fallback policy
//! - **Rendering** ([`HtmlRenderer`]) - pure HTML fragment rendering
//! - **Assembly** ([`DocumentAssembler`]) - streaming/batch output lifecycle

mod assembler;
mod block_factory;
mod render;
mod types;

pub mod validate;

// Re-export public API
pub use assembler::{AssemblyMode, DocumentAssembler};
pub use block_factory::{BlockFactory, FORMULA_CONFIDENCE_MIN, TEXT_CONFIDENCE_MIN};
pub use render::{escape_html, HtmlRenderer};
pub use types::{ContentBlock, DocumentError, FormulaBlock, Page, Result, TextBlock};
