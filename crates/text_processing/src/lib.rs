//! Text processing for the chat query router
//!
//! This crate provides:
//! - **Context extraction**: location, service type and intent signals from a
//!   chat message, driven by a configurable vocabulary
//! - **Search terms**: the tokeniser shared by the full-text and keyword
//!   search tiers
//!
//! # Example
//!
//! ```ignore
//! use chat_router_text_processing::ContextExtractor;
//!
//! let extractor = ContextExtractor::default();
//! let location = extractor.extract_location("need a plumber in al reem", &[]);
//! assert_eq!(location.as_deref(), Some("al reem"));
//! ```

pub mod context;
pub mod search_terms;

pub use context::{normalize, ContextExtractor};
pub use search_terms::{is_stop_word, search_terms, MIN_TERM_CHARS};
