//! esparse_core: Core utilities shared by the esparse crates.
//!
//! Provides source positions and line maps, arena helpers, and the hash
//! collections used throughout the lexer and parser.

pub mod arena;
pub mod collections;
pub mod text;

// Re-export commonly used types
pub use arena::alloc_vec_in;
pub use text::{LineMap, Position, SourceLocation};
