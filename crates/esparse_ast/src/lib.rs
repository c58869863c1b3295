//! esparse_ast: Syntax tree and token definitions for the esparse parser.
//!
//! Defines the token types and their grammar metadata, the recorded token
//! stream, and the arena-allocated AST whose JSON form follows the Babylon
//! node shapes.

pub mod node;
pub mod token;
pub mod token_type;
pub mod visitor;

// Re-export key types
pub use node::*;
pub use token::{Token, TokenValue};
pub use token_type::{TokenFlags, TokenType};
