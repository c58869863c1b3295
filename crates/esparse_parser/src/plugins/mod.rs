//! Built-in syntax extensions that install hooks.
//!
//! The proposal gates (`decorators`, `classProperties`, ...) need no hooks;
//! the grammar checks them with [`Parser::expect_plugin`].
//!
//! [`Parser::expect_plugin`]: crate::Parser::expect_plugin

pub mod flow;
pub mod jsx;
