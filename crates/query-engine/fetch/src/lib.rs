//! Fetch query documents: an element AST, a parser, a renderer, and rewrite helpers.

pub mod fetch;
