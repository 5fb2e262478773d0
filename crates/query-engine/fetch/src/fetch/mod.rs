//! Fetch query element AST and operations over it.

pub mod ast;
pub mod helpers;
pub mod parse;
pub mod string;
