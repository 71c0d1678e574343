//! Model Script Source Module
//!
//! Tokenizer, parser and generator for the human-authored `.mds` representation.

pub mod generator;
pub mod lexer;
pub mod parser;


pub use generator::MdsSourceGenerator;
pub use parser::{parse_source, parse_source_with_config};
