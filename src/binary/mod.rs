//! Compiled Model Script Module
//!
//! Decoding and generation of the `.msb` chunk stream. Payload layouts live in `parsing`
//! and `serialization`; `parser` and `generator` walk the stream itself.

pub mod generator;
pub mod parser;
pub mod parsing;
pub mod serialization;


pub use generator::MdsBinaryGenerator;
pub use parser::{parse_chunks, parse_chunks_with_config};

/// Format version written into the root chunk
pub const MSB_VERSION: u32 = 1;
