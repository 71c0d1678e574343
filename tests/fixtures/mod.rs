//! Test fixtures and data generators
//!
//! This module contains builders and generators for creating model script test data.

pub mod builders;

#[allow(unused_imports)]
pub use builders::*;
