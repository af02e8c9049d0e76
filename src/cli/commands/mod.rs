//! CLI command implementations

pub mod retrieve;
pub mod send;
pub mod validate;
