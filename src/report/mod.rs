//! Table and summary output.

pub mod generator;

pub use generator::*;
