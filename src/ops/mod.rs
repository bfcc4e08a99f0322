//! High-level operations exposed to the CLI.

pub mod assemble;
pub mod doctor;
