//! Core data model for the orchestration engine.

pub mod build_env;
pub mod compiler;
pub mod package_manager;
pub mod platform;
pub mod toolchain;
