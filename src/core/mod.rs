//! Core types & traits: domain-agnostic contracts for tools and responses.

pub mod content;
pub mod error;
pub mod tool;
