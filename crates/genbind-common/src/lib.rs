//! Common types and utilities for genbind.
//!
//! This crate provides foundational types shared by the genbind crates:
//! - String interning (`Atom`, `Interner`)
//! - Engine limits and thresholds

// String interning for type and parameter names
pub mod interner;
pub use interner::{Atom, Interner};

// Centralized limits and thresholds
pub mod limits;
