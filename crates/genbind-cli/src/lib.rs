//! Command-line support for the `genbind` binary.
//!
//! Loads a JSON type catalog, parses type arguments written in a small
//! surface syntax, and runs inference or constraint checks against it.

pub mod args;
pub mod catalog_file;
pub mod driver;
pub mod tracing_config;
pub mod type_syntax;

// Shared JSON catalog for the tests below.
#[cfg(test)]
#[path = "tests/fixture.rs"]
mod fixture;

#[cfg(test)]
#[path = "tests/args_tests.rs"]
mod args_tests;
#[cfg(test)]
#[path = "tests/catalog_file_tests.rs"]
mod catalog_file_tests;
#[cfg(test)]
#[path = "tests/driver_tests.rs"]
mod driver_tests;
#[cfg(test)]
#[path = "tests/type_syntax_tests.rs"]
mod type_syntax_tests;
