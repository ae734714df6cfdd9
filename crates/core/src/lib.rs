//! Domain types and pure logic shared by the generation client and the
//! binary: request parameters, prompt templates, generation defaults and
//! the free-tier usage gate.
//!
//! Nothing in this crate performs I/O.

pub mod error;
pub mod generation;
pub mod prompt;
pub mod request;
pub mod types;
pub mod usage;
