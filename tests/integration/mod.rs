//! Integration test suite.
//!
//! Drives the toolkit end-to-end: the CLI binary via `assert_cmd`, the
//! subprocess engine driver against scripted stub engines, and the batch
//! processor over fixture corpora on disk.

mod common;

mod batch;
mod cli_schema;
mod engine;
