//! Command Line Interface (CLI) layer for ageshift.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`) for the `plan` and `preview`
//! diagnostics. Real aging needs a model runtime; embed the library and
//! implement `ageshift::AgingTransform` for it instead of using the CLI.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
