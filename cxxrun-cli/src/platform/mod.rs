//! Terminal-facing presentation.

mod cli;

pub use cli::{print_failure, write_failure, ErrorStyle};
