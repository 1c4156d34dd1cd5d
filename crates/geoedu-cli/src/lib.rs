//! Library components of the `geoedu` command-line tool.

pub mod logging;
pub mod pipeline;
pub mod types;
