//! Library components of the `exposure` command-line tool.

pub mod logging;
pub mod pipeline;
