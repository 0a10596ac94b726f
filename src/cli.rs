//! CLI domain: argument splitting, flag parsing, routing, help and output.
//! The pipeline itself lives in [`crate::wrapper`].

mod args;
mod help;
mod output;
mod parse;
mod route;

pub use args::{split_args, utf8_args, Invocation, SplitArgs, Tool};
pub use help::usage;
pub use output::map_error;
pub use parse::WrapperFlags;
pub use route::{run, run_os, RunContext};
