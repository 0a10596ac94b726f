//! protowrap binary
//!
//! Runs protoc once per output package instead of once per file, after
//! checking that the packages do not import each other in a cycle.

use protowrap::cli::{run_os, Tool};
use std::process;

fn main() {
    process::exit(run_os(Tool::Protowrap, std::env::args_os().skip(1)));
}
