//! cyclecheck binary
//!
//! Reports `.proto` imports that would make generated packages import each
//! other in a cycle. Exits 2 when a cycle is found.

use protowrap::cli::{run_os, Tool};
use std::process;

fn main() {
    process::exit(run_os(Tool::Cyclecheck, std::env::args_os().skip(1)));
}
