//! Protowrap: package-at-a-time protoc driver
//!
//! Groups `.proto` files into the Go packages their generated code lands in,
//! refuses to proceed when those packages would import each other in a cycle,
//! and runs protoc once per package on a bounded pool of worker threads.

pub mod cli;
pub mod collect;
pub mod command;
pub mod config;
pub mod cycles;
pub mod discovery;
pub mod error;
pub mod generation;
pub mod logging;
pub mod resolve;
pub mod unit;
pub mod wrapper;
