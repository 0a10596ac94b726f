//! CLI output: error mapping from domain errors to the message printed on stderr.

use crate::error::WrapError;

/// Map a run error to its stderr line(s).
pub fn map_error(e: &WrapError) -> String {
    match e {
        WrapError::Generation(_) => format!("Error generating protos: {}", e),
        _ => format!("Error: {}", e),
    }
}
