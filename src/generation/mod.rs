//! Package generation: the plan of per-package protoc runs and the bounded
//! worker pool that executes it.

pub mod executor;
pub mod plan;
pub mod protoc;

pub use executor::{execute, PackageGenerator};
pub use plan::{GenerationPlan, PackageJob};
pub use protoc::ProtocGenerator;
