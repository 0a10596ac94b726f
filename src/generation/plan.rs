use crate::error::WrapError;
use crate::unit::PackageGraph;

/// One protoc run: every member file of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageJob {
    /// Computed package key
    pub package: String,
    /// Paths of the member files, sorted
    pub files: Vec<String>,
}

/// Jobs in submission order plus the parallelism to run them with.
#[derive(Debug, Clone)]
pub struct GenerationPlan {
    pub jobs: Vec<PackageJob>,
    pub parallelism: usize,
}

impl GenerationPlan {
    /// Plan one job per needed package, in package key order.
    pub fn for_packages<S: AsRef<str>>(
        graph: &PackageGraph,
        needed: &[S],
        parallelism: usize,
    ) -> Result<Self, WrapError> {
        let mut keys: Vec<&str> = needed.iter().map(AsRef::as_ref).collect();
        keys.sort_unstable();
        keys.dedup();

        let jobs = keys
            .into_iter()
            .map(|key| {
                let package = graph
                    .package(key)
                    .ok_or_else(|| WrapError::UnknownPackage(key.to_string()))?;
                Ok(PackageJob {
                    package: key.to_string(),
                    files: graph.source_paths(package),
                })
            })
            .collect::<Result<Vec<_>, WrapError>>()?;

        Ok(Self { jobs, parallelism })
    }

    pub fn validate(&self) -> Result<(), WrapError> {
        if self.parallelism < 1 {
            return Err(WrapError::Config(format!(
                "parallelism cannot be < 1; got {}",
                self.parallelism
            )));
        }
        Ok(())
    }

    /// Number of workers actually started.
    pub fn worker_count(&self) -> usize {
        self.parallelism.min(self.jobs.len())
    }
}
