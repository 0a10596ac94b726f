//! Generation executor: runs a plan on a fixed pool of worker threads.
//!
//! Jobs are handed over a rendezvous channel in plan order. The submitting
//! side races each hand-over against the error channel and stops submitting
//! at the first error; work already handed to a worker always runs to
//! completion. Only the first error is returned.

use crate::error::{GenerateError, WrapError};
use crate::generation::plan::{GenerationPlan, PackageJob};
use crossbeam_channel::{bounded, select, Receiver, Sender, TrySendError};
use std::thread;
use tracing::{debug, info, warn};

/// Generates the output for one package. Called concurrently from the
/// worker threads.
pub trait PackageGenerator: Sync {
    fn generate(&self, job: &PackageJob) -> Result<(), GenerateError>;
}

/// Run every job of `plan`, at most `plan.parallelism` at a time.
pub fn execute<G>(plan: &GenerationPlan, generator: &G) -> Result<(), WrapError>
where
    G: PackageGenerator + ?Sized,
{
    plan.validate()?;
    let workers = plan.worker_count();
    if workers == 0 {
        debug!("No packages to generate");
        return Ok(());
    }

    let (job_tx, job_rx) = bounded::<&PackageJob>(0);
    let (error_tx, error_rx) = bounded::<GenerateError>(workers);

    let submit_error = thread::scope(|scope| {
        for worker_id in 0..workers {
            let jobs = job_rx.clone();
            let errors = error_tx.clone();
            scope.spawn(move || worker_loop(worker_id, generator, jobs, errors));
        }
        drop(job_rx);
        drop(error_tx);
        submit(&plan.jobs, job_tx, &error_rx)
    });

    // Every worker has exited; a failure of the last jobs handed out is
    // still waiting in the channel.
    let first = submit_error.or_else(|| error_rx.try_recv().ok());
    for late in error_rx.try_iter() {
        debug!(
            package = %late.package(),
            error = %late,
            "Discarding error from in-flight package"
        );
    }

    match first {
        Some(err) => {
            warn!(package = %err.package(), "Generation stopped at first failure");
            Err(err.into())
        }
        None => {
            info!(packages = plan.jobs.len(), "Generated all packages");
            Ok(())
        }
    }
}

/// Hand out jobs until they run out or a worker reports an error.
fn submit<'p>(
    jobs: &'p [PackageJob],
    job_tx: Sender<&'p PackageJob>,
    error_rx: &Receiver<GenerateError>,
) -> Option<GenerateError> {
    for job in jobs {
        if let Ok(err) = error_rx.try_recv() {
            return Some(err);
        }
        select! {
            send(job_tx, job) -> sent => {
                if sent.is_err() {
                    warn!("All generation workers exited before the plan was submitted");
                    return None;
                }
            }
            recv(error_rx) -> received => return received.ok(),
        }
    }
    None
}

fn worker_loop<G>(
    worker_id: usize,
    generator: &G,
    jobs: Receiver<&PackageJob>,
    errors: Sender<GenerateError>,
) where
    G: PackageGenerator + ?Sized,
{
    debug!(worker_id, "Generation worker started");
    for job in jobs.iter() {
        info!(worker_id, package = %job.package, "Generating package {}", job.package);
        if let Err(err) = generator.generate(job) {
            debug!(worker_id, package = %job.package, error = %err, "Package generation failed");
            if let Err(TrySendError::Full(err)) = errors.try_send(err) {
                debug!(package = %err.package(), "Error channel full; dropping error");
            }
        }
    }
    debug!(worker_id, "Generation worker stopped");
}
