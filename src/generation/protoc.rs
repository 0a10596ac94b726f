//! Package generation by running protoc once per package.

use crate::command::{combined_output, CommandLine};
use crate::error::GenerateError;
use crate::generation::executor::PackageGenerator;
use crate::generation::plan::PackageJob;
use parking_lot::Mutex;
use std::io::{self, Write};
use tracing::debug;

/// Runs `protoc <flags> <files>` for each package, or prints the command
/// lines instead when in print-only mode.
pub struct ProtocGenerator {
    protoc_command: String,
    protoc_flags: Vec<String>,
    print_only: bool,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl ProtocGenerator {
    pub fn new(protoc_command: impl Into<String>, protoc_flags: Vec<String>) -> Self {
        Self {
            protoc_command: protoc_command.into(),
            protoc_flags,
            print_only: false,
            writer: Mutex::new(Box::new(io::stdout())),
        }
    }

    pub fn print_only(mut self, print_only: bool) -> Self {
        self.print_only = print_only;
        self
    }

    /// Destination for print-only command lines. Defaults to stdout.
    pub fn with_writer(mut self, writer: Box<dyn Write + Send>) -> Self {
        self.writer = Mutex::new(writer);
        self
    }

    pub fn command_line(&self, job: &PackageJob) -> CommandLine {
        let mut args = self.protoc_flags.clone();
        args.extend(job.files.iter().cloned());
        CommandLine::new(self.protoc_command.clone(), args)
    }

    fn print(&self, job: &PackageJob, command_line: &CommandLine) -> Result<(), GenerateError> {
        let mut writer = self.writer.lock();
        writeln!(writer, "{}", command_line)
            .and_then(|_| writer.flush())
            .map_err(|err| GenerateError::Failed {
                package: job.package.clone(),
                message: format!("cannot print command line: {}", err),
            })
    }
}

impl PackageGenerator for ProtocGenerator {
    fn generate(&self, job: &PackageJob) -> Result<(), GenerateError> {
        let command_line = self.command_line(job);
        if self.print_only {
            return self.print(job, &command_line);
        }

        debug!(package = %job.package, command = %command_line, "Running protoc");
        let output = command_line
            .to_command()
            .output()
            .map_err(|source| GenerateError::Spawn {
                package: job.package.clone(),
                command: command_line.to_string(),
                source,
            })?;
        if !output.status.success() {
            return Err(GenerateError::ProcessFailed {
                package: job.package.clone(),
                command: command_line.to_string(),
                status: output.status.to_string(),
                output: combined_output(&output),
            });
        }
        Ok(())
    }
}
