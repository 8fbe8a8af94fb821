//! Running a case locally or through a batch system.
//!
//! [`preflight`] checks that a case can run, [`submission`] builds the
//! command for the selected [`Computer`], and [`submit`] spawns it without
//! waiting for completion.

mod error;
mod job;

pub use error::{BatchError, BatchResult};
pub use job::{BatchJob, Computer, PbsCard, Walltime};

use std::fmt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::case::Case;
use crate::models::zone_count;

/// Log file written next to the script for local runs.
pub const STATION_LOG: &str = "batch.log";

/// Check that a case is ready to run.
///
/// Returns non-fatal warnings.
pub fn preflight(case: &Case) -> BatchResult<Vec<String>> {
    if case.is_new() || case.is_modified() {
        return Err(BatchError::NotSaved);
    }
    if case.meshes().is_empty() {
        return Err(BatchError::NoMesh);
    }

    let mut warnings = Vec::new();
    if zone_count(case) == 0 {
        warnings.push("No boundary definition declared.".to_string());
    }
    for warning in &warnings {
        tracing::warn!("{}", warning);
    }
    Ok(warnings)
}

/// A command ready to spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub program: String,
    pub args: Vec<String>,
    /// Directory the command runs in (the script directory).
    pub work_dir: PathBuf,
    /// File receiving stdout and stderr, if redirected.
    pub log: Option<PathBuf>,
}

impl fmt::Display for Submission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        if let Some(log) = &self.log {
            let name = log.file_name().unwrap_or(log.as_os_str());
            write!(f, " > {} 2>&1", name.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Build the command line for a job.
pub fn submission(job: &BatchJob) -> BatchResult<Submission> {
    let script = &job.script;
    let Some(file_name) = script.file_name().map(|name| name.to_string_lossy().into_owned()) else {
        return Err(BatchError::invalid("script", script.display().to_string()));
    };
    let work_dir = match script.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let (program, args, log) = match job.computer {
        Computer::Station => (
            "nice",
            vec!["nohup".to_string(), format!("./{file_name}")],
            Some(work_dir.join(STATION_LOG)),
        ),
        Computer::Pbs => {
            let mut args = job.pbs.qsub_args();
            args.push(file_name);
            ("qsub", args, None)
        }
        Computer::Lsf => ("bsub", vec![script.display().to_string(), file_name], None),
        Computer::Sge => return Err(BatchError::Unsupported(job.computer)),
    };

    Ok(Submission {
        program: program.to_string(),
        args,
        work_dir,
        log,
    })
}

/// Spawn the job's command and return the child process id.
pub fn submit(job: &BatchJob) -> BatchResult<u32> {
    let submission = submission(job)?;

    let mut command = Command::new(&submission.program);
    command
        .args(&submission.args)
        .current_dir(&submission.work_dir)
        .stdin(Stdio::null());

    if let Some(log) = &submission.log {
        rotate_log(log)?;
        let io_error = |source| BatchError::Io {
            path: log.clone(),
            source,
        };
        let stdout = File::create(log).map_err(io_error)?;
        let stderr = stdout.try_clone().map_err(io_error)?;
        command.stdout(stdout).stderr(stderr);
    }

    let child = command.spawn().map_err(|source| BatchError::Spawn {
        command: submission.to_string(),
        source,
    })?;
    tracing::info!(
        "Started '{}' in {} (pid {})",
        submission,
        submission.work_dir.display(),
        child.id()
    );
    Ok(child.id())
}

/// Move an existing log to `<log>~`.
fn rotate_log(log: &Path) -> BatchResult<()> {
    if !log.exists() {
        return Ok(());
    }
    let mut backup = log.as_os_str().to_owned();
    backup.push("~");
    fs::rename(log, &backup).map_err(|source| BatchError::Io {
        path: log.to_path_buf(),
        source,
    })?;
    tracing::debug!("Rotated {}", log.display());
    Ok(())
}
