//! Batch job parameters and their `run.cfg` representation.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::models::xml_enum;
use crate::run_conf::RunConf;

use super::error::{BatchError, BatchResult};

xml_enum! {
    /// Where the computation runs.
    #[derive(Default)]
    Computer, "computer" {
        /// Local workstation, detached with `nohup`.
        #[default]
        Station => "station",
        Pbs => "pbs",
        Lsf => "lsf",
        Sge => "sge",
    }
}

/// Wall clock limit, written `h:mm:ss`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Walltime {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl Default for Walltime {
    fn default() -> Self {
        Self {
            hours: 1,
            minutes: 0,
            seconds: 0,
        }
    }
}

impl FromStr for Walltime {
    type Err = BatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BatchError::invalid("walltime", s);
        let parts: Vec<u32> = s
            .trim()
            .split(':')
            .map(|part| part.trim().parse().map_err(|_| invalid()))
            .collect::<Result<_, _>>()?;
        let [hours, minutes, seconds] = parts[..] else {
            return Err(invalid());
        };
        if minutes > 59 || seconds > 59 {
            return Err(invalid());
        }
        Ok(Self {
            hours,
            minutes,
            seconds,
        })
    }
}

impl fmt::Display for Walltime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

/// PBS resource request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PbsCard {
    pub job_name: String,
    pub nodes: u32,
    /// Processors per node.
    pub ppn: u32,
    pub walltime: Walltime,
}

impl Default for PbsCard {
    fn default() -> Self {
        Self {
            job_name: "job".to_string(),
            nodes: 1,
            ppn: 1,
            walltime: Walltime::default(),
        }
    }
}

impl PbsCard {
    /// `qsub` options requesting these resources.
    pub fn qsub_args(&self) -> Vec<String> {
        vec![
            "-N".to_string(),
            self.job_name.clone(),
            "-l".to_string(),
            format!(
                "nodes={}:ppn={},walltime={}",
                self.nodes, self.ppn, self.walltime
            ),
        ]
    }
}

/// A case run request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    pub computer: Computer,
    /// Launcher script to run or submit, inside the case `DATA` directory.
    pub script: PathBuf,
    pub n_procs: u32,
    pub pbs: PbsCard,
}

/// Script named in `run.cfg`, located in `data_dir` unless absolute.
fn resolve_script(data_dir: &Path, stored: &str) -> PathBuf {
    let stored = Path::new(stored.trim());
    if stored.is_absolute() {
        return stored.to_path_buf();
    }
    match stored.file_name() {
        Some(name) => data_dir.join(name),
        None => data_dir.join(stored),
    }
}

fn parse_count(what: &'static str, value: &str) -> BatchResult<u32> {
    match value.trim().parse::<u32>() {
        Ok(count) if count >= 1 => Ok(count),
        _ => Err(BatchError::invalid(what, value)),
    }
}

impl BatchJob {
    pub fn new(script: impl Into<PathBuf>) -> Self {
        Self {
            computer: Computer::default(),
            script: script.into(),
            n_procs: 1,
            pbs: PbsCard::default(),
        }
    }

    /// Read job parameters from the `run.cfg` of the case whose `DATA`
    /// directory is `data_dir`; missing keys keep defaults.
    ///
    /// The script is resolved against `data_dir`, so the same file works
    /// whatever directory the tool runs from.
    pub fn from_run_conf(
        conf: &RunConf,
        data_dir: &Path,
        default_script: &str,
    ) -> BatchResult<Self> {
        let mut job = Self::new(resolve_script(data_dir, default_script));

        if let Some(value) = conf.get("batch", "computer") {
            job.computer = value
                .parse()
                .map_err(|_| BatchError::invalid("computer", value))?;
        }
        if let Some(value) = conf.get("batch", "script") {
            job.script = resolve_script(data_dir, value);
        }
        if let Some(value) = conf.get("run", "n_procs") {
            job.n_procs = parse_count("n_procs", value)?;
        }
        if let Some(value) = conf.get("pbs", "job_name") {
            job.pbs.job_name = value.to_string();
        }
        if let Some(value) = conf.get("pbs", "nodes") {
            job.pbs.nodes = parse_count("nodes", value)?;
        }
        if let Some(value) = conf.get("pbs", "ppn") {
            job.pbs.ppn = parse_count("ppn", value)?;
        }
        if let Some(value) = conf.get("pbs", "walltime") {
            job.pbs.walltime = value.parse()?;
        }

        Ok(job)
    }

    /// Store job parameters. The script is stored by file name, relative
    /// to `DATA`. PBS settings are only written for PBS jobs.
    pub fn to_run_conf(&self, conf: &mut RunConf) {
        let script = match self.script.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => self.script.display().to_string(),
        };
        conf.set("run", "n_procs", self.n_procs.to_string());
        conf.set("batch", "computer", self.computer.as_str());
        conf.set("batch", "script", script);
        if self.computer == Computer::Pbs {
            conf.set("pbs", "job_name", self.pbs.job_name.as_str());
            conf.set("pbs", "nodes", self.pbs.nodes.to_string());
            conf.set("pbs", "ppn", self.pbs.ppn.to_string());
            conf.set("pbs", "walltime", self.pbs.walltime.to_string());
        }
    }
}
