//! `cs run`: preflight a case, store its batch parameters and launch it.

use std::path::PathBuf;

use anyhow::{ensure, Context};
use clap::Args;

use cs_core::batch::{self, BatchJob, Computer, Walltime};
use cs_core::case::Case;
use cs_core::config::Settings;
use cs_core::run_conf::RunConf;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Case directory (containing DATA/setup.xml)
    pub case_dir: PathBuf,

    /// Where to run: station, pbs, lsf or sge
    #[arg(long)]
    pub computer: Option<Computer>,

    /// Number of processes
    #[arg(long, value_name = "N")]
    pub nprocs: Option<u32>,

    /// PBS job name
    #[arg(long, value_name = "NAME")]
    pub job_name: Option<String>,

    /// PBS node count
    #[arg(long, value_name = "N")]
    pub nodes: Option<u32>,

    /// PBS processors per node
    #[arg(long, value_name = "N")]
    pub ppn: Option<u32>,

    /// PBS wall clock limit (h:mm:ss)
    #[arg(long, value_name = "TIME")]
    pub walltime: Option<Walltime>,

    /// Print the command instead of running it
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: RunArgs, settings: &Settings) -> anyhow::Result<()> {
    let data = args.case_dir.join("DATA");
    let setup = data.join("setup.xml");
    let case = Case::load(&setup).with_context(|| format!("Cannot open {}", setup.display()))?;

    for warning in batch::preflight(&case)? {
        eprintln!("Warning: {warning}");
    }

    let run_cfg = data.join("run.cfg");
    let mut conf = RunConf::load_or_default(&run_cfg)?;
    let mut job = BatchJob::from_run_conf(&conf, &data, &settings.package.name)?;
    if let Some(computer) = args.computer {
        job.computer = computer;
    }
    if let Some(n_procs) = args.nprocs {
        ensure!(n_procs >= 1, "The number of processes must be at least 1");
        job.n_procs = n_procs;
    }
    if let Some(name) = &args.job_name {
        ensure!(!name.trim().is_empty(), "The job name cannot be empty");
        job.pbs.job_name = name.trim().to_string();
    }
    if let Some(nodes) = args.nodes {
        ensure!(nodes >= 1, "The number of nodes must be at least 1");
        job.pbs.nodes = nodes;
    }
    if let Some(ppn) = args.ppn {
        ensure!(ppn >= 1, "The number of processors per node must be at least 1");
        job.pbs.ppn = ppn;
    }
    if let Some(walltime) = args.walltime {
        job.pbs.walltime = walltime;
    }
    job.to_run_conf(&mut conf);
    conf.save(&run_cfg)?;

    let submission = batch::submission(&job)?;
    if args.dry_run {
        println!("cd {} && {}", submission.work_dir.display(), submission);
        return Ok(());
    }

    let pid = batch::submit(&job)?;
    println!("Started '{submission}' (pid {pid})");
    Ok(())
}
