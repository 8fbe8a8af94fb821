//! `cs create`: study and case generation.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;

use cs_core::config::Settings;
use cs_core::logging::Verbosity;
use cs_core::study::{Study, StudyOptions};

/// Case created when none is named.
const DEFAULT_CASE: &str = "CASE1";

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Study to create (defaults to the current directory name)
    #[arg(short, long, value_name = "STUDY")]
    pub study: Option<String>,

    /// Case to create (repeatable)
    #[arg(short = 'c', long = "case", value_name = "CASE")]
    pub case: Vec<String>,

    /// Cases to create, when no --case is given
    #[arg(value_name = "CASES")]
    pub cases: Vec<String>,

    /// Create the cases from an existing one
    #[arg(long, value_name = "CASE")]
    pub copy_from: Option<PathBuf>,

    /// Do not copy reference files
    #[arg(long)]
    pub noref: bool,

    /// Do not output any information
    #[arg(short, long)]
    pub quiet: bool,

    /// Dump study creation parameters
    #[arg(short, long)]
    pub verbose: bool,

    /// SYRTHES case to create (repeatable)
    #[arg(long = "syrthes", value_name = "SYR_CASE")]
    pub syrthes: Vec<String>,

    /// Cathare case to create
    #[arg(long, value_name = "CAT_CASE")]
    pub cathare: Option<String>,

    /// Python script case to create
    #[arg(long, value_name = "PY_CASE")]
    pub python: Option<String>,
}

impl CreateArgs {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }

    /// Study options for a study created in `work_dir`.
    pub fn options(&self, work_dir: &Path) -> StudyOptions {
        let name = self.study.clone().unwrap_or_else(|| {
            work_dir
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "STUDY".to_string())
        });

        let cases = if !self.case.is_empty() {
            self.case.clone()
        } else if !self.cases.is_empty() {
            self.cases.clone()
        } else {
            vec![DEFAULT_CASE.to_string()]
        };

        StudyOptions {
            name,
            cases,
            syrthes_cases: self.syrthes.clone(),
            cathare_case: self.cathare.clone(),
            python_case: self.python.clone(),
            copy_from: self.copy_from.clone(),
            use_reference: !self.noref,
            verbosity: self.verbosity(),
        }
    }
}

pub fn run(args: CreateArgs, settings: &Settings) -> anyhow::Result<()> {
    let work_dir = std::env::current_dir().context("Cannot determine the current directory")?;
    let options = args.options(&work_dir);
    let verbosity = options.verbosity;

    if verbosity > Verbosity::Quiet {
        println!(
            "{} {} study/case generation",
            settings.package.name, settings.package.version
        );
    }

    let mut study = Study::new(&work_dir, options, settings);
    study
        .create()
        .with_context(|| format!("Failed to create study '{}'", study.name()))?;

    if verbosity == Verbosity::Verbose {
        println!();
        print!("{study}");
        println!();
    }
    Ok(())
}
