//! Coupled runs: domain list and the study-level `run.cfg`.

use std::path::Path;

use crate::run_conf::RunConf;

use super::error::{StudyError, StudyResult};
use super::files::make_dir;
use super::Study;

/// Results directory of coupled runs, at the study root.
pub const RESU_COUPLING: &str = "RESU_COUPLING";

/// One `run.cfg` section describing a coupled domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoupledDomain {
    pub name: String,
    /// Keys in write order; `None` is written as the `None` literal.
    pub keys: Vec<(&'static str, Option<String>)>,
}

impl CoupledDomain {
    fn new(solver: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            keys: vec![("solver", Some(solver.to_string())), ("domain", Some(name.to_string()))],
        }
    }

    fn with(mut self, key: &'static str, value: Option<&str>) -> Self {
        self.keys.push((key, value.map(str::to_string)));
        self
    }
}

fn base_name(name: &str) -> String {
    Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string())
}

/// Coupled domains of a study, solver cases first.
pub fn coupled_domains(study: &Study) -> Vec<CoupledDomain> {
    let options = &study.options;
    let mut domains = Vec::new();

    for case in &options.cases {
        domains.push(
            CoupledDomain::new(&study.package.code_name, &base_name(case))
                .with("n_procs_weight", None),
        );
    }
    for case in &options.syrthes_cases {
        domains.push(
            CoupledDomain::new("SYRTHES", &base_name(case))
                .with("param", Some("syrthes_data.syd"))
                .with("n_procs_weight", None)
                .with("opt", Some("")),
        );
    }
    if let Some(case) = &options.cathare_case {
        domains.push(
            CoupledDomain::new("CATHARE", &base_name(case))
                .with("cathare_case_file", Some("jdd_case.dat"))
                .with("neptune_cfd_domain", Some("NEPTUNE")),
        );
    }
    if let Some(case) = &options.python_case {
        domains.push(
            CoupledDomain::new("PYTHON_CODE", &base_name(case))
                .with("script", Some("pycode.py"))
                .with("command_line", Some(""))
                .with("n_procs_weight", None)
                .with("n_procs_max", None),
        );
    }
    domains
}

/// Library path setup needed to load the Cathare solver.
pub fn cathare_prologue(cathare: &Path) -> String {
    format!(
        "export v25_3={}\n\
         export LD_PATH_LIBRARY=$v25_3/lib/:$LD_LIBRARY_PATH\n\
         export LD_PATH_LIBRARY=$v25_3/ICoCo/lib/:$LD_LIBRARY_PATH",
        cathare.display()
    )
}

/// Create `RESU_COUPLING` and the study `run.cfg`.
pub(super) fn create_coupling(study: &Study) -> StudyResult<()> {
    tracing::info!("Creating coupling features...");
    let root = study.root();
    make_dir(&root.join(RESU_COUPLING))?;

    let run_cfg = root.join("run.cfg");
    if let Some(copy) = &study.options.copy_from {
        let source = copy.join("DATA").join("run.cfg");
        if source.is_file() {
            std::fs::copy(&source, &run_cfg).map_err(|e| {
                StudyError::io(format!("copying {}", source.display()), e)
            })?;
        }
    }
    let mut conf = RunConf::load_or_default(&run_cfg)?;

    if study.options.cathare_case.is_some() {
        if let Some(cathare) = study.install.cathare() {
            conf.set(
                &study.install.resource_name(),
                "compute_prologue",
                cathare_prologue(&cathare),
            );
        }
    }

    let domains = coupled_domains(study);
    for domain in &domains {
        for (key, value) in &domain.keys {
            conf.set_opt(&domain.name, key, value.as_deref());
        }
    }
    let names: Vec<&str> = domains.iter().map(|d| d.name.as_str()).collect();
    conf.set("setup", "coupled_domains", names.join(":"));

    conf.save(&run_cfg)?;
    tracing::debug!("Coupled domains: {}", names.join(", "));
    Ok(())
}
