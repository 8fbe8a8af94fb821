//! Study and case directory scaffolding.
//!
//! A study is a directory holding one or more cases plus shared `MESH` and
//! `POST` directories. Each case gets `DATA` (case file, `run.cfg`, local
//! launcher, reference data), `SRC` (user source templates) and `RESU`.
//! When several codes are coupled, the study root also gets
//! `RESU_COUPLING`, a `run.cfg` listing the coupled domains and a launcher.
//!
//! # Example
//!
//! ```no_run
//! use cs_core::config::Settings;
//! use cs_core::study::{Study, StudyOptions};
//!
//! let mut options = StudyOptions::new("PIPE");
//! options.cases = vec!["CASE1".to_string()];
//!
//! let mut study = Study::new(std::path::Path::new("."), options, &Settings::default());
//! study.create().unwrap();
//! println!("{study}");
//! ```

mod coupling;
mod error;
mod files;
pub mod launcher;

pub use coupling::{cathare_prologue, coupled_domains, CoupledDomain, RESU_COUPLING};
pub use error::{StudyError, StudyResult};

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::case::Case;
use crate::config::{InstallSettings, PackageSettings, Settings};
use crate::logging::Verbosity;
use crate::run_conf::RunConf;

use files::{copy_file, copy_regular_files, copy_tree, ensure_dir, make_dir};

/// Thermochemistry samples copied into `DATA/REFERENCE` when available.
pub const THERMOCHEMISTRY_SAMPLES: [&str; 7] = [
    "dp_C3P",
    "dp_C3PSJ",
    "dp_C4P",
    "dp_ELE",
    "dp_FUE",
    "dp_transformers",
    "meteo",
];

/// What to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyOptions {
    pub name: String,
    /// Solver cases, created in order.
    pub cases: Vec<String>,
    pub syrthes_cases: Vec<String>,
    pub cathare_case: Option<String>,
    pub python_case: Option<String>,
    /// Existing case whose `DATA` and `SRC` files are copied.
    pub copy_from: Option<PathBuf>,
    /// Copy reference data and user source templates.
    pub use_reference: bool,
    pub verbosity: Verbosity,
}

impl StudyOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cases: Vec::new(),
            syrthes_cases: Vec::new(),
            cathare_case: None,
            python_case: None,
            copy_from: None,
            use_reference: true,
            verbosity: Verbosity::default(),
        }
    }
}

/// A study being scaffolded.
#[derive(Debug, Clone)]
pub struct Study {
    root: PathBuf,
    creates_root: bool,
    options: StudyOptions,
    package: PackageSettings,
    install: InstallSettings,
}

impl Study {
    /// Plan a study in `work_dir`. Nothing is written yet.
    ///
    /// When `work_dir` is already named after the study, it is the study
    /// root; otherwise the root is `work_dir/<name>`.
    pub fn new(work_dir: &Path, mut options: StudyOptions, settings: &Settings) -> Self {
        let creates_root = work_dir.file_name() != Some(OsStr::new(&options.name));
        let root = if creates_root {
            work_dir.join(&options.name)
        } else {
            work_dir.to_path_buf()
        };
        if let Some(copy) = options.copy_from.take() {
            options.copy_from = Some(if copy.is_relative() {
                work_dir.join(copy)
            } else {
                copy
            });
        }

        Self {
            root,
            creates_root,
            options,
            package: settings.package.clone(),
            install: settings.install.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn name(&self) -> &str {
        &self.options.name
    }

    pub fn options(&self) -> &StudyOptions {
        &self.options
    }

    /// Whether reference files are copied. May be turned off by
    /// [`create_case`](Self::create_case) when the copy source has none.
    pub fn uses_reference(&self) -> bool {
        self.options.use_reference
    }

    /// Coupling is set up for several solver or SYRTHES cases, or any
    /// Cathare or Python case.
    pub fn needs_coupling(&self) -> bool {
        self.options.cases.len() + self.options.syrthes_cases.len() > 1
            || self.options.cathare_case.is_some()
            || self.options.python_case.is_some()
    }

    /// Create every directory and file of the study.
    pub fn create(&mut self) -> StudyResult<()> {
        if self.creates_root {
            tracing::info!("Creating study '{}'...", self.options.name);
            make_dir(&self.root)?;
            make_dir(&self.root.join("MESH"))?;
            make_dir(&self.root.join("POST"))?;
        }

        for case in self.options.cases.clone() {
            self.create_case(&case)?;
        }

        if !self.options.syrthes_cases.is_empty() {
            self.create_syrthes_cases()?;
        }

        if let Some(case) = self.options.cathare_case.clone() {
            if self.install.cathare().is_none() {
                return Err(StudyError::Installation(
                    "Cannot locate Cathare installation.".to_string(),
                ));
            }
            self.create_case(&case)?;
        }

        if let Some(case) = self.options.python_case.clone() {
            self.create_python_case(&case)?;
        }

        if self.needs_coupling() {
            coupling::create_coupling(self)?;
            launcher::write_launcher(&self.root, &self.package)?;
        }

        Ok(())
    }

    /// Create one solver case under the study root.
    pub fn create_case(&mut self, name: &str) -> StudyResult<PathBuf> {
        tracing::info!("Creating case '{}'...", name);
        let case_dir = self.root.join(name);
        make_dir(&case_dir)?;

        if let Some(copy) = &self.options.copy_from {
            let has_reference =
                copy.join("DATA").join("REFERENCE").exists() || copy.join("SRC").join("REFERENCE").exists();
            if !has_reference {
                self.options.use_reference = false;
            }
        }
        let copy_from = self.options.copy_from.clone();

        let data_dir = self.package.data_dir();
        let references = match (&data_dir, self.options.use_reference) {
            (Some(dir), true) => Some(dir.clone()),
            (None, true) => {
                tracing::warn!("Package data directory is not configured; reference files are not copied");
                None
            }
            (_, false) => None,
        };

        let data = case_dir.join("DATA");
        make_dir(&data)?;
        if copy_from.is_none() {
            self.write_setup(&data, name, data_dir.as_deref())?;
        }
        if let Some(dir) = &references {
            copy_data_references(dir, &data.join("REFERENCE"))?;
        }

        launcher::write_launcher(&data, &self.package)?;

        let run_cfg = data.join("run.cfg");
        let mut run_conf = copy_from.is_none().then(|| RunConf::case_default("setup.xml"));

        let src = case_dir.join("SRC");
        make_dir(&src)?;
        if let Some(dir) = &references {
            self.copy_user_sources(dir, &src)?;
        }

        if let Some(copy) = &copy_from {
            let skip = [self.package.gui_name.as_str(), self.package.name.as_str()];
            let copied = copy_regular_files(&copy.join("DATA"), &data, &skip)?;
            let copy_src = copy.join("SRC");
            if copy_src.exists() {
                copy_regular_files(&copy_src, &src, &[])?;
            }
            tracing::debug!("Copied {} data file(s) from {}", copied, copy.display());

            if !run_cfg.is_file() {
                run_conf = Some(RunConf::case_default("setup.xml"));
            }
        }

        if let Some(conf) = run_conf {
            conf.save(&run_cfg)?;
        }

        ensure_dir(&case_dir.join("RESU"))?;
        Ok(case_dir)
    }

    fn write_setup(&self, data: &Path, case_name: &str, data_dir: Option<&Path>) -> StudyResult<()> {
        let target = data.join("setup.xml");
        let template = data_dir
            .map(|dir| dir.join("data").join("setup.xml"))
            .filter(|path| path.is_file());

        match template {
            Some(template) => copy_file(&template, &target),
            None => {
                let mut case = Case::new();
                case.set_study_name(&self.options.name);
                case.set_case_name(case_name);
                case.save_as(target)?;
                Ok(())
            }
        }
    }

    fn copy_user_sources(&self, data_dir: &Path, src: &Path) -> StudyResult<()> {
        let reference = src.join("REFERENCE");
        let examples = src.join("EXAMPLES");
        copy_tree(&data_dir.join("user"), &reference)?;
        copy_tree(&data_dir.join("user_examples"), &examples)?;

        let neptune = self
            .package
            .shared_data_dir()
            .map(|dir| dir.join("neptune_cfd"))
            .filter(|dir| dir.is_dir());
        if let Some(neptune) = neptune {
            for (from, to) in [("user", &reference), ("user_examples", &examples)] {
                let from = neptune.join(from);
                if from.is_dir() {
                    copy_regular_files(&from, to, &[])?;
                }
            }
        }
        Ok(())
    }

    fn create_syrthes_cases(&self) -> StudyResult<()> {
        let Some(syrthes) = self.install.syrthes() else {
            return Err(StudyError::Installation(
                "Cannot locate SYRTHES installation.".to_string(),
            ));
        };
        let tool = syrthes.join("bin").join("syrthes_create_case");

        for name in &self.options.syrthes_cases {
            tracing::info!("Creating SYRTHES case '{}'...", name);
            tracing::debug!("Running: {} {}", tool.display(), name);
            let output = Command::new(&tool)
                .arg(name)
                .current_dir(&self.root)
                .output()
                .map_err(|e| StudyError::io(format!("executing {}", tool.display()), e))?;

            if !output.status.success() {
                return Err(StudyError::ExternalTool {
                    tool: tool.display().to_string(),
                    exit_code: output.status.code().unwrap_or(-1),
                    message: format!(
                        "Cannot create SYRTHES case '{}': {}",
                        name,
                        String::from_utf8_lossy(&output.stderr).trim()
                    ),
                });
            }
        }
        Ok(())
    }

    fn create_python_case(&self, name: &str) -> StudyResult<()> {
        tracing::info!("Creating Python code case '{}'...", name);
        let case_dir = self.root.join(name);
        for sub in ["DATA", "SRC", "RESU"] {
            ensure_dir(&case_dir.join(sub))?;
        }
        Ok(())
    }
}

fn copy_data_references(data_dir: &Path, reference: &Path) -> StudyResult<()> {
    make_dir(reference)?;
    let samples = data_dir.join("data").join("thch");
    for sample in THERMOCHEMISTRY_SAMPLES {
        let path = samples.join(sample);
        if path.is_file() {
            copy_file(&path, &reference.join(sample))?;
        }
    }

    let scripts = data_dir.join("cs_user_scripts.py");
    if !scripts.is_file() {
        return Err(StudyError::MissingTemplate(scripts));
    }
    copy_file(&scripts, &reference.join("cs_user_scripts.py"))
}

impl fmt::Display for Study {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let options = &self.options;
        writeln!(f, "Name  of the study: {}", options.name)?;
        writeln!(f, "Names of the cases: {}", options.cases.join(", "))?;
        if let Some(copy) = &options.copy_from {
            writeln!(f, "Copy from case: {}", copy.display())?;
        }
        writeln!(f, "Copy references: {}", options.use_reference)?;
        if options.cases.len() > 1 {
            writeln!(f, "Number of instances: {}", options.cases.len())?;
        }
        if !options.syrthes_cases.is_empty() {
            writeln!(f, "SYRTHES instances:")?;
            for case in &options.syrthes_cases {
                writeln!(f, "  {case}")?;
            }
        }
        if let Some(case) = &options.python_case {
            writeln!(f, "Python script instances:")?;
            writeln!(f, "  {case}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::init_test_tracing;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    /// Minimal installed package data tree.
    fn package_data() -> TempDir {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("data").join("thch")).unwrap();
        fs::write(root.join("data").join("thch").join("dp_FUE"), "fuel").unwrap();
        fs::write(root.join("cs_user_scripts.py"), "# user scripts").unwrap();
        fs::create_dir_all(root.join("user")).unwrap();
        fs::write(root.join("user").join("cs_user_boundary_conditions.c"), "").unwrap();
        fs::create_dir_all(root.join("user_examples")).unwrap();
        fs::write(root.join("user_examples").join("cs_user_example.c"), "").unwrap();
        dir
    }

    fn settings_with(data: &Path) -> Settings {
        let mut settings = Settings::default();
        settings.package.data_dir = data.display().to_string();
        settings
    }

    #[test]
    fn study_with_one_case() {
        init_test_tracing();
        let data = package_data();
        let work = tempdir().unwrap();

        let mut options = StudyOptions::new("PIPE");
        options.cases = vec!["CASE1".to_string()];
        let mut study = Study::new(work.path(), options, &settings_with(data.path()));
        study.create().unwrap();

        let root = work.path().join("PIPE");
        assert_eq!(study.root(), root);
        for dir in ["MESH", "POST", "CASE1/DATA", "CASE1/SRC", "CASE1/RESU"] {
            assert!(root.join(dir).is_dir(), "{dir} missing");
        }
        let case_data = root.join("CASE1").join("DATA");
        assert!(case_data.join("REFERENCE").join("dp_FUE").is_file());
        assert!(case_data.join("REFERENCE").join("cs_user_scripts.py").is_file());
        assert!(!case_data.join("REFERENCE").join("meteo").exists());
        assert!(root.join("CASE1/SRC/REFERENCE/cs_user_boundary_conditions.c").is_file());
        assert!(root.join("CASE1/SRC/EXAMPLES/cs_user_example.c").is_file());
        assert!(case_data.join("code_saturne").is_file());

        let case = Case::load(case_data.join("setup.xml")).unwrap();
        assert_eq!(case.study_name(), "PIPE");
        assert_eq!(case.case_name(), "CASE1");

        let conf = RunConf::load(case_data.join("run.cfg")).unwrap();
        assert_eq!(conf.get("setup", "param"), Some("setup.xml"));
        assert_eq!(conf.get("run", "n_procs"), Some("1"));

        assert!(!root.join(RESU_COUPLING).exists());
        assert!(!root.join("code_saturne").exists());
    }

    #[test]
    fn work_dir_named_after_study_is_root() {
        let work = tempdir().unwrap();
        let study_dir = work.path().join("PIPE");
        fs::create_dir(&study_dir).unwrap();

        let mut options = StudyOptions::new("PIPE");
        options.cases = vec!["CASE1".to_string()];
        options.use_reference = false;
        let mut study = Study::new(&study_dir, options, &Settings::default());
        study.create().unwrap();

        assert!(study_dir.join("CASE1").join("DATA").is_dir());
        assert!(!study_dir.join("MESH").exists());
    }

    #[test]
    fn existing_case_is_fatal() {
        let work = tempdir().unwrap();
        let mut options = StudyOptions::new("S");
        options.use_reference = false;
        let mut study = Study::new(work.path(), options, &Settings::default());
        study.create().unwrap();

        study.create_case("CASE1").unwrap();
        assert!(matches!(
            study.create_case("CASE1"),
            Err(StudyError::AlreadyExists(_))
        ));
    }

    #[test]
    fn missing_user_sources_are_fatal() {
        let data = package_data();
        fs::remove_dir_all(data.path().join("user_examples")).unwrap();
        let work = tempdir().unwrap();

        let mut options = StudyOptions::new("S");
        options.cases = vec!["CASE1".to_string()];
        let mut study = Study::new(work.path(), options, &settings_with(data.path()));
        assert!(matches!(study.create(), Err(StudyError::MissingTemplate(_))));
    }

    #[test]
    fn template_setup_is_copied() {
        let data = package_data();
        fs::write(
            data.path().join("data").join("setup.xml"),
            "<Code_Saturne_GUI study=\"T\" case=\"T\" version=\"2.0\"/>",
        )
        .unwrap();
        let work = tempdir().unwrap();

        let mut options = StudyOptions::new("S");
        options.use_reference = false;
        let mut study = Study::new(work.path(), options, &settings_with(data.path()));
        study.create().unwrap();
        let case_dir = study.create_case("C").unwrap();

        let case = Case::load(case_dir.join("DATA").join("setup.xml")).unwrap();
        assert_eq!(case.study_name(), "T");
    }

    #[test]
    fn copy_from_existing_case() {
        let data = package_data();
        let work = tempdir().unwrap();
        let settings = settings_with(data.path());

        let mut options = StudyOptions::new("S");
        options.cases = vec!["CASE1".to_string()];
        let mut first = Study::new(work.path(), options, &settings);
        first.create().unwrap();
        let source = work.path().join("S").join("CASE1");
        fs::write(source.join("SRC").join("cs_user_physical_properties.c"), "/* */").unwrap();
        fs::write(source.join("DATA").join("SaturneGUI"), "gui").unwrap();
        fs::remove_file(source.join("DATA").join("run.cfg")).unwrap();

        let mut options = StudyOptions::new("S");
        options.copy_from = Some(source.clone());
        let mut second = Study::new(&work.path().join("S"), options, &settings);
        let target = second.create_case("CASE2").unwrap();

        assert!(second.uses_reference());
        assert!(target.join("DATA").join("setup.xml").is_file());
        assert!(!target.join("DATA").join("SaturneGUI").exists());
        assert!(target.join("SRC").join("cs_user_physical_properties.c").is_file());
        assert!(target.join("SRC").join("REFERENCE").is_dir());
        assert!(target.join("DATA").join("run.cfg").is_file());
    }

    #[test]
    fn copy_without_references_disables_them() {
        let work = tempdir().unwrap();
        let mut options = StudyOptions::new("S");
        options.cases = vec!["CASE1".to_string()];
        options.use_reference = false;
        let mut first = Study::new(work.path(), options, &Settings::default());
        first.create().unwrap();

        let data = package_data();
        let mut options = StudyOptions::new("S");
        options.copy_from = Some(PathBuf::from("CASE1"));
        let study_root = work.path().join("S");
        let mut second = Study::new(&study_root, options, &settings_with(data.path()));
        assert_eq!(second.options().copy_from, Some(study_root.join("CASE1")));

        let target = second.create_case("CASE2").unwrap();
        assert!(!second.uses_reference());
        assert!(!target.join("SRC").join("REFERENCE").exists());
        assert!(target.join("DATA").join("run.cfg").is_file());
    }

    #[test]
    fn coupled_study_layout() {
        let work = tempdir().unwrap();
        let mut settings = Settings::default();
        settings.install.cathare = "/opt/cathare".to_string();

        let mut options = StudyOptions::new("COUPLED");
        options.cases = vec!["FLUID".to_string()];
        options.cathare_case = Some("CATH".to_string());
        options.python_case = Some("PY".to_string());
        options.use_reference = false;
        let mut study = Study::new(work.path(), options, &settings);
        assert!(study.needs_coupling());
        study.create().unwrap();

        let root = work.path().join("COUPLED");
        assert!(root.join(RESU_COUPLING).is_dir());
        assert!(root.join("code_saturne").is_file());
        assert!(root.join("CATH").join("DATA").join("setup.xml").is_file());
        for sub in ["DATA", "SRC", "RESU"] {
            assert!(root.join("PY").join(sub).is_dir());
        }

        let conf = RunConf::load(root.join("run.cfg")).unwrap();
        assert_eq!(conf.get("setup", "coupled_domains"), Some("FLUID:CATH:PY"));
        assert_eq!(conf.get("FLUID", "solver"), Some("Code_Saturne"));
        assert_eq!(conf.get("FLUID", "n_procs_weight"), None);
        assert_eq!(conf.get("CATH", "neptune_cfd_domain"), Some("NEPTUNE"));
        assert_eq!(conf.get("PY", "script"), Some("pycode.py"));
        let prologue = conf.get("job_defaults", "compute_prologue").unwrap();
        assert!(prologue.starts_with("export v25_3=/opt/cathare\n"));
    }

    #[test]
    fn cathare_requires_installation() {
        let work = tempdir().unwrap();
        let mut options = StudyOptions::new("S");
        options.cathare_case = Some("CATH".to_string());
        options.use_reference = false;
        let mut study = Study::new(work.path(), options, &Settings::default());
        let err = study.create().unwrap_err();
        assert_eq!(err.to_string(), "Cannot locate Cathare installation.");
    }

    #[test]
    fn existing_coupling_dir_is_fatal() {
        let work = tempdir().unwrap();
        let root = work.path().join("S");
        fs::create_dir_all(root.join(RESU_COUPLING)).unwrap();

        let mut options = StudyOptions::new("S");
        options.cases = vec!["A".to_string(), "B".to_string()];
        options.use_reference = false;
        let mut study = Study::new(&root, options, &Settings::default());
        assert!(matches!(study.create(), Err(StudyError::AlreadyExists(_))));
    }

    #[test]
    fn syrthes_domains_listed() {
        let work = tempdir().unwrap();
        let mut options = StudyOptions::new("S");
        options.cases = vec!["FLUID".to_string()];
        options.syrthes_cases = vec!["SOLID".to_string()];
        let study = Study::new(work.path(), options, &Settings::default());

        let domains = coupled_domains(&study);
        assert_eq!(domains.len(), 2);
        assert_eq!(domains[1].name, "SOLID");
        assert_eq!(domains[1].keys[2], ("param", Some("syrthes_data.syd".to_string())));
    }

    #[test]
    fn summary_lists_cases() {
        let mut options = StudyOptions::new("S");
        options.cases = vec!["A".to_string(), "B".to_string()];
        options.syrthes_cases = vec!["SOLID".to_string()];
        let study = Study::new(Path::new("/tmp"), options, &Settings::default());
        let summary = study.to_string();
        assert!(summary.contains("Name  of the study: S\n"));
        assert!(summary.contains("Names of the cases: A, B\n"));
        assert!(summary.contains("Number of instances: 2\n"));
        assert!(summary.contains("SYRTHES instances:\n  SOLID\n"));
    }
}
