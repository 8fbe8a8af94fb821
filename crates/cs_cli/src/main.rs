//! `cs` - study/case generation and case editing.
//!
//! Usage: `cs [--config FILE] <create|run|gas|thermochemistry|tuning> ...`

mod commands;

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand};

use cs_core::config::{ConfigManager, Settings};
use cs_core::logging::{init_tracing, LogLevel};

use commands::{CreateArgs, GasArgs, RunArgs, ThermochemistryArgs, TuningArgs};

#[derive(Parser, Debug)]
#[command(name = "cs")]
#[command(about = "Create Code_Saturne studies and edit case settings")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to the user configuration directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a study and its cases
    Create(CreateArgs),
    /// Check a case and start or submit its run
    Run(RunArgs),
    /// Select the gas combustion model and its options
    Gas(GasArgs),
    /// Edit the thermochemistry species table
    Thermochemistry(ThermochemistryArgs),
    /// Edit partitioning and parallel IO settings
    Tuning(TuningArgs),
}

fn load_settings(path: Option<PathBuf>) -> anyhow::Result<Settings> {
    let path = match path {
        Some(path) => path,
        None => match ConfigManager::default_path() {
            Ok(path) => path,
            Err(_) => return Ok(Settings::default()),
        },
    };
    let mut manager = ConfigManager::new(path);
    manager
        .load_or_default()
        .with_context(|| format!("Failed to load settings from {}", manager.path().display()))?;
    Ok(manager.settings().clone())
}

fn log_level(command: &Commands, settings: &Settings) -> LogLevel {
    match command {
        Commands::Create(args) if args.quiet || args.verbose => args.verbosity().log_level(),
        _ => settings.logging.level,
    }
}

fn execute(command: Commands, settings: &Settings) -> anyhow::Result<()> {
    match command {
        Commands::Create(args) => commands::create::run(args, settings),
        Commands::Run(args) => commands::run::run(args, settings),
        Commands::Gas(args) => commands::gas::run(args),
        Commands::Thermochemistry(args) => commands::thermochemistry::run(args),
        Commands::Tuning(args) => commands::tuning::run(args),
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = load_settings(cli.config)?;
    init_tracing(log_level(&cli.command, &settings));
    execute(cli.command, &settings)
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    use clap::CommandFactory;
    use cs_core::case::Case;
    use cs_core::models::{
        CombustionOption, GasCombustion, GasCombustionModel, PartitionType,
        PerformanceTuningModel, SootModel, ThermochemistryData,
    };
    use cs_core::run_conf::RunConf;
    use cs_core::study::{Study, StudyOptions};
    use tempfile::tempdir;

    fn exec(argv: &[&str]) -> anyhow::Result<()> {
        let mut full = vec!["cs"];
        full.extend_from_slice(argv);
        let cli = Cli::try_parse_from(full)?;
        execute(cli.command, &Settings::default())
    }

    fn new_case(dir: &Path) -> String {
        let path = dir.join("setup.xml");
        Case::new().save_as(&path).unwrap();
        path.display().to_string()
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn create_flags_set_log_level() {
        let cli = Cli::parse_from(["cs", "create", "-q", "CASE1"]);
        assert_eq!(log_level(&cli.command, &Settings::default()), LogLevel::Warn);

        let cli = Cli::parse_from(["cs", "tuning", "setup.xml"]);
        assert_eq!(log_level(&cli.command, &Settings::default()), LogLevel::Info);
    }

    #[test]
    fn missing_config_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(Some(dir.path().join("absent.toml"))).unwrap();
        assert_eq!(settings.package.name, "code_saturne");
        assert!(!dir.path().join("absent.toml").exists());
    }

    #[test]
    fn gas_command_edits_combustion_model() {
        let dir = tempdir().unwrap();
        let setup = new_case(dir.path());

        exec(&[
            "gas",
            &setup,
            "--model",
            "d3p",
            "--option",
            "extended",
            "--soot-model",
            "moss",
            "--soot-density",
            "1800",
            "--uniform-pressure",
            "on",
            "--data-file",
            "dp_FCP",
        ])
        .unwrap();

        let mut case = Case::load(&setup).unwrap();
        let mut gas = GasCombustionModel::new(&mut case);
        assert_eq!(gas.gas_combustion_model(), GasCombustion::D3p);
        assert_eq!(gas.gas_combustion_option(), CombustionOption::Extended);
        assert_eq!(gas.soot_model(), SootModel::Moss);
        assert_eq!(gas.soot_density(), 1800.0);
        assert!(gas.uniform_variable_thermodynamical_pressure());
        assert_eq!(gas.thermochemistry_data_file().as_deref(), Some("dp_FCP"));
    }

    #[test]
    fn gas_command_rejects_foreign_option() {
        let dir = tempdir().unwrap();
        let setup = new_case(dir.path());

        assert!(exec(&["gas", &setup, "--model", "ebu", "--option", "adiabatic"]).is_err());
        assert!(exec(&["gas", &setup, "--model", "premix"]).is_err());
        assert!(exec(&["gas", &setup, "--uniform-pressure", "yes"]).is_err());

        // Nothing was saved by the failed run.
        let mut case = Case::load(&setup).unwrap();
        assert_eq!(
            GasCombustionModel::new(&mut case).gas_combustion_model(),
            GasCombustion::Off
        );
    }

    #[test]
    fn thermochemistry_command_edits_species_and_writes_file() {
        let dir = tempdir().unwrap();
        let setup = new_case(dir.path());
        let data_file = dir.path().join("dp_FCP");
        let data_file = data_file.display().to_string();

        exec(&[
            "thermochemistry",
            &setup,
            "--create-data-file",
            "on",
            "--add-species",
            "fuel",
            "--add-species",
            "air",
            "--add-species",
            "spare",
            "--species",
            "fuel",
            "--formula",
            "CH4",
            "--fuel",
            "1",
        ])
        .unwrap();
        exec(&[
            "thermochemistry",
            &setup,
            "--delete-species",
            "spare",
            "--species",
            "air",
            "--formula",
            "O2",
            "--oxidant",
            "1",
            "--absorption",
            "0.1",
            "--points",
            "20",
            "--write",
            &data_file,
        ])
        .unwrap();

        let content = fs::read_to_string(&data_file).unwrap();
        assert!(content.starts_with("2 "));
        assert!(content.contains("20        Nb de points"));
        assert!(content.contains("CH4") && content.contains("O2"));
        // No species left with the default formula.
        assert!(!content.contains(&format!("{:>15}", "CHON")));

        let mut case = Case::load(&setup).unwrap();
        {
            let mut data = ThermochemistryData::new(&mut case);
            assert!(data.create_thermo_data_file());
            assert_eq!(data.species_labels(), vec!["fuel", "air"]);
            assert_eq!(data.oxidant_composition("air").unwrap(), 1.0);
            assert_eq!(data.absorption_coefficient("air").unwrap(), 0.1);
        }
        let gas = GasCombustionModel::new(&mut case);
        assert_eq!(gas.thermochemistry_data_file().as_deref(), Some("dp_FCP"));
    }

    #[test]
    fn species_fields_need_a_species() {
        let missing = Cli::try_parse_from(["cs", "thermochemistry", "setup.xml", "--fuel", "1"]);
        assert!(missing.is_err());
        assert!(Cli::try_parse_from([
            "cs",
            "thermochemistry",
            "setup.xml",
            "--species",
            "CH4",
            "--fuel",
            "1"
        ])
        .is_ok());
    }

    #[test]
    fn tuning_command_stores_non_default_values() {
        let dir = tempdir().unwrap();
        let setup = new_case(dir.path());

        exec(&[
            "tuning",
            &setup,
            "--partition-type",
            "morton sfc",
            "--min-block-size",
            "1024",
        ])
        .unwrap();

        let mut case = Case::load(&setup).unwrap();
        let tuning = PerformanceTuningModel::new(&mut case);
        assert_eq!(tuning.partition_type(), PartitionType::MortonSfc);
        assert_eq!(tuning.block_io_min_size(), 1024);

        exec(&["tuning", &setup, "--partition-type", "default"]).unwrap();
        let content = fs::read_to_string(&setup).unwrap();
        assert!(!content.contains("morton sfc"));
    }

    #[test]
    fn run_command_stores_job_relative_to_data() {
        let work = tempdir().unwrap();
        let mut options = StudyOptions::new("S");
        options.cases = vec!["C1".to_string()];
        options.use_reference = false;
        let mut study = Study::new(work.path(), options, &Settings::default());
        study.create().unwrap();

        let case_dir = study.root().join("C1");
        let setup = case_dir.join("DATA").join("setup.xml");
        let mut case = Case::load(&setup).unwrap();
        case.add_mesh("mesh.med");
        case.save().unwrap();

        let first = case_dir.display().to_string();
        exec(&[
            "run",
            &first,
            "--dry-run",
            "--computer",
            "pbs",
            "--nodes",
            "2",
            "--ppn",
            "4",
            "--walltime",
            "2:00:00",
        ])
        .unwrap();

        let run_cfg = case_dir.join("DATA").join("run.cfg");
        let conf = RunConf::load(&run_cfg).unwrap();
        assert_eq!(conf.get("batch", "script"), Some("code_saturne"));
        assert_eq!(conf.get("pbs", "nodes"), Some("2"));
        assert_eq!(conf.get("pbs", "walltime"), Some("2:00:00"));

        // Same case reached through another path.
        let second = case_dir.join("..").join("C1").display().to_string();
        exec(&["run", &second, "--dry-run", "--computer", "station"]).unwrap();
        let conf = RunConf::load(&run_cfg).unwrap();
        assert_eq!(conf.get("batch", "script"), Some("code_saturne"));
        assert_eq!(conf.get("batch", "computer"), Some("station"));

        assert!(exec(&["run", &first, "--dry-run", "--walltime", "1:75:00"]).is_err());
    }
}
