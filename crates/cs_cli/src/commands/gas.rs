//! `cs gas`: gas combustion model, soot model and thermodynamic pressure.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use cs_core::case::Case;
use cs_core::models::{CombustionOption, GasCombustion, GasCombustionModel, SootModel};

use super::parse_status;

#[derive(Args, Debug)]
pub struct GasArgs {
    /// Case file to edit
    pub setup: PathBuf,

    /// Combustion model: off, ebu, d3p or lwp
    #[arg(long, value_name = "MODEL")]
    pub model: Option<GasCombustion>,

    /// Option of the selected model, e.g. extended or 3-peak_enthalpy
    #[arg(long, value_name = "OPTION")]
    pub option: Option<CombustionOption>,

    /// Soot model: off, soot_product_fraction or moss
    #[arg(long, value_name = "MODEL")]
    pub soot_model: Option<SootModel>,

    /// Soot density
    #[arg(long, value_name = "KG_M3")]
    pub soot_density: Option<f64>,

    /// Soot fraction
    #[arg(long, value_name = "FRACTION")]
    pub soot_fraction: Option<f64>,

    /// Uniform variable thermodynamic pressure (on/off)
    #[arg(long, value_name = "STATUS", value_parser = parse_status)]
    pub uniform_pressure: Option<bool>,

    /// Thermochemistry data file name read by the solver
    #[arg(long, value_name = "NAME")]
    pub data_file: Option<String>,
}

pub fn run(args: GasArgs) -> anyhow::Result<()> {
    let mut case =
        Case::load(&args.setup).with_context(|| format!("Cannot open {}", args.setup.display()))?;

    {
        let mut gas = GasCombustionModel::new(&mut case);
        if let Some(model) = args.model {
            gas.set_gas_combustion_model(model);
        }
        if let Some(option) = args.option {
            gas.set_gas_combustion_option(option)?;
        }
        if let Some(model) = args.soot_model {
            gas.set_soot_model(model);
        }
        if let Some(value) = args.soot_density {
            gas.set_soot_density(value)?;
        }
        if let Some(value) = args.soot_fraction {
            gas.set_soot_fraction(value)?;
        }
        if let Some(status) = args.uniform_pressure {
            gas.set_uniform_variable_thermodynamical_pressure(status);
        }
        if let Some(name) = &args.data_file {
            gas.set_thermochemistry_data_file(name);
        }

        let model = gas.gas_combustion_model();
        println!("model:    {}", model);
        if model != GasCombustion::Off {
            println!("option:   {}", gas.gas_combustion_option());
            if let Ok(n_dirac) = gas.n_dirac() {
                println!("diracs:   {}", n_dirac);
            }
            if let Some(name) = gas.thermochemistry_data_file() {
                println!("data:     {}", name);
            }
            println!(
                "uniform thermodynamic pressure: {}",
                gas.uniform_variable_thermodynamical_pressure()
            );
            let soot = gas.soot_model();
            println!("soot:     {}", soot);
            match soot {
                SootModel::Off => {}
                SootModel::Moss => println!("density:  {}", gas.soot_density()),
                SootModel::SootProductFraction => {
                    println!("density:  {}", gas.soot_density());
                    println!("fraction: {}", gas.soot_fraction());
                }
            }
        }
    }

    if case.is_modified() {
        case.save()?;
    }
    Ok(())
}
