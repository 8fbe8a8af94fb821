//! `cs thermochemistry`: species table and thermochemistry data file.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use cs_core::case::Case;
use cs_core::models::{GasCombustionModel, ThermochemistryData};

use super::parse_status;

#[derive(Args, Debug)]
pub struct ThermochemistryArgs {
    /// Case file to edit
    pub setup: PathBuf,

    /// Generate the data file from the species table (on/off)
    #[arg(long, value_name = "STATUS", value_parser = parse_status)]
    pub create_data_file: Option<bool>,

    /// Delete the species with this label (repeatable)
    #[arg(long = "delete-species", value_name = "LABEL")]
    pub delete_species: Vec<String>,

    /// Add a species with this label (repeatable)
    #[arg(long = "add-species", value_name = "LABEL")]
    pub add_species: Vec<String>,

    /// Number of tabulation points
    #[arg(long, value_name = "N")]
    pub points: Option<i64>,

    /// Minimal tabulation temperature
    #[arg(long, value_name = "K")]
    pub tmin: Option<f64>,

    /// Maximal tabulation temperature
    #[arg(long, value_name = "K")]
    pub tmax: Option<f64>,

    /// Species edited by --formula, --fuel, --oxidant, --product and --absorption
    #[arg(long, value_name = "LABEL")]
    pub species: Option<String>,

    /// Chemical formula, e.g. CH4
    #[arg(long, value_name = "FORMULA", requires = "species")]
    pub formula: Option<String>,

    /// Fraction of the species in the fuel
    #[arg(long, value_name = "FRACTION", requires = "species")]
    pub fuel: Option<f64>,

    /// Fraction of the species in the oxidant
    #[arg(long, value_name = "FRACTION", requires = "species")]
    pub oxidant: Option<f64>,

    /// Fraction of the species in the products
    #[arg(long, value_name = "FRACTION", requires = "species")]
    pub product: Option<f64>,

    /// Absorption coefficient used by radiative transfer
    #[arg(long, value_name = "COEFF", requires = "species")]
    pub absorption: Option<f64>,

    /// Write the thermochemistry data file and select it for the case
    #[arg(long, value_name = "FILE")]
    pub write: Option<PathBuf>,
}

pub fn run(args: ThermochemistryArgs) -> anyhow::Result<()> {
    let mut case =
        Case::load(&args.setup).with_context(|| format!("Cannot open {}", args.setup.display()))?;

    {
        let mut data = ThermochemistryData::new(&mut case);
        if let Some(status) = args.create_data_file {
            data.set_create_thermo_data_file(status);
        }
        for label in &args.delete_species {
            data.delete_species(label)?;
        }
        for label in &args.add_species {
            let added = data.add_species(Some(label.as_str()))?;
            tracing::info!("Added species '{}'", added);
        }
        if let Some(points) = args.points {
            data.set_n_points(points)?;
        }
        if let Some(tmin) = args.tmin {
            data.set_min_temperature(tmin)?;
        }
        if let Some(tmax) = args.tmax {
            data.set_max_temperature(tmax)?;
        }

        if let Some(label) = &args.species {
            if let Some(formula) = &args.formula {
                data.set_chemical_formula(label, formula)?;
            }
            if let Some(value) = args.fuel {
                data.set_fuel_composition(label, value)?;
            }
            if let Some(value) = args.oxidant {
                data.set_oxidant_composition(label, value)?;
            }
            if let Some(value) = args.product {
                data.set_product_composition(label, value)?;
            }
            if let Some(value) = args.absorption {
                data.set_absorption_coefficient(label, value)?;
            }
        }

        println!(
            "{} points, T = {} .. {}",
            data.n_points(),
            data.min_temperature(),
            data.max_temperature()
        );
        for species in data.species_table()? {
            println!(
                "{:<12} {:<10} fuel {:<8} oxidant {:<8} product {:<8} absorption {}",
                species.label,
                species.chemical_formula,
                species.fuel_composition,
                species.oxidant_composition,
                species.product_composition,
                species.absorption_coefficient
            );
        }

        if let Some(path) = &args.write {
            data.write_data_file(path)
                .with_context(|| format!("Cannot write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
    }

    if let Some(name) = args.write.as_deref().and_then(|path| path.file_name()) {
        GasCombustionModel::new(&mut case)
            .set_thermochemistry_data_file(&name.to_string_lossy());
    }

    if case.is_modified() {
        case.save()?;
    }
    Ok(())
}
