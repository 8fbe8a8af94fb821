//! Thermochemistry tabulation data (`thermophysical_models/Thermochemistry_data`).
//!
//! Holds the species table used to generate the solver's thermochemistry
//! data file, and writes that file in its fixed-column layout.

use std::cmp::Ordering;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::case::Case;
use crate::xml::{format_float, NodeId, XmlDocument};

use super::error::{ModelError, ModelResult};
use super::validate::{at_least, finite, non_negative, on_off, parse_on_off};

/// Elements the data file describes, in file order.
pub const CHEMICAL_ELEMENTS: [char; 4] = ['C', 'H', 'O', 'N'];

/// Molar masses in kg/mol, matching [`CHEMICAL_ELEMENTS`].
const MOLAR_MASSES: [f64; 4] = [0.012, 0.001, 0.016, 0.014];

/// Fuel and oxidant.
const KNOWN_GLOBAL_SPECIES: usize = 2;

pub const DEFAULT_POINTS: i64 = 10;
pub const DEFAULT_MAX_TEMPERATURE: f64 = 3000.0;
pub const DEFAULT_MIN_TEMPERATURE: f64 = 273.0;

const TABULATION_TAGS: [&str; 3] = ["NbPointsTabu", "MaximalTemp", "MinimalTemp"];
const DEFAULT_LABEL_PREFIX: &str = "specie";

/// One species record.
#[derive(Debug, Clone, PartialEq)]
pub struct Species {
    pub label: String,
    pub chemical_formula: String,
    pub fuel_composition: f64,
    pub oxidant_composition: f64,
    pub product_composition: f64,
    pub absorption_coefficient: f64,
}

impl Species {
    fn with_defaults(label: &str) -> Self {
        Self {
            label: label.to_string(),
            chemical_formula: "CHON".to_string(),
            fuel_composition: 0.0,
            oxidant_composition: 0.0,
            product_composition: 0.0,
            absorption_coefficient: 0.35,
        }
    }
}

/// Numeric species fields and their XML tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpeciesField {
    Fuel,
    Oxidant,
    Product,
    Absorption,
}

impl SpeciesField {
    fn tag(self) -> &'static str {
        match self {
            Self::Fuel => "fuel_composition",
            Self::Oxidant => "oxi_composition",
            Self::Product => "prod_composition",
            Self::Absorption => "coeff_absorption",
        }
    }

    fn default_value(self) -> f64 {
        match self {
            Self::Absorption => 0.35,
            _ => 0.0,
        }
    }
}

/// Count C, H, O and N atoms in a formula, the way the solver's data reader
/// does: an element letter sets its count to 1, and digits directly
/// following it replace that count.
///
/// ```
/// use cs_core::models::element_counts;
///
/// assert_eq!(element_counts("CH4"), [('C', 1), ('H', 4), ('O', 0), ('N', 0)]);
/// assert_eq!(element_counts("co2"), [('C', 1), ('H', 0), ('O', 2), ('N', 0)]);
/// ```
pub fn element_counts(formula: &str) -> [(char, u32); 4] {
    let formula = formula.to_uppercase();
    CHEMICAL_ELEMENTS.map(|element| {
        let mut count = 0u32;
        let mut first_digit = true;
        let mut current: Option<char> = None;

        for ch in formula.chars() {
            if ch == element {
                count = 1;
                first_digit = true;
            }
            if let Some(digit) = ch.to_digit(10) {
                if current == Some(element) {
                    if first_digit {
                        first_digit = false;
                        count = 0;
                    }
                    count = count.saturating_mul(10).saturating_add(digit);
                }
            } else {
                current = Some(ch);
            }
        }
        (element, count)
    })
}

/// Accessors for the `Thermochemistry_data` node.
pub struct ThermochemistryData<'a> {
    case: &'a mut Case,
    node: NodeId,
}

impl<'a> ThermochemistryData<'a> {
    pub fn new(case: &'a mut Case) -> Self {
        let models = case.section("thermophysical_models");
        let node = case.init_child(models, "Thermochemistry_data", &[]);
        Self { case, node }
    }

    fn doc(&self) -> &XmlDocument {
        self.case.doc()
    }

    fn doc_mut(&mut self) -> &mut XmlDocument {
        self.case.doc_mut()
    }

    /// Whether the GUI generates the data file (default off).
    pub fn create_thermo_data_file(&mut self) -> bool {
        let node = self.node;
        let flag = self.case.init_child(node, "CreateThermoDataFile", &[]);
        match self
            .doc()
            .attr(flag, "status")
            .map(|status| parse_on_off("CreateThermoDataFile status", status))
        {
            Some(Ok(status)) => status,
            _ => {
                self.set_create_thermo_data_file(false);
                false
            }
        }
    }

    /// Turning generation off drops the tabulation parameters and species.
    pub fn set_create_thermo_data_file(&mut self, status: bool) {
        let node = self.node;
        let doc = self.doc_mut();
        let flag = doc.init_child(node, "CreateThermoDataFile", &[]);
        doc.set_attr(flag, "status", on_off(status));
        if !status {
            for tag in TABULATION_TAGS {
                doc.remove_children(node, tag, &[]);
            }
            let removed = doc.remove_children(node, "variable", &[]);
            if removed > 0 {
                tracing::debug!("Removed {} species from thermochemistry table", removed);
            }
        }
    }

    /// Number of enthalpy/temperature tabulation points (default 10).
    pub fn n_points(&mut self) -> i64 {
        let node = self.node;
        match self.doc().get_i64(node, "NbPointsTabu") {
            Some(value) => value,
            None => {
                self.doc_mut().set_i64(node, "NbPointsTabu", DEFAULT_POINTS);
                DEFAULT_POINTS
            }
        }
    }

    pub fn set_n_points(&mut self, value: i64) -> ModelResult<()> {
        let value = at_least("tabulation points", value, 1)?;
        let node = self.node;
        self.doc_mut().set_i64(node, "NbPointsTabu", value);
        Ok(())
    }

    fn temperature(&mut self, tag: &str, default: f64) -> f64 {
        let node = self.node;
        match self.doc().get_f64(node, tag) {
            Some(value) => value,
            None => {
                self.doc_mut().set_f64(node, tag, default);
                default
            }
        }
    }

    /// Upper tabulation temperature (default 3000.0).
    pub fn max_temperature(&mut self) -> f64 {
        self.temperature("MaximalTemp", DEFAULT_MAX_TEMPERATURE)
    }

    pub fn set_max_temperature(&mut self, value: f64) -> ModelResult<()> {
        let value = finite("maximal temperature", value)?;
        let node = self.node;
        self.doc_mut().set_f64(node, "MaximalTemp", value);
        Ok(())
    }

    /// Lower tabulation temperature (default 273.0).
    pub fn min_temperature(&mut self) -> f64 {
        self.temperature("MinimalTemp", DEFAULT_MIN_TEMPERATURE)
    }

    pub fn set_min_temperature(&mut self, value: f64) -> ModelResult<()> {
        let value = finite("minimal temperature", value)?;
        let node = self.node;
        self.doc_mut().set_f64(node, "MinimalTemp", value);
        Ok(())
    }

    /// Species labels, in table order.
    pub fn species_labels(&self) -> Vec<String> {
        let doc = self.doc();
        doc.children(self.node, "variable", &[])
            .into_iter()
            .filter_map(|id| doc.attr(id, "label").map(str::to_string))
            .collect()
    }

    fn species_node(&self, label: &str) -> ModelResult<NodeId> {
        self.doc()
            .child(self.node, "variable", &[("label", label)])
            .ok_or_else(|| ModelError::UnknownSpecies(label.to_string()))
    }

    fn default_label(&self) -> String {
        let labels = self.species_labels();
        (1..)
            .map(|i| format!("{DEFAULT_LABEL_PREFIX}{i}"))
            .find(|candidate| !labels.contains(candidate))
            .unwrap_or_else(|| DEFAULT_LABEL_PREFIX.to_string())
    }

    /// Add a species with default properties and return its label.
    ///
    /// Without a label, `specie<i>` with the smallest free `i` is used.
    pub fn add_species(&mut self, label: Option<&str>) -> ModelResult<String> {
        let label = match label {
            Some(label) if label.trim().is_empty() => {
                return Err(ModelError::out_of_range("species label", "''"));
            }
            Some(label) => label.to_string(),
            None => self.default_label(),
        };
        if self.species_node(&label).is_ok() {
            return Err(ModelError::DuplicateSpecies(label));
        }

        let defaults = Species::with_defaults(&label);
        let node = self.node;
        let doc = self.doc_mut();
        let species = doc.append_child(
            node,
            "variable",
            &[("label", label.as_str()), ("name", label.as_str())],
        );
        doc.set_data(species, "chemical_formula", defaults.chemical_formula.as_str());
        for (field, value) in [
            (SpeciesField::Fuel, defaults.fuel_composition),
            (SpeciesField::Oxidant, defaults.oxidant_composition),
            (SpeciesField::Product, defaults.product_composition),
            (SpeciesField::Absorption, defaults.absorption_coefficient),
        ] {
            doc.set_f64(species, field.tag(), value);
        }

        tracing::debug!("Added species '{}'", label);
        Ok(label)
    }

    /// Remove a species.
    pub fn delete_species(&mut self, label: &str) -> ModelResult<()> {
        let species = self.species_node(label)?;
        self.doc_mut().remove(species);
        tracing::debug!("Deleted species '{}'", label);
        Ok(())
    }

    pub fn chemical_formula(&mut self, label: &str) -> ModelResult<String> {
        let species = self.species_node(label)?;
        match self.doc().get_string(species, "chemical_formula") {
            Some(formula) => Ok(formula),
            None => {
                let formula = Species::with_defaults(label).chemical_formula;
                self.doc_mut()
                    .set_data(species, "chemical_formula", formula.as_str());
                Ok(formula)
            }
        }
    }

    pub fn set_chemical_formula(&mut self, label: &str, formula: &str) -> ModelResult<()> {
        let formula = formula.trim();
        if formula.is_empty() {
            return Err(ModelError::out_of_range("chemical formula", "''"));
        }
        let species = self.species_node(label)?;
        self.doc_mut().set_data(species, "chemical_formula", formula);
        Ok(())
    }

    fn value(&mut self, label: &str, field: SpeciesField) -> ModelResult<f64> {
        let species = self.species_node(label)?;
        match self.doc().get_f64(species, field.tag()) {
            Some(value) => Ok(value),
            None => {
                let value = field.default_value();
                self.doc_mut().set_f64(species, field.tag(), value);
                Ok(value)
            }
        }
    }

    fn set_value(&mut self, label: &str, field: SpeciesField, value: f64) -> ModelResult<()> {
        let value = non_negative(field.tag(), value)?;
        let species = self.species_node(label)?;
        self.doc_mut().set_f64(species, field.tag(), value);
        Ok(())
    }

    pub fn fuel_composition(&mut self, label: &str) -> ModelResult<f64> {
        self.value(label, SpeciesField::Fuel)
    }

    pub fn set_fuel_composition(&mut self, label: &str, value: f64) -> ModelResult<()> {
        self.set_value(label, SpeciesField::Fuel, value)
    }

    pub fn oxidant_composition(&mut self, label: &str) -> ModelResult<f64> {
        self.value(label, SpeciesField::Oxidant)
    }

    pub fn set_oxidant_composition(&mut self, label: &str, value: f64) -> ModelResult<()> {
        self.set_value(label, SpeciesField::Oxidant, value)
    }

    pub fn product_composition(&mut self, label: &str) -> ModelResult<f64> {
        self.value(label, SpeciesField::Product)
    }

    pub fn set_product_composition(&mut self, label: &str, value: f64) -> ModelResult<()> {
        self.set_value(label, SpeciesField::Product, value)
    }

    pub fn absorption_coefficient(&mut self, label: &str) -> ModelResult<f64> {
        self.value(label, SpeciesField::Absorption)
    }

    pub fn set_absorption_coefficient(&mut self, label: &str, value: f64) -> ModelResult<()> {
        self.set_value(label, SpeciesField::Absorption, value)
    }

    /// Full record of one species, filling in defaults.
    pub fn species(&mut self, label: &str) -> ModelResult<Species> {
        Ok(Species {
            label: label.to_string(),
            chemical_formula: self.chemical_formula(label)?,
            fuel_composition: self.fuel_composition(label)?,
            oxidant_composition: self.oxidant_composition(label)?,
            product_composition: self.product_composition(label)?,
            absorption_coefficient: self.absorption_coefficient(label)?,
        })
    }

    /// All species, in table order.
    pub fn species_table(&mut self) -> ModelResult<Vec<Species>> {
        self.species_labels()
            .iter()
            .map(|label| self.species(label))
            .collect()
    }

    /// Render the data file content.
    pub fn render_data_file(&mut self) -> ModelResult<String> {
        let species = sorted_for_data_file(self.species_table()?);
        if species.is_empty() {
            return Err(ModelError::NotApplicable(
                "No species defined; add at least one before writing the data file".to_string(),
            ));
        }
        let n_points = self.n_points();
        let t_min = self.min_temperature();
        let t_max = self.max_temperature();
        Ok(render(&species, n_points, t_min, t_max))
    }

    /// Write the data file.
    pub fn write_data_file(&mut self, path: &Path) -> ModelResult<()> {
        let content = self.render_data_file()?;
        fs::write(path, content).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("Wrote thermochemistry data file {}", path.display());
        Ok(())
    }
}

/// Fuel species first, then oxidant, unspecified, products; each group by
/// relative fraction, ties by label.
fn sorted_for_data_file(species: Vec<Species>) -> Vec<Species> {
    let max_of = |pick: fn(&Species) -> f64| species.iter().map(pick).fold(0.0_f64, f64::max);
    let max_fuel = max_of(|s| s.fuel_composition);
    let max_oxi = max_of(|s| s.oxidant_composition);
    let max_prod = max_of(|s| s.product_composition);

    let mut keyed: Vec<(f64, Species)> = species
        .into_iter()
        .map(|s| {
            let mut order = 3.0;
            if s.fuel_composition > 0.0 {
                order = s.fuel_composition / max_fuel;
            }
            if s.oxidant_composition > 0.0 {
                order = 1.0 + s.oxidant_composition / max_oxi;
            }
            if s.product_composition > 0.0 {
                order = 3.0 + s.product_composition / max_prod;
            }
            (order, s)
        })
        .collect();

    keyed.sort_by(|(a, sa), (b, sb)| {
        a.partial_cmp(b)
            .unwrap_or(Ordering::Equal)
            .then_with(|| sa.label.cmp(&sb.label))
    });
    keyed.into_iter().map(|(_, s)| s).collect()
}

fn render(species: &[Species], n_points: i64, t_min: f64, t_max: f64) -> String {
    let n = species.len();
    let pad = " ".repeat(15 * n);
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(out, "{:<10}Nb especes courantes", n);
    let _ = writeln!(out, "{:<10}Nb de points de tabulation ENTH-TEMP", n_points);
    let _ = writeln!(out, "{:<10}TMIN", format_float(t_min));
    let _ = writeln!(out, "{:<10}TMAX", format_float(t_max));
    out.push_str("Especes Gazeuses\n");

    out.push_str(&" ".repeat(10));
    for s in species {
        let _ = write!(out, "{:>15}", s.chemical_formula.to_uppercase());
    }
    out.push('\n');

    out.push_str(&" ".repeat(10));
    for s in species {
        let _ = write!(out, "{:>15}", format_float(s.absorption_coefficient));
    }
    out.push_str("     Coeff absorption (ray)\n");

    let present: Vec<(usize, char)> = CHEMICAL_ELEMENTS
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, element)| {
            species
                .iter()
                .any(|s| s.chemical_formula.to_uppercase().contains(*element))
        })
        .collect();
    let _ = writeln!(out, "{:<15}{}Nb especes elementaires", present.len(), pad);

    let counts: Vec<[(char, u32); 4]> = species
        .iter()
        .map(|s| element_counts(&s.chemical_formula))
        .collect();
    for (index, element) in present {
        let _ = write!(out, "{:<10}", format_float(MOLAR_MASSES[index]));
        for count in &counts {
            let _ = write!(out, "{:>15}", count[index].1);
        }
        if element == CHEMICAL_ELEMENTS[0] {
            out.push_str("     Composition CHON");
        }
        out.push('\n');
    }

    let _ = writeln!(
        out,
        "{:<15}{}Nb d'especes globales connues (ici : / Fuel / Oxydant / Produits)",
        KNOWN_GLOBAL_SPECIES, pad
    );

    let rows: [(fn(&Species) -> f64, &str); 3] = [
        (
            |s| s.fuel_composition,
            "Numero espece reactive / Composition Fuel     en especes elementaires",
        ),
        (
            |s| s.oxidant_composition,
            "Numero espece reactive / Composition Oxydant  en especes elementaires",
        ),
        (
            |s| s.product_composition,
            "Numero espece reactive / Composition Produits en especes elementaires",
        ),
    ];
    for (i, (pick, info)) in rows.iter().enumerate() {
        out.push_str(&" ".repeat(10));
        for s in species {
            let _ = write!(out, "{:>15}", format_float(pick(s)));
        }
        out.push_str("     ");
        out.push_str(info);
        if i + 1 < rows.len() {
            out.push('\n');
        }
    }
    out
}
