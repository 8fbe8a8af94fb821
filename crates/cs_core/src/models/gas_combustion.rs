//! Gas combustion model (`thermophysical_models/gas_combustion`).
//!
//! Selecting a model or option rebuilds the transported scalars and the
//! output properties the solver expects for it, and cleans up data that
//! belongs to other models (inlet gas data, fluid properties, soot
//! settings).

use crate::case::Case;
use crate::xml::{NodeId, XmlDocument};

use super::boundary::BoundaryZones;
use super::enums::{CombustionOption, GasCombustion, RadiativeModel, SootModel, ThermalModel};
use super::error::{ModelError, ModelResult};
use super::thermal::{ThermalRadiationModel, ThermalScalarModel};
use super::validate::{non_negative, on_off, parse_on_off};
use super::variables::{
    ensure_fluid_property, ensure_model_property, ensure_model_variable, remove_fluid_property,
    retain_named, set_clipping, EquationParameters,
};

/// Children dropped when combustion is switched off.
const OFF_REMOVED: [&str; 5] = [
    "variable",
    "property",
    "reference_mass_molar",
    "reference_temperature",
    "soot_model",
];

const DIFFUSION_PROPERTY: &str = "dynamic_diffusion";

/// Transported scalars for a model/option, and the thermal model it needs.
fn model_scalars(model: GasCombustion, option: CombustionOption) -> (Vec<&'static str>, ThermalModel) {
    use CombustionOption as O;

    let mut scalars = Vec::new();
    let mut thermal = ThermalModel::Off;
    match model {
        GasCombustion::Off => {}
        GasCombustion::D3p => {
            scalars.extend(["mixture_fraction", "mixture_fraction_variance"]);
            if option == O::Extended {
                thermal = ThermalModel::Enthalpy;
            }
        }
        GasCombustion::Ebu => {
            scalars.push("fresh_gas_fraction");
            if matches!(option, O::MixtureSt | O::EnthalpyMixtureSt) {
                scalars.push("mixture_fraction");
            }
            if matches!(option, O::EnthalpySt | O::EnthalpyMixtureSt) {
                thermal = ThermalModel::Enthalpy;
            }
        }
        GasCombustion::Lwp => {
            scalars.extend([
                "mixture_fraction",
                "mixture_fraction_variance",
                "mass_fraction",
                "mass_fraction_covariance",
            ]);
            if option.n_dirac().is_some_and(|n| n > 2) {
                scalars.push("mass_fraction_variance");
            }
            if matches!(option, O::TwoPeakEnthalpy | O::ThreePeakEnthalpy | O::FourPeakEnthalpy) {
                thermal = ThermalModel::Enthalpy;
            }
        }
    }
    (scalars, thermal)
}

/// Output properties for a model/option.
fn model_properties(model: GasCombustion, option: CombustionOption) -> Vec<String> {
    if model == GasCombustion::Off {
        return Vec::new();
    }

    let mut names: Vec<String> = ["temperature", "ym_fuel", "ym_oxyd", "ym_prod"]
        .iter()
        .map(|name| name.to_string())
        .collect();

    if model == GasCombustion::Lwp {
        names.push("source_term".to_string());
        names.push("molar_mass".to_string());
        let n_dirac = option.n_dirac().unwrap_or(2);
        for peak in 1..=n_dirac {
            for prefix in [
                "rho_local",
                "temperature_local",
                "ym_local",
                "w_local",
                "amplitude_local",
                "chemical_st_local",
                "molar_mass_local",
            ] {
                names.push(format!("{prefix}_{peak}"));
            }
        }
    }
    names
}

/// Accessors for the `gas_combustion` node.
pub struct GasCombustionModel<'a> {
    case: &'a mut Case,
    node_gas: NodeId,
    node_coal: NodeId,
    node_joule: NodeId,
    node_fluid: NodeId,
}

impl<'a> GasCombustionModel<'a> {
    pub fn new(case: &'a mut Case) -> Self {
        let models = case.section("thermophysical_models");
        let node_gas = case.init_child(models, "gas_combustion", &[]);
        let node_coal = case.init_child(models, "solid_fuels", &[]);
        let node_joule = case.init_child(models, "joule_effect", &[]);
        let properties = case.section("physical_properties");
        let node_fluid = case.init_child(properties, "fluid_properties", &[]);

        Self {
            case,
            node_gas,
            node_coal,
            node_joule,
            node_fluid,
        }
    }

    fn doc(&self) -> &XmlDocument {
        self.case.doc()
    }

    fn doc_mut(&mut self) -> &mut XmlDocument {
        self.case.doc_mut()
    }

    /// The `gas_combustion` node.
    pub fn node(&self) -> NodeId {
        self.node_gas
    }

    /// Available models.
    pub fn models() -> &'static [GasCombustion] {
        GasCombustion::all()
    }

    /// Current model. A missing or unknown value is reset to `off`.
    pub fn gas_combustion_model(&mut self) -> GasCombustion {
        let stored: Option<GasCombustion> = self
            .doc()
            .attr(self.node_gas, "model")
            .and_then(|value| value.parse().ok());
        match stored {
            Some(model) => model,
            None => {
                tracing::debug!("No valid gas combustion model stored, resetting to off");
                self.set_gas_combustion_model(GasCombustion::Off);
                GasCombustion::Off
            }
        }
    }

    /// Select a model and rebuild the dependent nodes.
    pub fn set_gas_combustion_model(&mut self, model: GasCombustion) {
        let gas = self.node_gas;
        let fluid = self.node_fluid;
        let old_model = self.doc().attr(gas, "model").map(str::to_string);

        ThermalScalarModel::new(self.case).set_model(ThermalModel::Off);

        if model == GasCombustion::Off {
            let doc = self.doc_mut();
            doc.set_attr(gas, "model", model.as_str());
            doc.set_attr(gas, "option", CombustionOption::Off.as_str());

            ThermalRadiationModel::new(self.case).set_model(RadiativeModel::Off);

            let doc = self.doc_mut();
            for tag in OFF_REMOVED {
                doc.remove_children(gas, tag, &[]);
            }
            BoundaryZones::new(self.case).delete_gas_data();
            remove_fluid_property(self.doc_mut(), fluid, DIFFUSION_PROPERTY);
        } else {
            let (coal, joule) = (self.node_coal, self.node_joule);
            let doc = self.doc_mut();
            doc.set_attr(gas, "model", model.as_str());
            doc.set_attr(coal, "model", "off");
            doc.set_attr(joule, "model", "off");
            ensure_fluid_property(doc, fluid, DIFFUSION_PROPERTY);

            if old_model.as_deref() != Some(model.as_str()) {
                BoundaryZones::new(self.case).delete_gas_data();
            }
        }

        if model != GasCombustion::D3p {
            let doc = self.doc_mut();
            doc.remove_children(fluid, "reference_oxydant_temperature", &[]);
            doc.remove_children(fluid, "reference_fuel_temperature", &[]);
        }

        tracing::info!("Gas combustion model set to {}", model);
        self.create_model();
    }

    /// Current option, replaced by the model default when it does not
    /// belong to the current model.
    pub fn gas_combustion_option(&mut self) -> CombustionOption {
        let model = self.gas_combustion_model();
        let stored: Option<CombustionOption> = self
            .doc()
            .attr(self.node_gas, "option")
            .and_then(|value| value.parse().ok());

        match stored {
            Some(option) if model.accepts(option) => option,
            _ => {
                let option = model.default_option();
                let gas = self.node_gas;
                self.doc_mut().set_attr(gas, "option", option.as_str());
                option
            }
        }
    }

    /// Select an option of the current model and rebuild the dependent nodes.
    pub fn set_gas_combustion_option(&mut self, option: CombustionOption) -> ModelResult<()> {
        let model = self.gas_combustion_model();
        if !model.accepts(option) {
            return Err(ModelError::OptionMismatch {
                model: model.to_string(),
                option: option.to_string(),
            });
        }

        let gas = self.node_gas;
        self.doc_mut().set_attr(gas, "option", option.as_str());
        self.create_model();
        Ok(())
    }

    /// Number of Dirac peaks of the Libby-Williams model.
    pub fn n_dirac(&mut self) -> ModelResult<u32> {
        let option = self.gas_combustion_option();
        option.n_dirac().ok_or_else(|| {
            ModelError::NotApplicable(format!(
                "Option '{option}' has no Dirac peaks (Libby-Williams options only)"
            ))
        })
    }

    /// Rebuild scalars and properties for the current selection.
    fn create_model(&mut self) {
        let model = self.gas_combustion_model();
        self.create_scalars(model);
        self.create_properties(model);
    }

    fn create_scalars(&mut self, model: GasCombustion) {
        let gas = self.node_gas;
        if model == GasCombustion::Off {
            self.doc_mut().remove_children(gas, "variable", &[]);
            return;
        }

        let option = self.gas_combustion_option();
        let (scalars, thermal) = model_scalars(model, option);
        ThermalScalarModel::new(self.case).set_model(thermal);

        let keep: Vec<String> = scalars.iter().map(|name| name.to_string()).collect();
        let doc = self.doc_mut();
        retain_named(doc, gas, "variable", &keep);
        for name in &scalars {
            ensure_model_variable(doc, gas, name);
        }

        for variable in doc.children(gas, "variable", &[]) {
            EquationParameters::UPWIND.apply(doc, variable);
            if model != GasCombustion::D3p {
                continue;
            }
            let name = doc.attr(variable, "name").map(str::to_string);
            match name.as_deref() {
                Some("mixture_fraction") => set_clipping(doc, variable, 0.0, 1.0),
                Some("mixture_fraction_variance") => {
                    set_clipping(doc, variable, 0.0, 1e12);
                    doc.set_data(variable, "variance", "mixture_fraction");
                }
                _ => {}
            }
        }
    }

    fn create_properties(&mut self, model: GasCombustion) {
        let gas = self.node_gas;
        if model == GasCombustion::Off {
            self.doc_mut().remove_children(gas, "property", &[]);
            return;
        }

        let option = self.gas_combustion_option();
        let names = model_properties(model, option);
        let doc = self.doc_mut();
        retain_named(doc, gas, "property", &names);
        for name in &names {
            ensure_model_property(doc, gas, name);
        }
    }

    /// Thermochemistry data file name, if set.
    pub fn thermochemistry_data_file(&self) -> Option<String> {
        self.doc().get_string(self.node_gas, "data_file")
    }

    pub fn set_thermochemistry_data_file(&mut self, name: &str) {
        let gas = self.node_gas;
        self.doc_mut().set_data(gas, "data_file", name);
    }

    /// Whether the thermodynamical pressure varies uniformly (default off).
    pub fn uniform_variable_thermodynamical_pressure(&mut self) -> bool {
        let gas = self.node_gas;
        let node = self.case.init_child(gas, "thermodynamical_pressure", &[]);
        match self
            .doc()
            .attr(node, "status")
            .map(|status| parse_on_off("thermodynamical pressure status", status))
        {
            Some(Ok(status)) => status,
            _ => {
                self.set_uniform_variable_thermodynamical_pressure(false);
                false
            }
        }
    }

    pub fn set_uniform_variable_thermodynamical_pressure(&mut self, status: bool) {
        let gas = self.node_gas;
        let doc = self.doc_mut();
        let node = doc.init_child(gas, "thermodynamical_pressure", &[]);
        doc.set_attr(node, "status", on_off(status));
    }

    fn soot_node(&mut self) -> NodeId {
        let gas = self.node_gas;
        self.case.init_child(gas, "soot_model", &[])
    }

    /// Soot model; missing or unknown values are reset to `off`.
    pub fn soot_model(&mut self) -> SootModel {
        let node = self.soot_node();
        let stored: Option<SootModel> = self
            .doc()
            .attr(node, "model")
            .and_then(|value| value.parse().ok());
        match stored {
            Some(model) => model,
            None => {
                self.set_soot_model(SootModel::Off);
                SootModel::Off
            }
        }
    }

    pub fn set_soot_model(&mut self, model: SootModel) {
        let node = self.soot_node();
        let doc = self.doc_mut();
        doc.set_attr(node, "model", model.as_str());
        match model {
            SootModel::Moss => {
                doc.remove_children(node, "soot_fraction", &[]);
            }
            SootModel::Off => {
                doc.remove_children(node, "soot_density", &[]);
                doc.remove_children(node, "soot_fraction", &[]);
            }
            SootModel::SootProductFraction => {}
        }
    }

    fn soot_value(&mut self, tag: &str) -> f64 {
        let node = self.soot_node();
        match self.doc().get_f64(node, tag) {
            Some(value) => value,
            None => {
                self.doc_mut().set_f64(node, tag, 0.0);
                0.0
            }
        }
    }

    fn set_soot_value(&mut self, tag: &'static str, value: f64) -> ModelResult<()> {
        let value = non_negative(tag, value)?;
        let node = self.soot_node();
        self.doc_mut().set_f64(node, tag, value);
        Ok(())
    }

    /// Soot density (default 0.0).
    pub fn soot_density(&mut self) -> f64 {
        self.soot_value("soot_density")
    }

    pub fn set_soot_density(&mut self, value: f64) -> ModelResult<()> {
        self.set_soot_value("soot_density", value)
    }

    /// Soot fraction (default 0.0).
    pub fn soot_fraction(&mut self) -> f64 {
        self.soot_value("soot_fraction")
    }

    pub fn set_soot_fraction(&mut self, value: f64) -> ModelResult<()> {
        self.set_soot_value("soot_fraction", value)
    }
}
