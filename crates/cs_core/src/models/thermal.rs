//! Thermal scalar and radiative transfer selections.

use crate::case::Case;
use crate::xml::NodeId;

use super::enums::{RadiativeModel, ThermalModel};
use super::variables::{ensure_model_variable, retain_named};

/// `thermophysical_models/thermal_scalar`.
pub struct ThermalScalarModel<'a> {
    case: &'a mut Case,
    node: NodeId,
}

impl<'a> ThermalScalarModel<'a> {
    pub fn new(case: &'a mut Case) -> Self {
        let models = case.section("thermophysical_models");
        let node = case.init_child(models, "thermal_scalar", &[]);
        Self { case, node }
    }

    /// Current model; `off` when missing or unknown.
    pub fn model(&self) -> ThermalModel {
        self.case
            .doc()
            .attr(self.node, "model")
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }

    /// Select a model and keep exactly its scalar.
    pub fn set_model(&mut self, model: ThermalModel) {
        let node = self.node;
        let doc = self.case.doc_mut();
        doc.set_attr(node, "model", model.as_str());

        let keep: Vec<String> = model.scalar_name().map(str::to_string).into_iter().collect();
        retain_named(doc, node, "variable", &keep);
        if let Some(name) = model.scalar_name() {
            let var = ensure_model_variable(doc, node, name);
            doc.set_attr(var, "type", "thermal");
        }
        tracing::debug!("Thermal scalar model set to {}", model);
    }

    /// Name of the transported thermal scalar, if any.
    pub fn scalar(&self) -> Option<String> {
        let doc = self.case.doc();
        doc.child(self.node, "variable", &[])
            .and_then(|id| doc.attr(id, "name"))
            .map(str::to_string)
    }
}

/// `thermophysical_models/radiative_transfer`.
pub struct ThermalRadiationModel<'a> {
    case: &'a mut Case,
    node: NodeId,
}

impl<'a> ThermalRadiationModel<'a> {
    pub fn new(case: &'a mut Case) -> Self {
        let models = case.section("thermophysical_models");
        let node = case.init_child(models, "radiative_transfer", &[]);
        Self { case, node }
    }

    pub fn model(&self) -> RadiativeModel {
        self.case
            .doc()
            .attr(self.node, "model")
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }

    /// Select a model. `off` drops every radiative setting.
    pub fn set_model(&mut self, model: RadiativeModel) {
        let node = self.node;
        let doc = self.case.doc_mut();
        doc.set_attr(node, "model", model.as_str());
        if model == RadiativeModel::Off {
            let children = doc.child_nodes(node).to_vec();
            for id in children {
                doc.remove(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thermal_model_keeps_one_scalar() {
        let mut case = Case::new();
        let mut thermal = ThermalScalarModel::new(&mut case);
        assert_eq!(thermal.model(), ThermalModel::Off);

        thermal.set_model(ThermalModel::Enthalpy);
        assert_eq!(thermal.scalar().as_deref(), Some("enthalpy"));

        thermal.set_model(ThermalModel::TemperatureKelvin);
        assert_eq!(thermal.scalar().as_deref(), Some("temperature"));

        thermal.set_model(ThermalModel::Off);
        assert_eq!(thermal.scalar(), None);
        assert_eq!(thermal.model(), ThermalModel::Off);
    }

    #[test]
    fn radiative_off_clears_children() {
        let mut case = Case::new();
        let mut radiation = ThermalRadiationModel::new(&mut case);
        radiation.set_model(RadiativeModel::Dom);
        let node = radiation.node;
        radiation.case.doc_mut().set_i64(node, "directions_number", 32);

        radiation.set_model(RadiativeModel::Off);
        assert!(radiation.case.doc().child_nodes(node).is_empty());
        assert_eq!(radiation.model(), RadiativeModel::Off);
    }

    #[test]
    fn unknown_spelling_reads_as_off() {
        let mut case = Case::parse(
            r#"<Code_Saturne_GUI><thermophysical_models><radiative_transfer model="bogus"/></thermophysical_models></Code_Saturne_GUI>"#,
        )
        .unwrap();
        assert_eq!(ThermalRadiationModel::new(&mut case).model(), RadiativeModel::Off);
    }
}
