//! Helpers for the `variable` and `property` nodes models declare, and for
//! the per-equation numerical parameters attached to them.

use crate::xml::{NodeId, XmlDocument};

/// Get or create a model scalar `<variable name=.. label=.. type="var_model">`.
pub(crate) fn ensure_model_variable(doc: &mut XmlDocument, parent: NodeId, name: &str) -> NodeId {
    if let Some(id) = doc.child(parent, "variable", &[("name", name)]) {
        return id;
    }
    doc.append_child(
        parent,
        "variable",
        &[("name", name), ("label", name), ("type", "var_model")],
    )
}

/// Get or create a model property `<property name=.. label=..>`.
pub(crate) fn ensure_model_property(doc: &mut XmlDocument, parent: NodeId, name: &str) -> NodeId {
    if let Some(id) = doc.child(parent, "property", &[("name", name)]) {
        return id;
    }
    doc.append_child(parent, "property", &[("name", name), ("label", name)])
}

/// Remove every `tag` child whose `name` attribute is not in `keep`.
pub(crate) fn retain_named(doc: &mut XmlDocument, parent: NodeId, tag: &str, keep: &[String]) {
    for id in doc.children(parent, tag, &[]) {
        let stale = doc
            .attr(id, "name")
            .map_or(true, |name| !keep.iter().any(|k| k == name));
        if stale {
            tracing::debug!("Removing stale {} {:?}", tag, doc.attr(id, "name"));
            doc.remove(id);
        }
    }
}

/// Get or create a fluid property (`fluid_properties/property@name`).
pub(crate) fn ensure_fluid_property(doc: &mut XmlDocument, fluid: NodeId, name: &str) -> NodeId {
    if let Some(id) = doc.child(fluid, "property", &[("name", name)]) {
        return id;
    }
    doc.append_child(
        fluid,
        "property",
        &[("name", name), ("label", name), ("choice", "constant")],
    )
}

/// Remove a fluid property. Returns whether one was present.
pub(crate) fn remove_fluid_property(doc: &mut XmlDocument, fluid: NodeId, name: &str) -> bool {
    doc.remove_children(fluid, "property", &[("name", name)]) > 0
}

/// Numerical parameters of one transported scalar.
///
/// Written as children of the `variable` node:
/// `<blending_factor>`, `<order_scheme choice=..>`,
/// `<flux_reconstruction status=..>`, `<min_value>`, `<max_value>`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquationParameters {
    pub blending_factor: f64,
    pub scheme: &'static str,
    pub flux_reconstruction: bool,
}

impl EquationParameters {
    /// First-order, non-reconstructed settings used by combustion scalars.
    pub const UPWIND: Self = Self {
        blending_factor: 0.0,
        scheme: "upwind",
        flux_reconstruction: false,
    };

    pub(crate) fn apply(&self, doc: &mut XmlDocument, variable: NodeId) {
        doc.set_f64(variable, "blending_factor", self.blending_factor);
        let scheme = doc.init_child(variable, "order_scheme", &[]);
        doc.set_attr(scheme, "choice", self.scheme);
        let flux = doc.init_child(variable, "flux_reconstruction", &[]);
        doc.set_attr(flux, "status", super::validate::on_off(self.flux_reconstruction));
    }
}

/// Clip a scalar to `[min, max]`.
pub(crate) fn set_clipping(doc: &mut XmlDocument, variable: NodeId, min: f64, max: f64) {
    doc.set_f64(variable, "min_value", min);
    doc.set_f64(variable, "max_value", max);
}
