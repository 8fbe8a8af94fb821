//! Boundary zones (`boundary_conditions`).

use crate::case::Case;
use crate::xml::NodeId;

use super::enums::xml_enum;
use super::error::{ModelError, ModelResult};

xml_enum! {
    /// Kind of boundary condition applied on a zone.
    ZoneNature, "boundary nature" {
        Inlet => "inlet",
        Outlet => "outlet",
        Wall => "wall",
        Symmetry => "symmetry",
        FreeInletOutlet => "free_inlet_outlet",
    }
}

/// One `<boundary label=.. nature=..>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryZone {
    pub label: String,
    pub nature: ZoneNature,
}

/// Number of zones declared in a case, without touching the document.
pub fn zone_count(case: &Case) -> usize {
    let doc = case.doc();
    doc.child(doc.root(), "boundary_conditions", &[])
        .map(|node| doc.children(node, "boundary", &[]).len())
        .unwrap_or(0)
}

/// Zone list and per-zone condition nodes.
pub struct BoundaryZones<'a> {
    case: &'a mut Case,
    node: NodeId,
}

impl<'a> BoundaryZones<'a> {
    pub fn new(case: &'a mut Case) -> Self {
        let node = case.section("boundary_conditions");
        Self { case, node }
    }

    /// Defined zones, in declaration order. Entries with an unknown nature
    /// are skipped.
    pub fn zones(&self) -> Vec<BoundaryZone> {
        let doc = self.case.doc();
        doc.children(self.node, "boundary", &[])
            .into_iter()
            .filter_map(|id| {
                let label = doc.attr(id, "label")?.to_string();
                let nature = doc.attr(id, "nature")?.parse().ok()?;
                Some(BoundaryZone { label, nature })
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.zones().is_empty()
    }

    /// Declare a zone and create its condition node (`<inlet label=..>`, ...).
    pub fn add_zone(&mut self, label: &str, nature: ZoneNature) -> ModelResult<()> {
        let node = self.node;
        if self
            .case
            .doc()
            .child(node, "boundary", &[("label", label)])
            .is_some()
        {
            return Err(ModelError::DuplicateZone(label.to_string()));
        }

        let index = (self.case.doc().children(node, "boundary", &[]).len() + 1).to_string();
        let doc = self.case.doc_mut();
        doc.append_child(
            node,
            "boundary",
            &[("label", label), ("name", index.as_str()), ("nature", nature.as_str())],
        );
        doc.init_child(node, nature.as_str(), &[("label", label)]);
        tracing::debug!("Added {} zone '{}'", nature, label);
        Ok(())
    }

    /// Remove gas combustion data from every inlet condition.
    ///
    /// Returns the number of removed nodes.
    pub fn delete_gas_data(&mut self) -> usize {
        let node = self.node;
        let inlets = self.case.doc().children(node, "inlet", &[]);
        if inlets.is_empty() {
            return 0;
        }

        let doc = self.case.doc_mut();
        let mut removed = 0;
        for inlet in inlets {
            removed += doc.remove_children(inlet, "gas", &[]);
            for vp in doc.children(inlet, "velocity_pressure", &[]) {
                removed += doc.remove_children(vp, "gas", &[]);
            }
        }
        if removed > 0 {
            tracing::debug!("Removed {} inlet gas data node(s)", removed);
        }
        removed
    }
}
