//! Typed accessors over case sub-trees.
//!
//! Each model borrows a [`Case`](crate::case::Case) mutably and reads or
//! edits one part of its document. Getters create missing nodes with their
//! default values; setters validate their input and leave the sub-tree
//! consistent with the selection (data belonging to a previously selected
//! model or option is removed).

mod boundary;
mod enums;
mod error;
mod gas_combustion;
mod performance_tuning;
mod thermal;
mod thermochemistry;
mod validate;
mod variables;

pub use boundary::{zone_count, BoundaryZone, BoundaryZones, ZoneNature};
pub use enums::{
    BlockIoMethod, CombustionOption, GasCombustion, PartitionOutput, PartitionType,
    RadiativeModel, SootModel, ThermalModel,
};
pub(crate) use enums::xml_enum;
pub use error::{ModelError, ModelResult};
pub use gas_combustion::GasCombustionModel;
pub use performance_tuning::{PerformanceTuningModel, DEFAULT_MIN_BLOCK_SIZE};
pub use thermal::{ThermalRadiationModel, ThermalScalarModel};
pub use thermochemistry::{
    element_counts, Species, ThermochemistryData, CHEMICAL_ELEMENTS, DEFAULT_MAX_TEMPERATURE,
    DEFAULT_MIN_TEMPERATURE, DEFAULT_POINTS,
};
pub use validate::{on_off, parse_on_off};
pub use variables::EquationParameters;
