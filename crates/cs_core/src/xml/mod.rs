//! In-memory XML tree used to hold a case document.
//!
//! The tree is an arena of nodes addressed by [`NodeId`]. Ids are cheap to
//! copy and stay valid across unrelated edits, so model wrappers can keep
//! the ids of the sub-nodes they manage instead of borrowing into the tree.
//! Detached nodes are reclaimed by [`XmlDocument::compact`], which saving a
//! case runs.
//!
//! - Parsing goes through `roxmltree`
//! - Serialization is a small pretty printer (two-space indent)
//! - Typed "data children" (`<tag>value</tag>`) cover most of the case schema
//!
//! # Example
//!
//! ```
//! use cs_core::xml::XmlDocument;
//!
//! let mut doc = XmlDocument::new("Code_Saturne_GUI");
//! let root = doc.root();
//! let models = doc.init_child(root, "thermophysical_models", &[]);
//! let gas = doc.init_child(models, "gas_combustion", &[("model", "off")]);
//! doc.set_f64(gas, "soot_density", 0.0);
//!
//! assert_eq!(doc.get_f64(gas, "soot_density"), Some(0.0));
//! assert!(doc.to_xml_string().contains("<soot_density>0.0</soot_density>"));
//! ```

mod document;
mod error;
mod parse;
mod value;
mod writer;

pub use document::{NodeId, XmlDocument};
pub use error::{XmlError, XmlResult};
pub use value::format_float;
