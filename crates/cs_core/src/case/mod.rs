//! Case documents.
//!
//! A [`Case`] owns the XML document describing one simulation setup
//! (`DATA/setup.xml`). Every model wrapper in [`crate::models`] borrows the
//! case mutably and edits its sub-tree in place; the case tracks whether it
//! has unsaved changes.
//!
//! # Example
//!
//! ```no_run
//! use cs_core::case::Case;
//!
//! let mut case = Case::load("STUDY/CASE1/DATA/setup.xml").unwrap();
//! case.set_case_name("CASE1");
//! case.save().unwrap();
//! ```

mod document;

pub use document::{Case, CaseError, CaseResult, ROOT_TAG};
