//! The case document and its on-disk persistence.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::atomic::atomic_write;
use crate::xml::{NodeId, XmlDocument, XmlError};

/// Root element of every case file.
pub const ROOT_TAG: &str = "Code_Saturne_GUI";

const CASE_FORMAT_VERSION: &str = "2.0";

/// Errors that can occur while loading or saving a case.
#[derive(Error, Debug)]
pub enum CaseError {
    #[error("Failed to read case: {0}")]
    Xml(#[from] XmlError),

    #[error("Failed to write case file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Case has never been saved; a file path is required")]
    NoPath,
}

/// Result type for case operations.
pub type CaseResult<T> = Result<T, CaseError>;

/// One simulation case: the XML document plus bookkeeping.
#[derive(Debug, Clone)]
pub struct Case {
    doc: XmlDocument,
    path: Option<PathBuf>,
    new: bool,
    modified: bool,
}

impl Default for Case {
    fn default() -> Self {
        Self::new()
    }
}

impl Case {
    /// Create an empty case with the standard top-level sections.
    pub fn new() -> Self {
        let mut doc = XmlDocument::new(ROOT_TAG);
        let root = doc.root();
        doc.set_attr(root, "study", "");
        doc.set_attr(root, "case", "");
        doc.set_attr(root, "version", CASE_FORMAT_VERSION);
        ensure_skeleton(&mut doc);

        Self {
            doc,
            path: None,
            new: true,
            modified: false,
        }
    }

    /// Parse a case from XML text.
    ///
    /// Missing top-level sections are added; this does not count as a
    /// modification.
    pub fn parse(xml: &str) -> CaseResult<Self> {
        let mut doc = XmlDocument::parse(xml)?;
        let found = doc.tag(doc.root()).to_string();
        if found != ROOT_TAG {
            return Err(XmlError::UnexpectedRoot {
                expected: ROOT_TAG.to_string(),
                found,
            }
            .into());
        }
        ensure_skeleton(&mut doc);

        Ok(Self {
            doc,
            path: None,
            new: false,
            modified: false,
        })
    }

    /// Load a case file.
    pub fn load(path: impl AsRef<Path>) -> CaseResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(XmlError::from)?;
        let mut case = Self::parse(&content)?;
        case.path = Some(path.to_path_buf());
        tracing::debug!("Loaded case from {}", path.display());
        Ok(case)
    }

    /// Read-only access to the document.
    pub fn doc(&self) -> &XmlDocument {
        &self.doc
    }

    /// Mutable access to the document. Marks the case as modified.
    pub fn doc_mut(&mut self) -> &mut XmlDocument {
        self.modified = true;
        &mut self.doc
    }

    /// Root element.
    pub fn root(&self) -> NodeId {
        self.doc.root()
    }

    /// Get (or create) a top-level section such as `thermophysical_models`.
    pub fn section(&mut self, tag: &str) -> NodeId {
        let root = self.doc.root();
        self.init_child(root, tag, &[])
    }

    /// Get (or create) a direct child. Only a creation marks the case modified.
    pub fn init_child(&mut self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        match self.doc.child(parent, tag, attrs) {
            Some(id) => id,
            None => self.doc_mut().append_child(parent, tag, attrs),
        }
    }

    /// File the case was loaded from or last saved to.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// True until the case is saved for the first time.
    pub fn is_new(&self) -> bool {
        self.new
    }

    /// True when there are unsaved changes.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Study name recorded on the root element.
    pub fn study_name(&self) -> &str {
        self.doc.attr(self.doc.root(), "study").unwrap_or("")
    }

    /// Record the study name.
    pub fn set_study_name(&mut self, name: &str) {
        let root = self.doc.root();
        self.doc_mut().set_attr(root, "study", name);
    }

    /// Case name recorded on the root element.
    pub fn case_name(&self) -> &str {
        self.doc.attr(self.doc.root(), "case").unwrap_or("")
    }

    /// Record the case name.
    pub fn set_case_name(&mut self, name: &str) {
        let root = self.doc.root();
        self.doc_mut().set_attr(root, "case", name);
    }

    /// Names of the meshes listed under `solution_domain/meshes_list`.
    pub fn meshes(&self) -> Vec<String> {
        let doc = &self.doc;
        let Some(domain) = doc.child(doc.root(), "solution_domain", &[]) else {
            return Vec::new();
        };
        let Some(list) = doc.child(domain, "meshes_list", &[]) else {
            return Vec::new();
        };
        doc.children(list, "mesh", &[])
            .into_iter()
            .filter_map(|id| doc.attr(id, "name").map(str::to_string))
            .collect()
    }

    /// Add a mesh to the mesh list (no-op if already listed).
    pub fn add_mesh(&mut self, name: &str) {
        let domain = self.section("solution_domain");
        let doc = self.doc_mut();
        let list = doc.init_child(domain, "meshes_list", &[]);
        doc.init_child(list, "mesh", &[("name", name)]);
    }

    /// Serialize the document.
    pub fn to_xml_string(&self) -> String {
        self.doc.to_xml_string()
    }

    /// Save to the path the case was loaded from or last saved to.
    pub fn save(&mut self) -> CaseResult<()> {
        let path = self.path.clone().ok_or(CaseError::NoPath)?;
        self.save_as(path)
    }

    /// Save to a new path, which becomes the case path.
    ///
    /// Removed nodes are reclaimed first, so node ids taken before saving
    /// must be looked up again.
    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> CaseResult<()> {
        let path = path.into();
        let dropped = self.doc.compact();
        if dropped > 0 {
            tracing::trace!("Reclaimed {} removed nodes", dropped);
        }
        atomic_write(&path, &self.doc.to_xml_string()).map_err(|source| CaseError::Write {
            path: path.clone(),
            source,
        })?;

        tracing::debug!("Saved case to {}", path.display());
        self.path = Some(path);
        self.new = false;
        self.modified = false;
        Ok(())
    }
}

fn ensure_skeleton(doc: &mut XmlDocument) {
    let root = doc.root();
    let domain = doc.init_child(root, "solution_domain", &[]);
    doc.init_child(domain, "meshes_list", &[]);
    doc.init_child(root, "thermophysical_models", &[]);
    let properties = doc.init_child(root, "physical_properties", &[]);
    doc.init_child(properties, "fluid_properties", &[]);
    doc.init_child(root, "boundary_conditions", &[]);
    doc.init_child(root, "numerical_parameters", &[]);
    doc.init_child(root, "calculation_management", &[]);
}
