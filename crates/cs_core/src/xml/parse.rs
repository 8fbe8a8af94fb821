//! Building an [`XmlDocument`] from text with `roxmltree`.

use std::path::Path;

use super::document::{NodeId, XmlDocument};
use super::error::{XmlError, XmlResult};

impl XmlDocument {
    /// Parse an XML string.
    ///
    /// Comments and processing instructions are dropped; the text of an
    /// element is the trimmed concatenation of its text children.
    pub fn parse(xml: &str) -> XmlResult<Self> {
        // Remove BOM if present
        let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);

        let parsed = roxmltree::Document::parse(xml)
            .map_err(|e| XmlError::Malformed(format!("XML parse error: {}", e)))?;

        let source_root = parsed.root_element();
        let mut doc = XmlDocument::new(source_root.tag_name().name());
        let root = doc.root();
        copy_element(&mut doc, root, &source_root);

        Ok(doc)
    }

    /// Parse an XML file.
    pub fn load(path: &Path) -> XmlResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }
}

fn copy_element(doc: &mut XmlDocument, target: NodeId, source: &roxmltree::Node) {
    for attr in source.attributes() {
        doc.set_attr(target, attr.name(), attr.value());
    }

    let mut text = String::new();
    for child in source.children() {
        if child.is_element() {
            let id = doc.append_child(target, child.tag_name().name(), &[]);
            copy_element(doc, id, &child);
        } else if child.is_text() {
            if let Some(chunk) = child.text() {
                text.push_str(chunk);
            }
        }
    }

    let text = text.trim();
    if !text.is_empty() {
        doc.set_text(target, text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Code_Saturne_GUI study="STUDY" case="CASE1" version="2.0">
  <!-- generated -->
  <thermophysical_models>
    <gas_combustion model="d3p" option="extended">
      <data_file>
        JANAF
      </data_file>
      <variable name="mixture_fraction" label="mixture_fraction" type="var_model"/>
    </gas_combustion>
  </thermophysical_models>
</Code_Saturne_GUI>"#;

    #[test]
    fn parse_sample_xml() {
        let doc = XmlDocument::parse(SAMPLE_XML).unwrap();
        let root = doc.root();
        assert_eq!(doc.tag(root), "Code_Saturne_GUI");
        assert_eq!(doc.attr(root, "case"), Some("CASE1"));

        let gas = doc.find(root, "gas_combustion", &[]).unwrap();
        assert_eq!(doc.attr(gas, "option"), Some("extended"));
        assert_eq!(doc.text(gas), None);
        assert_eq!(doc.get_string(gas, "data_file").as_deref(), Some("JANAF"));
        assert_eq!(doc.children(gas, "variable", &[("type", "var_model")]).len(), 1);
    }

    #[test]
    fn parse_strips_bom() {
        let doc = XmlDocument::parse("\u{feff}<a><b>1</b></a>").unwrap();
        assert_eq!(doc.get_i64(doc.root(), "b"), Some(1));
    }

    #[test]
    fn malformed_xml_is_rejected() {
        let err = XmlDocument::parse("<a><b></a>").unwrap_err();
        assert!(matches!(err, XmlError::Malformed(_)));
    }

    #[test]
    fn entities_are_decoded() {
        let doc = XmlDocument::parse(r#"<a name="x &amp; y">&lt;tag&gt;</a>"#).unwrap();
        assert_eq!(doc.attr(doc.root(), "name"), Some("x & y"));
        assert_eq!(doc.text(doc.root()), Some("<tag>"));
    }
}
