//! Serialization of an [`XmlDocument`] to indented text.

use super::document::{NodeId, XmlDocument};

impl XmlDocument {
    /// Serialize the whole document, XML declaration included.
    pub fn to_xml_string(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
        self.write_element(&mut out, self.root(), 0);
        out
    }

    fn write_element(&self, out: &mut String, id: NodeId, depth: usize) {
        let indent = "  ".repeat(depth);
        let tag = self.tag(id);

        out.push_str(&indent);
        out.push('<');
        out.push_str(tag);
        for (key, value) in self.attributes(id) {
            out.push_str(&format!(" {}=\"{}\"", key, escape_xml(value)));
        }

        let children = self.child_nodes(id);
        match (children.is_empty(), self.text(id)) {
            (true, None) => out.push_str("/>\n"),
            (true, Some(text)) => {
                out.push_str(&format!(">{}</{}>\n", escape_xml(text), tag));
            }
            (false, text) => {
                out.push_str(">\n");
                if let Some(text) = text {
                    out.push_str(&format!("{}  {}\n", indent, escape_xml(text)));
                }
                for &child in children {
                    self.write_element(out, child, depth + 1);
                }
                out.push_str(&format!("{}</{}>\n", indent, tag));
            }
        }
    }
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_nested_elements() {
        let mut doc = XmlDocument::new("Code_Saturne_GUI");
        let root = doc.root();
        doc.set_attr(root, "version", "2.0");
        let part = doc.init_child(root, "partitioning", &[]);
        doc.set_data(part, "type", "scotch");
        doc.append_child(part, "ignore_periodicity", &[("status", "on")]);

        let xml = doc.to_xml_string();
        let expected = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
<Code_Saturne_GUI version=\"2.0\">\n  \
<partitioning>\n    \
<type>scotch</type>\n    \
<ignore_periodicity status=\"on\"/>\n  \
</partitioning>\n\
</Code_Saturne_GUI>\n";
        assert_eq!(xml, expected);
    }

    #[test]
    fn escape_special_characters() {
        let mut doc = XmlDocument::new("a");
        let root = doc.root();
        doc.set_attr(root, "label", "x\"y");
        doc.set_data(root, "formula", "A & <B>");

        let xml = doc.to_xml_string();
        assert!(xml.contains("label=\"x&quot;y\""));
        assert!(xml.contains("<formula>A &amp; &lt;B&gt;</formula>"));
    }

    #[test]
    fn serialized_text_parses_back() {
        let mut doc = XmlDocument::new("a");
        let root = doc.root();
        let species = doc.append_child(root, "variable", &[("label", "specie1")]);
        doc.set_f64(species, "coeff_absorption", 0.35);

        let reparsed = XmlDocument::parse(&doc.to_xml_string()).unwrap();
        let species = reparsed
            .child(reparsed.root(), "variable", &[("label", "specie1")])
            .unwrap();
        assert_eq!(reparsed.get_f64(species, "coeff_absorption"), Some(0.35));
    }
}
