//! Arena-backed XML tree with navigation and mutation helpers.

use super::value::format_float;

/// Handle to a node inside an [`XmlDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl Node {
    fn new(tag: &str, parent: Option<NodeId>) -> Self {
        Self {
            tag: tag.to_string(),
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
            parent,
        }
    }
}

/// A mutable XML element tree.
///
/// Only elements, attributes and element text are kept. Removed nodes are
/// detached from their parent and can no longer be reached from the root,
/// but their ids stay valid (reads on them keep working) until
/// [`compact`](Self::compact) reclaims them.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    nodes: Vec<Node>,
    root: NodeId,
}

impl XmlDocument {
    /// Create a document holding a single empty root element.
    pub fn new(root_tag: &str) -> Self {
        Self {
            nodes: vec![Node::new(root_tag, None)],
            root: NodeId(0),
        }
    }

    /// The root element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Element name of a node.
    pub fn tag(&self, id: NodeId) -> &str {
        &self.node(id).tag
    }

    /// Value of an attribute, if present.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id)
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set (or add) an attribute. Existing attributes keep their position.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        let value = value.into();
        let node = self.node_mut(id);
        match node.attributes.iter().position(|(key, _)| key == name) {
            Some(pos) => node.attributes[pos].1 = value,
            None => node.attributes.push((name.to_string(), value)),
        }
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> Option<String> {
        let node = self.node_mut(id);
        let pos = node.attributes.iter().position(|(key, _)| key == name)?;
        Some(node.attributes.remove(pos).1)
    }

    /// All attributes of a node, in document order.
    pub fn attributes(&self, id: NodeId) -> impl Iterator<Item = (&str, &str)> {
        self.node(id)
            .attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Raw text content of a node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.node(id).text.as_deref()
    }

    /// Replace the text content of a node. An empty string clears it.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        let text = text.into();
        self.node_mut(id).text = if text.is_empty() { None } else { Some(text) };
    }

    /// Parent element (`None` for the root and for removed nodes).
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// All child elements, in document order.
    pub fn child_nodes(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    fn matches(&self, id: NodeId, tag: &str, attrs: &[(&str, &str)]) -> bool {
        self.node(id).tag == tag
            && attrs
                .iter()
                .all(|(key, value)| self.attr(id, key) == Some(*value))
    }

    /// First direct child named `tag` carrying every attribute in `attrs`.
    pub fn child(&self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> Option<NodeId> {
        self.node(parent)
            .children
            .iter()
            .copied()
            .find(|&id| self.matches(id, tag, attrs))
    }

    /// Every direct child named `tag` carrying every attribute in `attrs`.
    pub fn children(&self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> Vec<NodeId> {
        self.node(parent)
            .children
            .iter()
            .copied()
            .filter(|&id| self.matches(id, tag, attrs))
            .collect()
    }

    /// Depth-first search below `from` (excluding `from` itself).
    pub fn find(&self, from: NodeId, tag: &str, attrs: &[(&str, &str)]) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.node(from).children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if self.matches(id, tag, attrs) {
                return Some(id);
            }
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        None
    }

    /// Every descendant of `from` matching, in document order.
    pub fn find_all(&self, from: NodeId, tag: &str, attrs: &[(&str, &str)]) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.node(from).children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if self.matches(id, tag, attrs) {
                found.push(id);
            }
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        found
    }

    /// Append a new child element with the given attributes.
    pub fn append_child(&mut self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let id = NodeId(self.nodes.len());
        let mut node = Node::new(tag, Some(parent));
        node.attributes = attrs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        self.nodes.push(node);
        self.node_mut(parent).children.push(id);
        id
    }

    /// Get the matching direct child, creating it if missing.
    pub fn init_child(&mut self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        match self.child(parent, tag, attrs) {
            Some(id) => id,
            None => self.append_child(parent, tag, attrs),
        }
    }

    /// Get the matching descendant, creating a direct child if missing.
    pub fn init_node(&mut self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        match self.find(parent, tag, attrs) {
            Some(id) => id,
            None => self.append_child(parent, tag, attrs),
        }
    }

    /// Detach a node (and its subtree) from the document.
    pub fn remove(&mut self, id: NodeId) {
        if let Some(parent) = self.node(id).parent {
            self.node_mut(parent).children.retain(|&child| child != id);
        }
        self.node_mut(id).parent = None;
    }

    /// Remove every matching direct child. Returns how many were removed.
    pub fn remove_children(&mut self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> usize {
        let doomed = self.children(parent, tag, attrs);
        for id in &doomed {
            self.remove(*id);
        }
        doomed.len()
    }

    /// Whether the node can still be reached from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.node(current).parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Number of nodes in the arena, detached ones included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Drop detached nodes and renumber the others in document order.
    ///
    /// Ids taken before a compaction that drops nodes must not be reused,
    /// except the root's. Returns how many nodes were dropped.
    pub fn compact(&mut self) -> usize {
        let mut remap: Vec<Option<NodeId>> = vec![None; self.nodes.len()];
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            remap[id.0] = Some(NodeId(order.len()));
            order.push(id);
            stack.extend(self.node(id).children.iter().rev().copied());
        }

        let dropped = self.nodes.len() - order.len();
        if dropped == 0 {
            return 0;
        }

        let mut old: Vec<Option<Node>> = std::mem::take(&mut self.nodes)
            .into_iter()
            .map(Some)
            .collect();
        for id in order {
            if let Some(mut node) = old[id.0].take() {
                node.parent = node.parent.and_then(|parent| remap[parent.0]);
                node.children = node
                    .children
                    .iter()
                    .filter_map(|child| remap[child.0])
                    .collect();
                self.nodes.push(node);
            }
        }
        self.root = NodeId(0);
        dropped
    }

    /// Write `<tag>value</tag>` under `parent`, reusing an existing child.
    pub fn set_data(&mut self, parent: NodeId, tag: &str, value: impl Into<String>) -> NodeId {
        let id = self.init_child(parent, tag, &[]);
        self.set_text(id, value);
        id
    }

    /// Write a float data child.
    pub fn set_f64(&mut self, parent: NodeId, tag: &str, value: f64) -> NodeId {
        self.set_data(parent, tag, format_float(value))
    }

    /// Write an integer data child.
    pub fn set_i64(&mut self, parent: NodeId, tag: &str, value: i64) -> NodeId {
        self.set_data(parent, tag, value.to_string())
    }

    /// Trimmed text of the `tag` child; `None` when missing or empty.
    pub fn get_string(&self, parent: NodeId, tag: &str) -> Option<String> {
        let id = self.child(parent, tag, &[])?;
        let text = self.text(id)?.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    /// Float value of the `tag` child; `None` when missing, unparsable or
    /// not finite (`NaN`, `inf`).
    pub fn get_f64(&self, parent: NodeId, tag: &str) -> Option<f64> {
        self.get_string(parent, tag)?
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
    }

    /// Integer value of the `tag` child; `None` when missing or unparsable.
    pub fn get_i64(&self, parent: NodeId, tag: &str) -> Option<i64> {
        self.get_string(parent, tag)?.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (XmlDocument, NodeId) {
        let mut doc = XmlDocument::new("root");
        let root = doc.root();
        let models = doc.append_child(root, "thermophysical_models", &[]);
        doc.append_child(models, "variable", &[("name", "a"), ("label", "A")]);
        doc.append_child(models, "variable", &[("name", "b"), ("label", "B")]);
        doc.append_child(models, "property", &[("name", "a")]);
        (doc, models)
    }

    #[test]
    fn child_matches_tag_and_attributes() {
        let (doc, models) = sample();
        let b = doc.child(models, "variable", &[("name", "b")]).unwrap();
        assert_eq!(doc.attr(b, "label"), Some("B"));
        assert!(doc.child(models, "variable", &[("name", "c")]).is_none());
        assert_eq!(doc.children(models, "variable", &[]).len(), 2);
    }

    #[test]
    fn find_searches_descendants_in_order() {
        let (doc, _) = sample();
        let root = doc.root();
        let first = doc.find(root, "variable", &[]).unwrap();
        assert_eq!(doc.attr(first, "name"), Some("a"));
        assert_eq!(doc.find_all(root, "variable", &[]).len(), 2);
        assert!(doc.child(root, "variable", &[]).is_none());
    }

    #[test]
    fn init_child_reuses_existing() {
        let (mut doc, models) = sample();
        let a = doc.child(models, "property", &[("name", "a")]).unwrap();
        assert_eq!(doc.init_child(models, "property", &[("name", "a")]), a);

        let created = doc.init_child(models, "property", &[("name", "z")]);
        assert_ne!(created, a);
        assert_eq!(doc.attr(created, "name"), Some("z"));
        assert_eq!(doc.children(models, "property", &[]).len(), 2);
    }

    #[test]
    fn remove_children_detaches_nodes() {
        let (mut doc, models) = sample();
        let a = doc.child(models, "variable", &[("name", "a")]).unwrap();
        assert_eq!(doc.remove_children(models, "variable", &[]), 2);
        assert!(doc.children(models, "variable", &[]).is_empty());
        assert!(!doc.is_attached(a));
        assert!(doc.find(doc.root(), "variable", &[]).is_none());
        // Detached nodes are still readable.
        assert_eq!(doc.attr(a, "label"), Some("A"));
    }

    #[test]
    fn set_attr_replaces_in_place() {
        let (mut doc, models) = sample();
        let a = doc.child(models, "variable", &[("name", "a")]).unwrap();
        doc.set_attr(a, "name", "x");
        doc.set_attr(a, "type", "var_model");
        let attrs: Vec<_> = doc.attributes(a).collect();
        assert_eq!(attrs, vec![("name", "x"), ("label", "A"), ("type", "var_model")]);
        assert_eq!(doc.remove_attr(a, "label").as_deref(), Some("A"));
        assert!(doc.attr(a, "label").is_none());
    }

    #[test]
    fn typed_data_children() {
        let (mut doc, models) = sample();
        doc.set_f64(models, "MaximalTemp", 3000.0);
        doc.set_i64(models, "NbPointsTabu", 10);
        doc.set_data(models, "data_file", "  JANAF  ");

        assert_eq!(doc.get_f64(models, "MaximalTemp"), Some(3000.0));
        assert_eq!(doc.get_i64(models, "NbPointsTabu"), Some(10));
        assert_eq!(doc.get_string(models, "data_file").as_deref(), Some("JANAF"));
        assert_eq!(doc.get_f64(models, "data_file"), None);
        assert_eq!(doc.get_f64(models, "missing"), None);

        // Updating reuses the same child.
        doc.set_f64(models, "MaximalTemp", 2500.5);
        assert_eq!(doc.children(models, "MaximalTemp", &[]).len(), 1);
        assert_eq!(doc.get_f64(models, "MaximalTemp"), Some(2500.5));
    }

    #[test]
    fn non_finite_floats_read_as_missing() {
        let (mut doc, models) = sample();
        for text in ["NaN", "inf", "-inf", "infinity"] {
            doc.set_data(models, "soot_density", text);
            assert_eq!(doc.get_f64(models, "soot_density"), None, "{text}");
        }
        doc.set_data(models, "soot_density", "1e-3");
        assert_eq!(doc.get_f64(models, "soot_density"), Some(0.001));
    }

    #[test]
    fn compact_drops_detached_nodes() {
        let (mut doc, models) = sample();
        let before = doc.node_count();
        assert_eq!(doc.compact(), 0);
        assert_eq!(doc.child(doc.root(), "thermophysical_models", &[]), Some(models));

        doc.remove_children(models, "variable", &[]);
        assert_eq!(doc.node_count(), before);
        assert_eq!(doc.compact(), 2);
        assert_eq!(doc.node_count(), before - 2);

        let root = doc.root();
        let models = doc.child(root, "thermophysical_models", &[]).unwrap();
        assert_eq!(doc.parent(models), Some(root));
        let property = doc.child(models, "property", &[]).unwrap();
        assert_eq!(doc.attr(property, "name"), Some("a"));
        assert_eq!(doc.parent(property), Some(models));
        assert!(doc.find(root, "variable", &[]).is_none());

        let added = doc.append_child(models, "variable", &[("name", "c")]);
        assert_eq!(added, NodeId(before - 2));
        assert!(doc.is_attached(added));
    }
}
