use serde::{Deserialize, Serialize};

/// A node of the presentation tree
///
/// Serialized externally tagged, so a page reads as
/// `{"container": [{"text": "Hello"}, {"container": [...]}]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentationNode {
    Container(Vec<PresentationNode>),
    Text(String),
}

impl PresentationNode {
    pub fn container(children: Vec<PresentationNode>) -> Self {
        PresentationNode::Container(children)
    }

    pub fn text(value: impl Into<String>) -> Self {
        PresentationNode::Text(value.into())
    }

    /// Number of text leaves, blank ones included
    pub fn leaf_count(&self) -> usize {
        match self {
            PresentationNode::Container(children) => children.iter().map(Self::leaf_count).sum(),
            PresentationNode::Text(_) => 1,
        }
    }

    /// Leaf values in document order
    pub fn texts(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_texts(&mut out);
        out
    }

    fn collect_texts<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            PresentationNode::Container(children) => {
                for child in children {
                    child.collect_texts(out);
                }
            }
            PresentationNode::Text(value) => out.push(value),
        }
    }

    /// Mutable handles to every leaf value, in document order
    ///
    /// This is the only way the walker touches the tree, so translation can
    /// change values but never the shape.
    pub fn texts_mut(&mut self) -> Vec<&mut String> {
        let mut out = Vec::new();
        self.collect_texts_mut(&mut out);
        out
    }

    fn collect_texts_mut<'a>(&'a mut self, out: &mut Vec<&'a mut String>) {
        match self {
            PresentationNode::Container(children) => {
                for child in children {
                    child.collect_texts_mut(out);
                }
            }
            PresentationNode::Text(value) => out.push(value),
        }
    }

    /// Same node kinds in the same positions, ignoring leaf values
    pub fn same_shape(&self, other: &PresentationNode) -> bool {
        match (self, other) {
            (PresentationNode::Container(a), PresentationNode::Container(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_shape(y))
            }
            (PresentationNode::Text(_), PresentationNode::Text(_)) => true,
            _ => false,
        }
    }
}
