use serde::{Deserialize, Serialize};

/// Declarative description of a subtree: a label and its children in
/// top-to-bottom order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Seed {
    pub label: String,
    #[serde(default)]
    pub children: Vec<Seed>,
}

impl Seed {
    pub fn new(label: impl Into<String>, children: Vec<Seed>) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }

    pub fn leaf(label: impl Into<String>) -> Self {
        Self::new(label, Vec::new())
    }

    /// Number of nodes described, including this one.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Seed::node_count).sum::<usize>()
    }
}
