//! Tagged result tree.
//!
//! The backend answers a frequency distribution with nested
//! `{ key, interactions, unique_authors, child: { results: [...] } }` objects.
//! Each node is classified once at parse time: a node with a `child` is a
//! `Branch`, a node without one is a `Leaf` and carries the counts.

/// A node of a frequency distribution result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultNode {
    /// Category whose breakdown continues one level down
    Branch {
        key: String,
        children: Vec<ResultNode>,
    },

    /// Innermost category holding the counts
    Leaf {
        key: String,
        interactions: u64,
        unique_authors: u64,
    },
}

impl ResultNode {
    /// Create a leaf node
    pub fn leaf(key: impl Into<String>, interactions: u64, unique_authors: u64) -> Self {
        ResultNode::Leaf {
            key: key.into(),
            interactions,
            unique_authors,
        }
    }

    /// Create a branch node
    pub fn branch(key: impl Into<String>, children: Vec<ResultNode>) -> Self {
        ResultNode::Branch {
            key: key.into(),
            children,
        }
    }

    /// Category label of this node (unescaped)
    pub fn key(&self) -> &str {
        match self {
            ResultNode::Branch { key, .. } | ResultNode::Leaf { key, .. } => key,
        }
    }

    /// Levels on the longest path from this node down to a leaf
    ///
    /// A leaf is one level; an empty branch still counts as its own level.
    pub fn depth(&self) -> usize {
        match self {
            ResultNode::Leaf { .. } => 1,
            ResultNode::Branch { children, .. } => {
                1 + children.iter().map(Self::depth).max().unwrap_or(0)
            }
        }
    }

    /// Number of leaves under (and including) this node
    pub fn leaf_count(&self) -> usize {
        match self {
            ResultNode::Leaf { .. } => 1,
            ResultNode::Branch { children, .. } => children.iter().map(Self::leaf_count).sum(),
        }
    }
}
