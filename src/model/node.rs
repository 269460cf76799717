use std::fmt;

use serde::{Deserialize, Serialize};

/// Dense index of a node in the store's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Expand/collapse state of a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenState {
    Open,
    Closed,
}

impl OpenState {
    pub fn from_bool(open: bool) -> Self {
        if open { OpenState::Open } else { OpenState::Closed }
    }

    pub fn is_open(self) -> bool {
        self == OpenState::Open
    }
}

/// Whether a node can hold children. Child ids are fixed at build time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Container { children: Vec<NodeId> },
    Leaf,
}

/// A static node declaration, as supplied by the definition file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeDecl {
    /// Stable string key, also used for persisted open state
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub container: bool,
    #[serde(default)]
    pub open_by_default: bool,
    /// Group this container's children declare as their `parent_group`
    #[serde(default)]
    pub group_key: Option<String>,
    /// Group of the container this node belongs to (absent for roots)
    #[serde(default)]
    pub parent_group: Option<String>,
    #[serde(default)]
    pub help_tag: Option<String>,
    #[serde(default)]
    pub advanced: bool,
    /// Panel document holding this node's searchable text
    #[serde(default)]
    pub document: Option<String>,
}

impl NodeDecl {
    pub fn leaf(id: &str, label: &str, parent_group: Option<&str>) -> Self {
        NodeDecl {
            id: id.to_string(),
            label: label.to_string(),
            parent_group: parent_group.map(str::to_string),
            ..Default::default()
        }
    }

    pub fn container(id: &str, label: &str, group_key: &str, parent_group: Option<&str>) -> Self {
        NodeDecl {
            id: id.to_string(),
            label: label.to_string(),
            container: true,
            group_key: Some(group_key.to_string()),
            parent_group: parent_group.map(str::to_string),
            ..Default::default()
        }
    }
}

/// A node in the arena, with its mutable view state
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub key: String,
    pub label: String,
    pub help_tag: Option<String>,
    pub group_key: Option<String>,
    pub parent_group: Option<String>,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    /// Nesting depth (0 = root)
    pub depth: usize,
    pub open: OpenState,
    pub open_by_default: bool,
    pub filtered_out: bool,
    pub advanced: bool,
    pub document: Option<String>,
}

impl Node {
    pub fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Container { .. })
    }

    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Container { children } => children,
            NodeKind::Leaf => &[],
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.is_open()
    }
}
