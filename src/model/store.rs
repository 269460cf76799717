use std::collections::HashMap;

use super::interner::IdInterner;
use super::node::{Node, NodeDecl, NodeId, NodeKind, OpenState};

/// A declaration set that cannot form a tree. Always fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructuralError {
    #[error("node id '{0}' is declared more than once")]
    DuplicateId(String),
    #[error("node id is empty (label '{0}')")]
    EmptyId(String),
    #[error("container '{0}' has no group_key for its children")]
    MissingGroupKey(String),
    #[error("group '{group}' is declared by both '{first}' and '{second}'")]
    DuplicateGroup {
        group: String,
        first: String,
        second: String,
    },
    #[error("leaf '{leaf}' declares children (e.g. '{child}' in group '{group}')")]
    LeafWithChildren {
        leaf: String,
        group: String,
        child: String,
    },
    #[error("leaf '{leaf}' declares group_key '{group}', only containers may")]
    LeafGroupKey { leaf: String, group: String },
    #[error("node '{node}' refers to unknown parent group '{group}'")]
    UnknownGroup { node: String, group: String },
    #[error("node '{0}' is not reachable from any root (group cycle)")]
    Unreachable(String),
}

/// Arena of nodes with explicit parent/child indices, built once per load.
#[derive(Debug, Clone)]
pub struct NodeStore {
    nodes: Vec<Node>,
    keys: IdInterner,
    roots: Vec<NodeId>,
    /// Depth-first enumeration of every node
    total_order: Vec<NodeId>,
}

impl NodeStore {
    /// Build the arena from declarations (declaration order is preserved for
    /// siblings).
    pub fn build(decls: &[NodeDecl]) -> Result<NodeStore, StructuralError> {
        let mut keys = IdInterner::new();
        for decl in decls {
            if decl.id.is_empty() {
                return Err(StructuralError::EmptyId(decl.label.clone()));
            }
            if keys.get(&decl.id).is_some() {
                return Err(StructuralError::DuplicateId(decl.id.clone()));
            }
            keys.intern(&decl.id);
        }

        // group key -> owning container
        let mut groups: HashMap<&str, usize> = HashMap::new();
        for (i, decl) in decls.iter().enumerate() {
            if !decl.container {
                continue;
            }
            let group = decl
                .group_key
                .as_deref()
                .filter(|g| !g.is_empty())
                .ok_or_else(|| StructuralError::MissingGroupKey(decl.id.clone()))?;
            if let Some(&first) = groups.get(group) {
                return Err(StructuralError::DuplicateGroup {
                    group: group.to_string(),
                    first: decls[first].id.clone(),
                    second: decl.id.clone(),
                });
            }
            groups.insert(group, i);
        }

        for decl in decls.iter().filter(|d| !d.container) {
            if let Some(group) = decl.group_key.as_deref() {
                let child = decls
                    .iter()
                    .find(|d| d.parent_group.as_deref() == Some(group));
                return Err(match child {
                    Some(child) => StructuralError::LeafWithChildren {
                        leaf: decl.id.clone(),
                        group: group.to_string(),
                        child: child.id.clone(),
                    },
                    None => StructuralError::LeafGroupKey {
                        leaf: decl.id.clone(),
                        group: group.to_string(),
                    },
                });
            }
        }

        let mut parents: Vec<Option<NodeId>> = Vec::with_capacity(decls.len());
        let mut children: Vec<Vec<NodeId>> = vec![Vec::new(); decls.len()];
        let mut roots = Vec::new();
        for (i, decl) in decls.iter().enumerate() {
            let id = NodeId(i as u32);
            match decl.parent_group.as_deref().filter(|g| !g.is_empty()) {
                None => {
                    parents.push(None);
                    roots.push(id);
                }
                Some(group) => {
                    let owner =
                        groups
                            .get(group)
                            .copied()
                            .ok_or_else(|| StructuralError::UnknownGroup {
                                node: decl.id.clone(),
                                group: group.to_string(),
                            })?;
                    parents.push(Some(NodeId(owner as u32)));
                    children[owner].push(id);
                }
            }
        }

        let mut depths = vec![usize::MAX; decls.len()];
        let mut total_order = Vec::with_capacity(decls.len());
        let mut stack: Vec<(NodeId, usize)> = roots.iter().rev().map(|&r| (r, 0)).collect();
        while let Some((id, depth)) = stack.pop() {
            depths[id.index()] = depth;
            total_order.push(id);
            for &child in children[id.index()].iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        if let Some(i) = depths.iter().position(|&d| d == usize::MAX) {
            return Err(StructuralError::Unreachable(decls[i].id.clone()));
        }

        let nodes = decls
            .iter()
            .enumerate()
            .map(|(i, decl)| Node {
                id: NodeId(i as u32),
                key: decl.id.clone(),
                label: decl.label.clone(),
                help_tag: decl.help_tag.clone(),
                group_key: decl.group_key.clone(),
                parent_group: decl.parent_group.clone(),
                kind: if decl.container {
                    NodeKind::Container {
                        children: std::mem::take(&mut children[i]),
                    }
                } else {
                    NodeKind::Leaf
                },
                parent: parents[i],
                depth: depths[i],
                open: OpenState::from_bool(decl.container && decl.open_by_default),
                open_by_default: decl.open_by_default,
                filtered_out: false,
                advanced: decl.advanced,
                document: decl.document.clone().filter(|d| !d.is_empty()),
            })
            .collect();

        Ok(NodeStore {
            nodes,
            keys,
            roots,
            total_order,
        })
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Resolve a declared string id to its arena id
    pub fn find(&self, key: &str) -> Option<NodeId> {
        self.keys.get(key).map(NodeId)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.iter_mut()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn total_order(&self) -> &[NodeId] {
        &self.total_order
    }

    /// Ancestors of `id`, nearest first
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            store: self,
            next: self.get(id).parent,
        }
    }

    /// Hidden when the node or any ancestor is advanced and advanced items
    /// are not shown.
    pub fn is_hidden(&self, id: NodeId, show_advanced: bool) -> bool {
        if show_advanced {
            return false;
        }
        self.get(id).advanced || self.ancestors(id).any(|a| self.get(a).advanced)
    }

    /// Number of children that would be displayed under `id`
    pub fn displayable_children(&self, id: NodeId, show_advanced: bool) -> usize {
        self.get(id)
            .children()
            .iter()
            .filter(|&&c| show_advanced || !self.get(c).advanced)
            .count()
    }
}

pub struct Ancestors<'a> {
    store: &'a NodeStore,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.store.get(id).parent;
        Some(id)
    }
}
