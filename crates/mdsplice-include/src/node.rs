//! The include node tree.
//!
//! Every resolved directive becomes an [`IncludeNode`] in an arena owned by
//! one document run. `children` are owned (arena ids populated as nested
//! directives resolve); `parent` is a non-owning back-reference used for
//! relative-locator resolution and cycle-chain walking, so the graph never
//! forms an ownership cycle.

use std::path::PathBuf;

use mdsplice_clip::Clipping;
use url::Url;

/// Index of a node within an [`IncludeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// How an inclusion's content is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IncludeKind {
    /// Content is wrapped in a synthetic fenced-code envelope; it never
    /// recurses.
    Code,
    /// Content is parsed as structural markdown and may contain further
    /// directives.
    #[default]
    Markdown,
}

/// One resolved inclusion directive.
///
/// Immutable once its content has been fully processed, except for
/// `children`, which grows while nested directives are being resolved.
#[derive(Debug, Clone)]
pub struct IncludeNode {
    /// Absolute, scheme-validated resource locator.
    pub source: Url,
    /// Ordered clippings; empty means the whole resource.
    pub clippings: Vec<Clipping>,
    /// Content treatment.
    pub kind: IncludeKind,
    /// Cache directory, present only when caching is enabled for this node.
    pub cache_dir: Option<PathBuf>,
    /// Enclosing inclusion, `None` for a root directive.
    pub parent: Option<NodeId>,
    /// Locator of the resource whose text physically contains this
    /// directive, `None` when it sits in the root document.
    pub containing_source: Option<Url>,
    /// 1-based call-site line within the containing source.
    pub line: usize,
    /// Nested inclusions resolved while processing this node's content.
    pub children: Vec<NodeId>,
}

/// Arena of include nodes for one document run, plus the root registry.
///
/// The tree outlives the host document: it is handed back to the caller
/// after the run completes (see `Assembler::into_tree`) so post-processing
/// consumers can walk the full inclusion graph.
#[derive(Debug, Default)]
pub struct IncludeTree {
    nodes: Vec<IncludeNode>,
    roots: Vec<NodeId>,
}

impl IncludeTree {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, attaching it to its parent's children.
    pub(crate) fn alloc(&mut self, node: IncludeNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        if let Some(parent) = node.parent {
            self.nodes[parent.0].children.push(id);
        }
        self.nodes.push(node);
        id
    }

    /// Record a parentless node that finished processing.
    pub(crate) fn mark_root(&mut self, id: NodeId) {
        self.roots.push(id);
    }

    /// Look up a node. Ids are only minted by this tree, so they are always
    /// in bounds.
    #[must_use]
    pub fn get(&self, id: NodeId) -> &IncludeNode {
        &self.nodes[id.0]
    }

    /// Root nodes, in completion order.
    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Walk from `id` up through parents to the root, starting at `id`.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = &IncludeNode> {
        let mut next = Some(id);
        std::iter::from_fn(move || {
            let node = self.get(next?);
            next = node.parent;
            Some(node)
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn node(source: &str, parent: Option<NodeId>, line: usize) -> IncludeNode {
        IncludeNode {
            source: Url::parse(source).unwrap(),
            clippings: Vec::new(),
            kind: IncludeKind::Markdown,
            cache_dir: None,
            parent,
            containing_source: None,
            line,
            children: Vec::new(),
        }
    }

    #[test]
    fn test_alloc_attaches_to_parent() {
        let mut tree = IncludeTree::new();
        let root = tree.alloc(node("file:///root.md", None, 1));
        let child = tree.alloc(node("file:///child.md", Some(root), 4));

        assert_eq!(tree.get(root).children, vec![child]);
        assert_eq!(tree.get(child).parent, Some(root));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_roots_in_completion_order() {
        let mut tree = IncludeTree::new();
        let a = tree.alloc(node("file:///a.md", None, 1));
        let b = tree.alloc(node("file:///b.md", None, 9));
        tree.mark_root(b);
        tree.mark_root(a);

        assert_eq!(tree.roots(), [b, a]);
    }

    #[test]
    fn test_ancestors_walk_upward() {
        let mut tree = IncludeTree::new();
        let a = tree.alloc(node("file:///a.md", None, 1));
        let b = tree.alloc(node("file:///b.md", Some(a), 2));
        let c = tree.alloc(node("file:///c.md", Some(b), 3));

        let chain: Vec<&str> = tree.ancestors(c).map(|n| n.source.as_str()).collect();
        assert_eq!(chain, vec!["file:///c.md", "file:///b.md", "file:///a.md"]);
    }
}
