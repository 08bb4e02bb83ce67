//! Cycle detection over the ancestry chain.
//!
//! One [`AncestryChain`] exists per document run. It holds the
//! currently-open Markdown-kind inclusions in LIFO order; Code-kind content
//! cannot recurse, so it never enters the chain. A cycle exists when a new
//! directive re-enters a call site that is already open: same containing
//! source, same originating line.

use crate::error::IncludeError;
use crate::node::{IncludeTree, NodeId};

/// LIFO chain of currently-open Markdown inclusions.
#[derive(Debug, Default)]
pub struct AncestryChain {
    open: Vec<NodeId>,
}

impl AncestryChain {
    /// Create an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The innermost open inclusion, if any.
    #[must_use]
    pub fn top(&self) -> Option<NodeId> {
        self.open.last().copied()
    }

    /// Number of open inclusions.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Check `candidate` against every open ancestor and push it.
    ///
    /// # Errors
    ///
    /// Returns [`IncludeError::Cycle`] when an open ancestor shares both
    /// containing source and originating line with the candidate; the
    /// message renders the chain from the outermost ancestor down to the
    /// point of repetition. The candidate is not pushed on failure.
    pub fn check_and_push(
        &mut self,
        tree: &IncludeTree,
        candidate: NodeId,
    ) -> Result<(), IncludeError> {
        let site = tree.get(candidate);
        let repeated = self.open.iter().any(|&id| {
            let open = tree.get(id);
            open.containing_source == site.containing_source && open.line == site.line
        });
        if repeated {
            return Err(IncludeError::Cycle {
                chain: self.render(tree),
            });
        }
        self.open.push(candidate);
        Ok(())
    }

    /// Remove the innermost open inclusion.
    ///
    /// Called unconditionally once a node's content has been processed,
    /// success or failure, so the chain stays consistent for sibling
    /// directives.
    pub fn pop(&mut self) -> Option<NodeId> {
        self.open.pop()
    }

    /// Render the open chain outermost-first, one `source:line` per entry.
    fn render(&self, tree: &IncludeTree) -> String {
        self.open
            .iter()
            .map(|&id| {
                let node = tree.get(id);
                format!("{}:{}", node.source, node.line)
            })
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}
