//! Document-level directive processing.
//!
//! [`IncludeProcessor`] scans a host document line by line, expanding each
//! inclusion directive through an [`Assembler`] and passing everything else
//! through untouched.

use mdsplice_retrieval::ContentRetriever;
use tracing::debug;

use crate::assembler::{Assembler, AssemblerConfig};
use crate::directive::{parse_include_line, FenceTracker};
use crate::error::IncludeError;
use crate::node::IncludeTree;
use crate::options::resolve_options;
use crate::sink::{BlockSink, StringSink};

/// Expands inclusion directives in a host document.
pub struct IncludeProcessor<'a> {
    assembler: Assembler<'a>,
}

impl<'a> IncludeProcessor<'a> {
    /// Create a processor over a retriever.
    #[must_use]
    pub fn new(retriever: &'a dyn ContentRetriever, config: AssemblerConfig) -> Self {
        Self {
            assembler: Assembler::new(retriever, config),
        }
    }

    /// Process one document, pushing the expanded output into `sink`.
    ///
    /// Directives inside fenced code blocks are passed through verbatim.
    ///
    /// # Errors
    ///
    /// The first [`IncludeError`] aborts the run; content errors carry
    /// provenance for every inclusion level they crossed.
    pub fn process(
        &mut self,
        document: &str,
        sink: &mut dyn BlockSink,
    ) -> Result<(), IncludeError> {
        let mut fence = FenceTracker::new();
        for (i, line) in document.lines().enumerate() {
            let line_no = i + 1;
            let in_fence_before = fence.in_fence();
            fence.update(line);

            if !in_fence_before && !fence.in_fence() {
                if let Some(args) = parse_include_line(line) {
                    debug!(line = line_no, "expanding root directive");
                    let (options, defaults) = resolve_options(&args)?;
                    if let Some(base) = defaults.base {
                        self.assembler.set_root_base(base);
                    }
                    self.assembler.process(options, line_no, sink)?;
                    continue;
                }
            }
            sink.push_line(line, None)?;
        }
        Ok(())
    }

    /// Process one document and return the expanded text.
    ///
    /// # Errors
    ///
    /// See [`IncludeProcessor::process`].
    pub fn expand(&mut self, document: &str) -> Result<String, IncludeError> {
        let mut sink = StringSink::new();
        self.process(document, &mut sink)?;
        Ok(sink.into_string())
    }

    /// The include tree built so far.
    #[must_use]
    pub fn tree(&self) -> &IncludeTree {
        self.assembler.tree()
    }

    /// Consume the processor, handing the include tree to the caller.
    #[must_use]
    pub fn into_tree(self) -> IncludeTree {
        self.assembler.into_tree()
    }
}

#[cfg(test)]
mod tests {
    use mdsplice_retrieval::MockRetriever;
    use pretty_assertions::assert_eq;
    use url::Url;

    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn processor(retriever: &MockRetriever) -> IncludeProcessor<'_> {
        IncludeProcessor::new(
            retriever,
            AssemblerConfig::new().with_root_base(url("file:///docs/")),
        )
    }

    #[test]
    fn test_document_without_directives_passes_through() {
        let retriever = MockRetriever::new();
        let mut processor = processor(&retriever);

        let doc = "# Title\n\nplain paragraph";
        assert_eq!(processor.expand(doc).unwrap(), doc);
        assert!(processor.tree().is_empty());
        assert!(retriever.requests().is_empty());
    }

    #[test]
    fn test_directive_expands_in_place() {
        let retriever = MockRetriever::new()
            .with_resource("file:///docs/partial.md", "a\nb\nc\nd\ne");
        let mut processor = processor(&retriever);

        let doc = "before\n::include[partial.md]{lines=\"2:4\" indent=2}\nafter";
        assert_eq!(
            processor.expand(doc).unwrap(),
            "before\n  b\n  c\n  d\nafter"
        );

        let tree = processor.into_tree();
        assert_eq!(tree.roots().len(), 1);
        let root = tree.get(tree.roots()[0]);
        assert_eq!(root.source.as_str(), "file:///docs/partial.md");
        assert!(root.children.is_empty());
    }

    #[test]
    fn test_directive_inside_fence_is_verbatim() {
        let retriever = MockRetriever::new();
        let mut processor = processor(&retriever);

        let doc = "```\n::include[a.md]\n```";
        assert_eq!(processor.expand(doc).unwrap(), doc);
        assert!(retriever.requests().is_empty());
    }

    #[test]
    fn test_base_option_applies_to_later_directives() {
        let retriever = MockRetriever::new()
            .with_resource("https://example.com/pub/a.md", "remote");
        let mut processor = processor(&retriever);

        let doc = "::include[a.md]{base=\"https://example.com/pub/\"}";
        assert_eq!(processor.expand(doc).unwrap(), "remote");
    }

    #[test]
    fn test_multiple_roots_build_one_tree() {
        let retriever = MockRetriever::new()
            .with_resource("file:///docs/a.md", "one")
            .with_resource("file:///docs/b.md", "two");
        let mut processor = processor(&retriever);

        let doc = "::include[a.md]\nmiddle\n::include[b.md]";
        assert_eq!(processor.expand(doc).unwrap(), "one\nmiddle\ntwo");

        let tree = processor.into_tree();
        assert_eq!(tree.roots().len(), 2);
        assert_eq!(tree.get(tree.roots()[0]).line, 1);
        assert_eq!(tree.get(tree.roots()[1]).line, 3);
    }

    #[test]
    fn test_error_reports_offending_option() {
        let retriever = MockRetriever::new();
        let mut processor = processor(&retriever);

        let err = processor
            .expand("::include[a.md]{lines=\"x\"}")
            .unwrap_err();
        assert!(
            matches!(err, IncludeError::InvalidOption { ref field, .. } if field == "lines")
        );
    }

    #[test]
    fn test_code_inclusion_end_to_end() {
        let retriever = MockRetriever::new()
            .with_resource("file:///docs/ex.rs", "fn main() {\n    run();\n}");
        let mut processor = processor(&retriever);

        let doc = "::include[ex.rs]{kind=\"code\" lang=\"rust\"}";
        assert_eq!(
            processor.expand(doc).unwrap(),
            "```rust\nfn main() {\n    run();\n}\n```"
        );
    }
}
