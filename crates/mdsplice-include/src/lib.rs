//! Recursive content-inclusion engine for markdown documents.
//!
//! A document names external resources with `::include[source]{options}`
//! directives; the engine retrieves each resource, applies the requested
//! clippings and whitespace transforms, expands nested directives
//! depth-first, and splices the result into the host document in place of
//! the directive line. Every expansion is recorded in an [`IncludeTree`]
//! the caller gets back after the run.
//!
//! # Example
//!
//! ```
//! use mdsplice_include::{AssemblerConfig, IncludeProcessor};
//! use mdsplice_retrieval::MockRetriever;
//! use url::Url;
//!
//! let base = Url::parse("file:///docs/").unwrap();
//! let retriever = MockRetriever::new()
//!     .with_resource("file:///docs/partial.md", "a\nb\nc\nd\ne");
//!
//! let config = AssemblerConfig::new().with_root_base(base);
//! let mut processor = IncludeProcessor::new(&retriever, config);
//!
//! let doc = "before\n::include[partial.md]{lines=\"2:4\" indent=2}\nafter";
//! let expanded = processor.expand(doc).unwrap();
//! assert_eq!(expanded, "before\n  b\n  c\n  d\nafter");
//!
//! let tree = processor.into_tree();
//! assert_eq!(tree.roots().len(), 1);
//! ```

mod assembler;
mod cycle;
mod directive;
mod error;
mod node;
mod options;
mod processor;
mod resolver;
mod sink;

pub use assembler::{Assembler, AssemblerConfig, DEFAULT_MAX_DEPTH};
pub use cycle::AncestryChain;
pub use directive::{parse_include_line, FenceTracker, IncludeArgs};
pub use error::IncludeError;
pub use node::{IncludeKind, IncludeNode, IncludeTree, NodeId};
pub use options::{resolve_options, ClippingSpec, DirectiveDefaults, IncludeOptions};
pub use processor::IncludeProcessor;
pub use resolver::{
    is_supported_scheme, resolve_source, validate_base, working_dir_base, SUPPORTED_SCHEMES,
};
pub use sink::{BlockSink, Origin, SinkError, StringSink};
