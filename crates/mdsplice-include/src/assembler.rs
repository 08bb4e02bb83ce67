//! Recursive assembly of included content.
//!
//! The [`Assembler`] carries the per-run state of one document: the include
//! node tree, the open-ancestry chain for cycle detection, and the run
//! configuration. It expands one directive at a time, depth-first, pushing
//! assembled lines into the host's [`BlockSink`] as it goes.

use std::path::{Path, PathBuf};

use mdsplice_clip::extract_all;
use mdsplice_retrieval::ContentRetriever;
use tracing::debug;
use url::Url;

use crate::cycle::AncestryChain;
use crate::directive::{parse_include_line, FenceTracker};
use crate::error::IncludeError;
use crate::node::{IncludeKind, IncludeNode, IncludeTree, NodeId};
use crate::options::{resolve_options, IncludeOptions};
use crate::resolver;
use crate::sink::{BlockSink, Origin};

/// Default ceiling on non-cyclic nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Directory name for the implicit disk cache under the working directory.
const CACHE_DIR_NAME: &str = ".mdsplice-cache";

/// Per-run configuration for an [`Assembler`].
#[derive(Debug, Clone, Default)]
pub struct AssemblerConfig {
    root_base: Option<Url>,
    max_depth: Option<usize>,
    cache_root: Option<PathBuf>,
}

impl AssemblerConfig {
    /// Create a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Base locator for resolving relative sources in the root document.
    /// Defaults to the process's working directory.
    #[must_use]
    pub fn with_root_base(mut self, base: Url) -> Self {
        self.root_base = Some(base);
        self
    }

    /// Ceiling on nesting depth. Defaults to [`DEFAULT_MAX_DEPTH`].
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Directory used for disk caching when a directive enables `cache`
    /// without naming a directory. Defaults to `.mdsplice-cache` under the
    /// working directory.
    #[must_use]
    pub fn with_cache_root(mut self, cache_root: PathBuf) -> Self {
        self.cache_root = Some(cache_root);
        self
    }
}

/// Depth-first directive expander for one document run.
pub struct Assembler<'a> {
    retriever: &'a dyn ContentRetriever,
    config: AssemblerConfig,
    tree: IncludeTree,
    chain: AncestryChain,
    depth: usize,
}

impl<'a> Assembler<'a> {
    /// Create an assembler over a retriever.
    #[must_use]
    pub fn new(retriever: &'a dyn ContentRetriever, config: AssemblerConfig) -> Self {
        Self {
            retriever,
            config,
            tree: IncludeTree::new(),
            chain: AncestryChain::new(),
            depth: 0,
        }
    }

    /// Set the root-document base locator mid-run.
    ///
    /// Used when the document itself declares a `base` option; it affects
    /// only directives resolved after this call.
    pub fn set_root_base(&mut self, base: Url) {
        self.config.root_base = Some(base);
    }

    /// The include tree built so far.
    #[must_use]
    pub fn tree(&self) -> &IncludeTree {
        &self.tree
    }

    /// Consume the assembler, handing the include tree to the caller.
    #[must_use]
    pub fn into_tree(self) -> IncludeTree {
        self.tree
    }

    /// Expand one directive at `line` of the current containing document,
    /// pushing the assembled output into `sink`.
    ///
    /// # Errors
    ///
    /// Any [`IncludeError`]; failures inside nested content carry
    /// provenance for each level they propagate through.
    pub fn process(
        &mut self,
        options: IncludeOptions,
        line: usize,
        sink: &mut dyn BlockSink,
    ) -> Result<(), IncludeError> {
        let max_depth = self.config.max_depth.unwrap_or(DEFAULT_MAX_DEPTH);
        if self.depth >= max_depth {
            return Err(IncludeError::TooDeep { max: max_depth });
        }

        let raw_source = options.source.as_deref().ok_or(IncludeError::MissingSource)?;
        let cache_dir = self.resolve_cache_dir(&options)?;

        let parent = self.chain.top();
        let containing_source = parent.map(|id| self.tree.get(id).source.clone());
        let parent_source = containing_source.clone();
        let base = match &self.config.root_base {
            Some(base) => base.clone(),
            None => resolver::working_dir_base()?,
        };
        let source = resolver::resolve_source(raw_source, parent_source.as_ref(), &base)?;
        debug!(source = %source, line, depth = self.depth, "resolved inclusion");

        let id = self.tree.alloc(IncludeNode {
            source: source.clone(),
            clippings: options.clippings.clone(),
            kind: options.kind,
            cache_dir: cache_dir.clone(),
            parent,
            containing_source,
            line,
            children: Vec::new(),
        });

        // Only markdown content can recurse, so only it enters the chain.
        let result = if options.kind == IncludeKind::Markdown {
            self.chain.check_and_push(&self.tree, id)?;
            let result = self.splice(id, &options, cache_dir.as_deref(), sink);
            self.chain.pop();
            result
        } else {
            self.splice(id, &options, cache_dir.as_deref(), sink)
        };

        if result.is_ok() && parent.is_none() {
            self.tree.mark_root(id);
        }
        result
    }

    /// Retrieve, clip, and emit one node's content.
    fn splice(
        &mut self,
        id: NodeId,
        options: &IncludeOptions,
        cache_dir: Option<&Path>,
        sink: &mut dyn BlockSink,
    ) -> Result<(), IncludeError> {
        let source = self.tree.get(id).source.clone();
        let lines = self.retriever.get_content(&source, cache_dir)?;
        let clipped =
            extract_all(&lines, &options.clippings).map_err(|inner| IncludeError::Clip {
                source: source.clone(),
                inner,
            })?;

        match options.kind {
            IncludeKind::Code => {
                Self::splice_code(&source, &clipped, options.lang.as_deref(), sink)
            }
            IncludeKind::Markdown => self.splice_markdown(&source, &clipped, sink),
        }
    }

    /// Emit clipped lines wrapped in a synthetic fenced-code envelope.
    fn splice_code(
        source: &Url,
        clipped: &[mdsplice_clip::ClippedLine],
        lang: Option<&str>,
        sink: &mut dyn BlockSink,
    ) -> Result<(), IncludeError> {
        let fence = format!("```{}", lang.unwrap_or_default());
        sink.push_line(&fence, None)?;
        for cl in clipped {
            let origin = cl.line.map(|line| Origin { source, line });
            sink.push_line(&cl.text, origin)?;
        }
        sink.push_line("```", None)?;
        Ok(())
    }

    /// Emit clipped markdown lines, expanding nested directives in place.
    fn splice_markdown(
        &mut self,
        source: &Url,
        clipped: &[mdsplice_clip::ClippedLine],
        sink: &mut dyn BlockSink,
    ) -> Result<(), IncludeError> {
        let mut fence = FenceTracker::new();
        for cl in clipped {
            let in_fence_before = fence.in_fence();
            fence.update(&cl.text);

            // Directive text inside a fence, or injected by before/after,
            // stays inert.
            if !in_fence_before && !fence.in_fence() && cl.line.is_some() {
                if let Some(args) = parse_include_line(&cl.text) {
                    let line_no = cl.line.unwrap_or(0);
                    let (options, defaults) = resolve_options(&args)
                        .map_err(|e| e.with_provenance(source, line_no))?;
                    if let Some(base) = defaults.base {
                        self.set_root_base(base);
                    }
                    self.depth += 1;
                    let result = self.process(options, line_no, sink);
                    self.depth -= 1;
                    result.map_err(|e| e.with_provenance(source, line_no))?;
                    continue;
                }
            }

            let origin = cl.line.map(|line| Origin { source, line });
            sink.push_line(&cl.text, origin)
                .map_err(|e| {
                    IncludeError::from(e).with_provenance(source, cl.line.unwrap_or(0))
                })?;
        }
        Ok(())
    }

    /// Decide the cache directory for one directive.
    fn resolve_cache_dir(
        &self,
        options: &IncludeOptions,
    ) -> Result<Option<PathBuf>, IncludeError> {
        if !options.cache {
            return Ok(None);
        }
        if let Some(dir) = &options.cache_dir {
            if !dir.is_dir() {
                return Err(IncludeError::InvalidCacheDir { path: dir.clone() });
            }
            return Ok(Some(dir.clone()));
        }
        let dir = match &self.config.cache_root {
            Some(root) => root.clone(),
            None => std::env::current_dir()
                .map_err(|e| IncludeError::InvalidSource {
                    value: String::from("."),
                    reason: e.to_string(),
                })?
                .join(CACHE_DIR_NAME),
        };
        std::fs::create_dir_all(&dir)
            .map_err(|_| IncludeError::InvalidCacheDir { path: dir.clone() })?;
        Ok(Some(dir))
    }
}
