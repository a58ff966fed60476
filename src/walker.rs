use std::collections::HashMap;
use std::path::PathBuf;

use markup5ever_rcdom::Handle;
use tracing::{debug, warn};
use url::Url;

use crate::fetcher::ResourceFetcher;
use crate::file_manager::{ResourceKind, SaveTarget};
use crate::html_parser::{element_name, get_node_attrs, set_nth_node_attr};
use crate::resolver::{self, Skip};

const SOURCE_ATTR: &str = "src";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenResource {
    pub kind: ResourceKind,
    pub original: String,
    pub url: Url,
    pub local_path: String,
}

/// Outcome of one walk. `rewritten` is in document order.
#[derive(Debug, Default, Clone)]
pub struct WalkReport {
    pub rewritten: Vec<RewrittenResource>,
    pub skipped: usize,
    pub failed: usize,
}

/// Rewrites same-origin `img`/`script` sources in a document to local copies.
pub struct DocumentWalker<'a> {
    base_url: &'a Url,
    targets: &'a SaveTarget,
    fetcher: &'a ResourceFetcher,
    written: HashMap<PathBuf, Url>,
    report: WalkReport,
}

impl<'a> DocumentWalker<'a> {
    pub fn new(base_url: &'a Url, targets: &'a SaveTarget, fetcher: &'a ResourceFetcher) -> Self {
        Self {
            base_url,
            targets,
            fetcher,
            written: HashMap::new(),
            report: WalkReport::default(),
        }
    }

    /// Depth-first, pre-order walk of every node under `document`. Downloads run
    /// one at a time in document order. Only attribute values change; each node's
    /// children are taken from a snapshot of its child list when it is visited.
    pub async fn rewrite(mut self, document: &Handle) -> WalkReport {
        let mut stack = vec![document.clone()];

        while let Some(node) = stack.pop() {
            self.visit(&node).await;

            let children: Vec<Handle> = node.children.borrow().clone();
            stack.extend(children.into_iter().rev());
        }

        self.report
    }

    async fn visit(&mut self, node: &Handle) {
        let Some(kind) = element_name(node).as_deref().and_then(ResourceKind::from_tag) else {
            return;
        };

        for (index, reference) in get_node_attrs(node, SOURCE_ATTR).into_iter().enumerate() {
            let Some(rewritten) = self.localize(kind, &reference).await else {
                continue;
            };

            if set_nth_node_attr(node, SOURCE_ATTR, index, &rewritten.local_path) {
                self.report.rewritten.push(rewritten);
            }
        }
    }

    async fn localize(&mut self, kind: ResourceKind, reference: &str) -> Option<RewrittenResource> {
        let url = match resolver::resolve(reference, self.base_url) {
            Ok(url) => url,
            Err(skip) => {
                match &skip {
                    Skip::CrossOrigin(_) => debug!(reference, "Skipping external resource"),
                    _ => debug!(reference, %skip, "Skipping invalid resource URL"),
                }
                self.report.skipped += 1;
                return None;
            }
        };

        let target_dir = self.targets.dir_for(kind);
        let filename = match self.fetcher.fetch(&url, &target_dir).await {
            Ok(filename) => filename,
            Err(e) => {
                warn!(%url, error = %e, "Failed to download resource");
                self.report.failed += 1;
                return None;
            }
        };

        let file_path = target_dir.join(&filename);
        if let Some(previous) = self.written.insert(file_path.clone(), url.clone()) {
            if previous != url {
                warn!(
                    path = ?file_path,
                    %previous,
                    current = %url,
                    "Resource overwrote a file written earlier in this run"
                );
            }
        }

        Some(RewrittenResource {
            kind,
            original: reference.to_string(),
            local_path: self.targets.local_reference(kind, &filename),
            url,
        })
    }
}
