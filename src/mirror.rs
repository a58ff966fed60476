use std::path::PathBuf;

use reqwest::{Client, ClientBuilder};
use tokio::fs;
use tracing::info;
use url::Url;

use crate::error::{MirrorError, Result};
use crate::fetcher::ResourceFetcher;
use crate::file_manager::{FilenamePolicy, SaveTarget};
use crate::html_parser::{parse_html, serialize_document};
use crate::walker::{DocumentWalker, WalkReport};

pub const DEFAULT_USER_AGENT: &str = "DecoyMirror/1.0";

#[derive(Debug, Clone)]
pub struct MirrorOptions {
    pub user_agent: String,
    pub filename_policy: FilenamePolicy,
}

impl Default for MirrorOptions {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            filename_policy: FilenamePolicy::default(),
        }
    }
}

#[derive(Debug)]
pub struct MirrorReport {
    pub document_path: PathBuf,
    pub walk: WalkReport,
}

/// Mirrors one page into a `SaveTarget`: fetch, parse, rewrite, serialize.
pub struct DocumentMirror {
    client: Client,
    fetcher: ResourceFetcher,
    targets: SaveTarget,
}

impl DocumentMirror {
    pub fn new(targets: SaveTarget, options: &MirrorOptions) -> Result<Self> {
        let client = Self::build_http_client(&options.user_agent)?;
        let fetcher = ResourceFetcher::new(client.clone(), options.filename_policy);

        Ok(Self {
            client,
            fetcher,
            targets,
        })
    }

    fn build_http_client(user_agent: &str) -> Result<Client> {
        // No timeout: a stalled origin stalls the run, as with a plain GET.
        ClientBuilder::new()
            .use_rustls_tls()
            .user_agent(user_agent)
            .build()
            .map_err(MirrorError::Client)
    }

    pub fn targets(&self) -> &SaveTarget {
        &self.targets
    }

    /// Fetches `page_url`, localizes its same-origin images and scripts and
    /// writes the rewritten document to `output_name` under the output root.
    ///
    /// Page fetch and parse failures abort before anything is written. A failed
    /// document write leaves the downloaded resources on disk.
    pub async fn mirror(&self, page_url: &Url, output_name: &str) -> Result<MirrorReport> {
        let document_path = self.targets.document_path(output_name)?;

        info!(%page_url, "Fetching page");
        let response = self
            .client
            .get(page_url.clone())
            .send()
            .await
            .map_err(|source| MirrorError::PageRequest {
                url: page_url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MirrorError::PageStatus {
                url: page_url.clone(),
                status,
            });
        }

        let content = response
            .bytes()
            .await
            .map_err(|source| MirrorError::PageBody {
                url: page_url.clone(),
                source,
            })?;

        let dom = parse_html(&content).map_err(MirrorError::Parse)?;

        let walk = DocumentWalker::new(page_url, &self.targets, &self.fetcher)
            .rewrite(&dom.document)
            .await;
        info!(
            rewritten = walk.rewritten.len(),
            skipped = walk.skipped,
            failed = walk.failed,
            "Rewrote resource references"
        );

        let html = serialize_document(&dom).map_err(MirrorError::Serialize)?;

        if let Some(parent) = document_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| MirrorError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        fs::write(&document_path, html)
            .await
            .map_err(|source| MirrorError::Write {
                path: document_path.clone(),
                source,
            })?;

        info!(path = ?document_path, "Modified HTML saved");
        Ok(MirrorReport {
            document_path,
            walk,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_basic_mirror_setup() {
        let temp_dir = tempdir().unwrap();
        let mirror =
            DocumentMirror::new(SaveTarget::new(temp_dir.path()), &MirrorOptions::default()).unwrap();

        assert_eq!(mirror.targets().root(), temp_dir.path());
        assert_eq!(mirror.fetcher.policy(), FilenamePolicy::Overwrite);
    }

    #[tokio::test]
    async fn test_invalid_output_name_fails_before_fetch() {
        let temp_dir = tempdir().unwrap();
        let mirror =
            DocumentMirror::new(SaveTarget::new(temp_dir.path()), &MirrorOptions::default()).unwrap();
        // Nothing listens here; the name check must fail first.
        let url = Url::parse("http://127.0.0.1:1/index.html").unwrap();

        let result = mirror.mirror(&url, "../outside.html").await;
        assert!(matches!(result, Err(MirrorError::InvalidOutputName { .. })));
    }
}
