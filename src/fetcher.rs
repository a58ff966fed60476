use std::path::Path;

use reqwest::Client;
use tokio::fs;
use tracing::debug;
use url::Url;

use crate::error::FetchError;
use crate::file_manager::FilenamePolicy;

/// Downloads single resources into a category directory.
#[derive(Clone)]
pub struct ResourceFetcher {
    client: Client,
    policy: FilenamePolicy,
}

impl ResourceFetcher {
    pub fn new(client: Client, policy: FilenamePolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> FilenamePolicy {
        self.policy
    }

    /// Issues one GET for `url` and writes the body to `target_dir`, returning
    /// the bare file name. The name comes from the URL the response was actually
    /// served from, so redirects decide it. Existing files are overwritten.
    pub async fn fetch(&self, url: &Url, target_dir: &Path) -> Result<String, FetchError> {
        debug!(%url, "requesting resource");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(FetchError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let effective_url = response.url().clone();
        let filename = self
            .policy
            .filename_for(&effective_url)
            .ok_or_else(|| FetchError::NoFilename(effective_url.clone()))?;

        let content = response.bytes().await.map_err(FetchError::Body)?;

        fs::create_dir_all(target_dir)
            .await
            .map_err(|source| FetchError::CreateDir {
                path: target_dir.to_path_buf(),
                source,
            })?;

        let file_path = target_dir.join(&filename);
        fs::write(&file_path, &content)
            .await
            .map_err(|source| FetchError::Write {
                path: file_path.clone(),
                source,
            })?;

        debug!(%effective_url, path = ?file_path, bytes = content.len(), "resource saved");
        Ok(filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use tempfile::tempdir;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn fetcher() -> ResourceFetcher {
        ResourceFetcher::new(Client::new(), FilenamePolicy::Overwrite)
    }

    #[tokio::test]
    async fn test_fetch_writes_body_into_new_directory() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/static/logo.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PNGDATA".to_vec()))
            .mount(&mock_server)
            .await;

        let temp_dir = tempdir().unwrap();
        let target = temp_dir.path().join("assets").join("images");
        let url = Url::parse(&format!("{}/static/logo.png", mock_server.uri())).unwrap();

        let filename = fetcher().fetch(&url, &target).await.unwrap();

        assert_eq!(filename, "logo.png");
        assert_eq!(std::fs::read(target.join("logo.png")).unwrap(), b"PNGDATA");
    }

    #[tokio::test]
    async fn test_fetch_not_found_writes_nothing() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.js"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let temp_dir = tempdir().unwrap();
        let target = temp_dir.path().join("scripts");
        let url = Url::parse(&format!("{}/missing.js", mock_server.uri())).unwrap();

        let result = fetcher().fetch(&url, &target).await;

        assert!(matches!(result, Err(FetchError::Status(StatusCode::NOT_FOUND))));
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn test_fetch_names_file_after_redirect_target() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old/banner.png"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("location", format!("{}/cdn/banner-v2.png", mock_server.uri())),
            )
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cdn/banner-v2.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"V2".to_vec()))
            .mount(&mock_server)
            .await;

        let temp_dir = tempdir().unwrap();
        let url = Url::parse(&format!("{}/old/banner.png", mock_server.uri())).unwrap();

        let filename = fetcher().fetch(&url, temp_dir.path()).await.unwrap();

        assert_eq!(filename, "banner-v2.png");
        assert!(temp_dir.path().join("banner-v2.png").exists());
        assert!(!temp_dir.path().join("banner.png").exists());
    }

    #[tokio::test]
    async fn test_fetch_overwrites_existing_file() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/app.js"))
            .respond_with(ResponseTemplate::new(200).set_body_string("new();"))
            .mount(&mock_server)
            .await;

        let temp_dir = tempdir().unwrap();
        std::fs::write(temp_dir.path().join("app.js"), "old();").unwrap();
        let url = Url::parse(&format!("{}/app.js", mock_server.uri())).unwrap();

        fetcher().fetch(&url, temp_dir.path()).await.unwrap();

        assert_eq!(
            std::fs::read_to_string(temp_dir.path().join("app.js")).unwrap(),
            "new();"
        );
    }

    #[tokio::test]
    async fn test_fetch_root_path_has_no_filename() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&mock_server)
            .await;

        let temp_dir = tempdir().unwrap();
        let url = Url::parse(&format!("{}/", mock_server.uri())).unwrap();

        let result = fetcher().fetch(&url, temp_dir.path()).await;
        assert!(matches!(result, Err(FetchError::NoFilename(_))));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let url = Url::parse("http://127.0.0.1:1/gone.png").unwrap();

        let temp_dir = tempdir().unwrap();
        let result = fetcher().fetch(&url, temp_dir.path()).await;
        assert!(matches!(result, Err(FetchError::Request(_))));
    }

    #[tokio::test]
    async fn test_fetch_directory_blocked_by_file() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/logo.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PNG".to_vec()))
            .mount(&mock_server)
            .await;

        let temp_dir = tempdir().unwrap();
        std::fs::write(temp_dir.path().join("assets"), "not a directory").unwrap();
        let target = temp_dir.path().join("assets").join("images");
        let url = Url::parse(&format!("{}/logo.png", mock_server.uri())).unwrap();

        let result = fetcher().fetch(&url, &target).await;

        match result {
            Err(FetchError::CreateDir { path, .. }) => assert_eq!(path, target),
            other => panic!("expected CreateDir error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_file_path_taken_by_directory() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/logo.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PNG".to_vec()))
            .mount(&mock_server)
            .await;

        let temp_dir = tempdir().unwrap();
        std::fs::create_dir(temp_dir.path().join("logo.png")).unwrap();
        let url = Url::parse(&format!("{}/logo.png", mock_server.uri())).unwrap();

        let result = fetcher().fetch(&url, temp_dir.path()).await;

        match result {
            Err(FetchError::Write { path, .. }) => assert_eq!(path, temp_dir.path().join("logo.png")),
            other => panic!("expected Write error, got {:?}", other),
        }
    }
}
