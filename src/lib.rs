pub mod cli;
pub mod error;
pub mod fetcher;
pub mod file_manager;
pub mod honeypot;
pub mod html_parser;
pub mod mirror;
pub mod resolver;
pub mod walker;
pub mod wizard;

// Re-export main types for convenience
pub use cli::MirrorCommand;
pub use error::{FetchError, MirrorError};
pub use fetcher::ResourceFetcher;
pub use file_manager::{FilenamePolicy, ResourceKind, SaveTarget};
pub use honeypot::{ConfigFile, HoneypotConfig};
pub use mirror::{DocumentMirror, MirrorOptions, MirrorReport};
pub use resolver::{parse_page_url, resolve, Skip};
pub use walker::{DocumentWalker, RewrittenResource, WalkReport};
pub use wizard::Wizard;
