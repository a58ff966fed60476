use clap::Parser;
use std::path::PathBuf;

use crate::file_manager::FilenamePolicy;
use crate::mirror::DEFAULT_USER_AGENT;

#[derive(Parser, Debug)]
#[command(
    name = "decoy-mirror",
    about = "Mirror a webpage locally for use as a honeypot decoy page",
    version,
    long_about = "Downloads a single webpage, saves its same-origin images and scripts next to it and rewrites their references to the local copies. Without --output-file, a honeypot record is collected interactively and registered in the config store first."
)]
pub struct MirrorCommand {
    /// The URL of the page to mirror (prompted for when omitted)
    pub url: Option<String>,

    /// Directory receiving the page, assets/images/ and scripts/
    #[arg(short, long, default_value = "./templates")]
    pub output_root: PathBuf,

    /// File name of the rewritten page inside the output root (skips the honeypot wizard)
    #[arg(short = 'f', long)]
    pub output_file: Option<String>,

    /// Honeypot config store (.yaml or .json)
    #[arg(short, long, default_value = "config.yaml")]
    pub config: PathBuf,

    /// User agent string to use for requests
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// How downloaded files are named when several resources share a file name
    #[arg(long, value_enum, default_value_t = FilenamePolicy::Overwrite)]
    pub filename_policy: FilenamePolicy,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_args() {
        let args = MirrorCommand::try_parse_from(["decoy-mirror", "https://example.com"]).unwrap();

        assert_eq!(args.url.as_deref(), Some("https://example.com"));
        assert_eq!(args.output_root, PathBuf::from("./templates"));
        assert_eq!(args.output_file, None);
        assert_eq!(args.config, PathBuf::from("config.yaml"));
        assert_eq!(args.user_agent, "DecoyMirror/1.0");
        assert_eq!(args.filename_policy, FilenamePolicy::Overwrite);
        assert!(!args.verbose);
    }

    #[test]
    fn test_parse_all_args() {
        let args = MirrorCommand::try_parse_from([
            "decoy-mirror",
            "https://example.com/login",
            "-o", "./out",
            "-f", "login.html",
            "-c", "honeypots.json",
            "--user-agent", "Mozilla/5.0",
            "--filename-policy", "path-qualified",
            "-v",
        ])
        .unwrap();

        assert_eq!(args.url.as_deref(), Some("https://example.com/login"));
        assert_eq!(args.output_root, PathBuf::from("./out"));
        assert_eq!(args.output_file.as_deref(), Some("login.html"));
        assert_eq!(args.config, PathBuf::from("honeypots.json"));
        assert_eq!(args.user_agent, "Mozilla/5.0");
        assert_eq!(args.filename_policy, FilenamePolicy::PathQualified);
        assert!(args.verbose);
    }

    #[test]
    fn test_parse_missing_url() {
        let args = MirrorCommand::try_parse_from(["decoy-mirror", "-f", "index.html"]).unwrap();
        assert_eq!(args.url, None);
    }

    #[test]
    fn test_parse_invalid_policy() {
        let result = MirrorCommand::try_parse_from([
            "decoy-mirror",
            "https://example.com",
            "--filename-policy", "hash",
        ]);
        assert!(result.is_err());
    }
}
