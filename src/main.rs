use anyhow::Result;
use chrono::Local;
use clap::Parser;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use decoy_mirror::{
    parse_page_url, ConfigFile, DocumentMirror, MirrorCommand, MirrorOptions, SaveTarget, Wizard,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = MirrorCommand::parse();
    init_tracing(args.verbose);

    let (output_file, url) = {
        let mut wizard = Wizard::new(io::stdin().lock(), io::stdout())?;

        // An explicit output file means the page is mirrored without registering a honeypot
        let output_file = match args.output_file {
            Some(output_file) => output_file,
            None => register_honeypot(&mut wizard, &args.config)?,
        };
        let url = match args.url {
            Some(url) => url,
            None => wizard.prompt_url()?,
        };
        (output_file, url)
    };

    if url.trim().is_empty() {
        println!("No URL provided, exiting.");
        return Ok(());
    }

    let page_url = parse_page_url(&url)?;
    println!("🚀 Processing webpage: {}", page_url.as_str().blue());
    println!("📁 Output directory: {:?}", args.output_root);

    let options = MirrorOptions {
        user_agent: args.user_agent,
        filename_policy: args.filename_policy,
    };
    let mirror = DocumentMirror::new(SaveTarget::new(&args.output_root), &options)?;

    let progress_bar = ProgressBar::new_spinner();
    progress_bar.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);
    progress_bar.enable_steady_tick(Duration::from_millis(100));
    progress_bar.set_message(format!("Mirroring: {}", page_url));

    let report = match mirror.mirror(&page_url, &output_file).await {
        Ok(report) => report,
        Err(e) => {
            progress_bar.abandon_with_message(format!("❌ {}", e));
            return Err(e.into());
        }
    };
    progress_bar.finish_with_message("✅ Modified HTML saved successfully!");

    for resource in &report.walk.rewritten {
        println!("  {} {} → {}", "↳".green(), resource.url, resource.local_path);
    }
    println!(
        "📊 Rewritten: {}, skipped: {}, failed: {}",
        report.walk.rewritten.len().to_string().green(),
        report.walk.skipped.to_string().yellow(),
        report.walk.failed.to_string().red()
    );
    println!("💾 Saved page to: {:?}", report.document_path);

    Ok(())
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,decoy_mirror={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Collects a honeypot record, stores it and returns the page file name it serves.
fn register_honeypot<R: BufRead, W: Write>(
    wizard: &mut Wizard<R, W>,
    config_path: &Path,
) -> Result<String> {
    let mut config = ConfigFile::load(config_path)?;
    let honeypot = wizard.collect_honeypot(Local::now().date_naive())?;
    let output_file = honeypot.template_html_file.clone();

    let id = config.register(honeypot);
    config.save(config_path)?;
    println!("✅ Configuration saved successfully (honeypot #{}).", id);

    Ok(output_file)
}
