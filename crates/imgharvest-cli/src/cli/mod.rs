//! CLI for the imgharvest site image harvester.

mod run;

use anyhow::{bail, Context, Result};
use clap::Parser;
use imgharvest_core::config;
use std::io::{BufRead, Write};
use url::Url;

use run::run_harvest;

const SEED_PROMPT: &str = "Enter the base URL of the website: ";

/// Crawl a website and download the images of every page.
///
/// Takes no arguments: the base URL is read from an interactive prompt and
/// output goes under the current directory.
#[derive(Debug, Parser)]
#[command(name = "imgharvest", version)]
#[command(about = "imgharvest: crawl a site and harvest its project images", long_about = None)]
pub struct Cli {}

impl Cli {
    pub async fn run_from_args() -> Result<()> {
        let _cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        let seed = parse_seed(&prompt_seed()?)?;
        let base_dir = std::env::current_dir().context("current directory")?;

        run_harvest(&seed, &base_dir, &cfg).await
    }
}

/// Reads one line from stdin after printing the prompt.
fn prompt_seed() -> Result<String> {
    print!("{}", SEED_PROMPT);
    std::io::stdout().flush().context("flush stdout")?;
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("read base URL from stdin")?;
    Ok(line)
}

/// Validates the seed: absolute http(s) URL with a host.
fn parse_seed(input: &str) -> Result<Url> {
    let input = input.trim();
    if input.is_empty() {
        bail!("no base URL given");
    }
    let url = Url::parse(input).with_context(|| format!("invalid base URL: {}", input))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        bail!("base URL must use http or https: {}", input);
    }
    if url.host_str().map_or(true, str::is_empty) {
        bail!("base URL has no host: {}", input);
    }
    Ok(url)
}

#[cfg(test)]
mod tests;
