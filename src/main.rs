//! VIA-Harvest main entry point
//!
//! This is the command-line interface for the VIA-Harvest document harvester.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use via_harvest::config::{load_config_with_hash, Config};
use via_harvest::output::{print_statistics, read_project_list, write_project_list};
use via_harvest::{sanitize_filename, Harvester, SearchType};

/// VIA-Harvest: a polite document harvester for the environmental-assessment registry
///
/// VIA-Harvest searches the registry by keyword, follows every result to its
/// documentation pages and downloads each listed document, skipping files
/// that are already on disk. Requests are spaced by a fixed delay.
#[derive(Parser, Debug)]
#[command(name = "via-harvest")]
#[command(version)]
#[command(about = "A polite document harvester for the VIA registry", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search by keyword and download every document of every result
    Harvest {
        /// Free-text search keyword
        #[arg(short, long)]
        keyword: String,

        /// Search type: projects (o) or documents (d)
        #[arg(short = 't', long = "type", default_value = "projects", value_parser = parse_search_type)]
        search_type: SearchType,

        /// Only list the search results, download nothing
        #[arg(long)]
        dry_run: bool,
    },

    /// Write the project search results to a CSV for review
    List {
        /// Free-text search keyword
        #[arg(short, long)]
        keyword: String,

        /// CSV path (defaults to output.project-list-path)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Download the documents of the CSV rows marked YES
    DownloadList {
        /// Folder created under the download root
        #[arg(short, long)]
        folder: String,

        /// CSV path (defaults to output.project-list-path)
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,
    },

    /// Download every document of one project, given its registry ID
    Project {
        /// Project ID, as in `/it-IT/Oggetti/Info/<id>`
        #[arg(short, long)]
        id: String,

        /// Folder the `<id>` folder is created in (defaults to output.download-root)
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },
}

fn parse_search_type(s: &str) -> Result<SearchType, String> {
    SearchType::parse(s).ok_or_else(|| format!("unknown search type '{}' (use projects or documents)", s))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_configuration(cli.config.as_deref())?;

    match cli.command {
        Command::Harvest {
            keyword,
            search_type,
            dry_run,
        } => {
            if dry_run {
                handle_dry_run(config, &keyword, search_type).await
            } else {
                handle_harvest(config, &keyword, search_type).await
            }
        }
        Command::List { keyword, output } => handle_list(config, &keyword, output).await,
        Command::DownloadList { folder, input } => {
            handle_download_list(config, &folder, input).await
        }
        Command::Project { id, output_dir } => handle_project(config, &id, output_dir).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("via_harvest=info,warn"),
            1 => EnvFilter::new("via_harvest=debug,info"),
            2 => EnvFilter::new("via_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file, or falls back to the built-in defaults
fn load_configuration(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        tracing::info!("No configuration file given, using built-in defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}

/// Handles `harvest --dry-run`: shows what would be harvested
async fn handle_dry_run(
    config: Config,
    keyword: &str,
    search_type: SearchType,
) -> anyhow::Result<()> {
    println!("=== VIA-Harvest Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Search path: {}", config.site.search_path);

    println!("\nCrawler:");
    println!("  Request delay: {}ms", config.crawler.request_delay_ms);
    println!("  Page timeout: {}s", config.crawler.page_timeout_secs);
    println!("  Download timeout: {}s", config.crawler.download_timeout_secs);
    println!("  Page limit: {}", config.crawler.max_pages);

    println!("\nUser Agent: {}", config.user_agent.header_value());

    let mut harvester = Harvester::new(config)?;
    println!(
        "\nOutput: {}",
        harvester.keyword_dir(keyword, search_type).display()
    );

    let results = harvester.search(keyword, search_type).await?;

    println!(
        "\nResults for '{}' [{}] ({} pages, {}):",
        keyword.trim(),
        search_type,
        results.pages,
        results.termination
    );
    for link in results.links.iter() {
        println!("  - {}", link);
    }

    println!("\n✓ Would harvest {} results", results.links.len());
    Ok(())
}

/// Handles `harvest`: runs the keyword pipeline
async fn handle_harvest(
    config: Config,
    keyword: &str,
    search_type: SearchType,
) -> anyhow::Result<()> {
    tracing::info!("Starting harvest for '{}' [{}]", keyword.trim(), search_type);

    let mut harvester = Harvester::new(config)?;
    let stats = harvester
        .harvest_keyword(keyword, search_type)
        .await
        .context("Harvest failed")?;

    println!();
    print_statistics(&stats);
    Ok(())
}

/// Handles `list`: writes the project list CSV
async fn handle_list(config: Config, keyword: &str, output: Option<PathBuf>) -> anyhow::Result<()> {
    let output = output.unwrap_or_else(|| PathBuf::from(&config.output.project_list_path));

    let mut harvester = Harvester::new(config)?;
    let listing = harvester.list_projects(keyword).await?;

    let written = write_project_list(&output, &listing.items)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "✓ Saved {} projects to {} ({} pages, {})",
        written,
        output.display(),
        listing.pages,
        listing.termination
    );
    println!("  Every row is marked YES; set 'include' to NO for projects to skip, then run download-list");
    Ok(())
}

/// Handles `download-list`: downloads the selected rows of the project list
async fn handle_download_list(
    config: Config,
    folder: &str,
    input: Option<PathBuf>,
) -> anyhow::Result<()> {
    let input = input.unwrap_or_else(|| PathBuf::from(&config.output.project_list_path));
    if !input.exists() {
        bail!("{} not found, run the list command first", input.display());
    }

    let records = read_project_list(&input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let mut harvester = Harvester::new(config)?;
    let target = harvester.list_dir(folder);
    if target.exists() {
        tracing::info!("Folder {} already exists, adding to it", target.display());
    }

    let stats = harvester
        .harvest_project_list(&records, folder)
        .await
        .context("Download failed")?;

    println!();
    print_statistics(&stats);
    println!("\n✓ Downloads saved in {}", target.display());
    Ok(())
}

/// Handles `project`: downloads one project by ID
async fn handle_project(config: Config, id: &str, output_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let mut harvester = Harvester::new(config)?;
    let target = harvester
        .project_dir(output_dir.as_deref())
        .join(sanitize_filename(id.trim()));

    let stats = harvester
        .harvest_project(id, output_dir.as_deref())
        .await
        .with_context(|| format!("Download of project '{}' failed", id.trim()))?;

    println!();
    print_statistics(&stats);
    if stats.failed_projects > 0 {
        println!("\n✗ Detail page of project {} could not be fetched", id.trim());
    } else {
        println!("\n✓ Downloads saved in {}", target.display());
    }
    Ok(())
}
