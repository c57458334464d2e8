// src/main.rs

//! folio: collection browser CLI
//!
//! Browses the paginated content collections of a headless-CMS-backed site
//! from the terminal: listing pages, filters, and keyword search.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};

use folio::error::Result;
use folio::models::{CollectionKind, Config, FilterState, Language};
use folio::pages;

/// folio - headless-CMS collection browser
#[derive(Parser, Debug)]
#[command(name = "folio", version, about = "Headless-CMS collection browser")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Language code (e.g. "ja" or "en"); defaults to the primary language
    #[arg(short, long, global = true)]
    lang: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one page of a collection listing
    List {
        /// Collection to browse
        #[arg(value_enum)]
        collection: CollectionArg,

        /// Page number
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Show only items in this category
        #[arg(long)]
        category: Option<String>,

        /// Show only items carrying this tag
        #[arg(long)]
        tag: Option<String>,

        /// Show archived items instead of the default listing
        #[arg(long)]
        archived: bool,

        /// Show every entry instead of collapsing long lists
        #[arg(long)]
        all: bool,
    },

    /// Search a collection for a keyword
    Search {
        /// Collection to search
        #[arg(value_enum)]
        collection: CollectionArg,

        /// Keyword (at least 2 characters)
        query: String,

        /// Result page number (server-side search only)
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },

    /// Probe all collections and report totals
    Overview,

    /// Validate the configuration file
    Validate,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CollectionArg {
    News,
    Team,
    Projects,
}

impl From<CollectionArg> for CollectionKind {
    fn from(arg: CollectionArg) -> Self {
        match arg {
            CollectionArg::News => CollectionKind::News,
            CollectionArg::Team => CollectionKind::Team,
            CollectionArg::Projects => CollectionKind::Projects,
        }
    }
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Arc::new(Config::load_or_default(&cli.config));
    let language = match cli.lang.as_deref() {
        Some(code) => config.site.language_for_code(code),
        None => Language::Primary,
    };

    match cli.command {
        Command::List {
            collection,
            page,
            category,
            tag,
            archived,
            all,
        } => {
            let filter = FilterState {
                archived,
                tag,
                category,
            };
            pages::run_list(&config, collection.into(), language, page, filter, all).await?;
        }

        Command::Search {
            collection,
            query,
            page,
        } => {
            pages::run_search(&config, collection.into(), language, &query, page).await?;
        }

        Command::Overview => {
            pages::run_overview(&config, language).await?;
        }

        Command::Validate => {
            pages::run_validate(&config)?;
        }
    }

    Ok(())
}
