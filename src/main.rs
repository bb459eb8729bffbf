use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use namedex::dataset::CancelToken;
use namedex::index::build::ensure_index;
use namedex::index::reader::IndexStore;
use namedex::index::stats::{list_indexes, show_stats};
use namedex::index::types::Letter;
use namedex::index::writer::META_FILE;
use namedex::output;
use namedex::query::{Directory, PageRequest, SearchRequest};
use namedex::utils::{self, AppConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
const LOG_ENV: &str = "NAMEDEX_LOG";

#[derive(Parser)]
#[command(name = "namedex")]
#[command(version, about = "Paginated, letter-indexed queries over huge name directories")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Index directory to use instead of the per-dataset default
    #[arg(long, global = true)]
    index_dir: Option<PathBuf>,

    /// Give up on a query after this many seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build or rebuild the alphabet index for a dataset
    Index {
        dataset: PathBuf,

        /// Rebuild even if the index is up to date
        #[arg(short, long)]
        force: bool,
    },
    /// Show entry counts per letter
    Stats {
        dataset: PathBuf,

        #[arg(long)]
        json: bool,
    },
    /// List one page of entries, optionally for a single letter
    Page {
        dataset: PathBuf,

        /// 1-based page number
        #[arg(short, long, default_value_t = 1)]
        page: usize,

        /// Entries per page
        #[arg(short, long)]
        limit: Option<usize>,

        /// Only entries whose name starts with this letter
        #[arg(short = 'L', long)]
        letter: Option<Letter>,

        /// Keep only entries on this page that contain the text
        #[arg(short, long)]
        search: Option<String>,

        #[arg(long)]
        json: bool,
    },
    /// Search every entry by name or contact
    Search {
        dataset: PathBuf,

        query: String,

        #[arg(short, long, default_value_t = 1)]
        page: usize,

        #[arg(short, long)]
        limit: Option<usize>,

        #[arg(long)]
        json: bool,
    },
    /// Show the entry with the given id
    Get {
        dataset: PathBuf,

        id: u64,

        #[arg(long)]
        json: bool,
    },
    /// List all indexed datasets
    List,
    /// Remove the default-location index of a dataset
    Remove { dataset: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = AppConfig::load()?;
    let color = !cli.no_color;
    let cancel = match cli.timeout {
        Some(secs) => CancelToken::with_timeout(Duration::from_secs(secs)),
        None => CancelToken::new(),
    };

    match cli.command {
        Commands::Index { dataset, force } => {
            let index_dir = resolve_index_dir(&dataset, cli.index_dir.as_deref())?;
            match ensure_index(&dataset, &index_dir, force, false)? {
                Some(index) => println!(
                    "Indexed {} entries into {}",
                    index.stats.total,
                    index_dir.display()
                ),
                None => println!(
                    "Index is up to date: {} (use --force to rebuild)",
                    index_dir.display()
                ),
            }
        }
        Commands::Stats { dataset, json } => {
            let index_dir = require_index(&dataset, cli.index_dir.as_deref())?;
            let store = IndexStore::open(&index_dir)?;
            if json {
                output::print_json(&store.alphabet_stats())?;
            } else {
                show_stats(&dataset, &store)?;
            }
        }
        Commands::Page {
            dataset,
            page,
            limit,
            letter,
            search,
            json,
        } => {
            let limit = limit.unwrap_or(config.default_limit);
            validate_paging(page, limit, &config)?;

            let index_dir = require_index(&dataset, cli.index_dir.as_deref())?;
            let directory = Directory::open(&dataset, &index_dir, &config)?;

            let mut request = PageRequest::new(page, limit);
            if let Some(letter) = letter {
                request = request.with_letter(letter);
            }
            if let Some(search) = &search {
                request = request.with_search(search);
            }

            let result = directory.get_page(&request, &cancel)?;
            if json {
                output::print_json(&result)?;
            } else {
                output::print_result(&result, limit, color)?;
            }
        }
        Commands::Search {
            dataset,
            query,
            page,
            limit,
            json,
        } => {
            let limit = limit.unwrap_or(config.default_limit);
            validate_paging(page, limit, &config)?;
            let Some(request) = SearchRequest::new(&query, page, limit) else {
                bail!("Search query must not be empty");
            };

            let index_dir = resolve_index_dir(&dataset, cli.index_dir.as_deref())?;
            let directory = Directory::open(&dataset, &index_dir, &config)?;
            let result = directory.search(&request, &cancel)?;
            if json {
                output::print_json(&result)?;
            } else {
                output::print_result(&result, limit, color)?;
            }
        }
        Commands::Get { dataset, id, json } => {
            let index_dir = resolve_index_dir(&dataset, cli.index_dir.as_deref())?;
            let directory = Directory::open(&dataset, &index_dir, &config)?;
            let entry = directory.entry_by_id(id, &cancel)?;
            if json {
                output::print_json(&entry)?;
            } else {
                output::print_single(entry.as_ref(), color)?;
            }
        }
        Commands::List => {
            list_indexes()?;
        }
        Commands::Remove { dataset } => {
            utils::remove_index(&dataset)?;
            println!("Removed index for: {}", dataset.display());
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_index_dir(dataset: &Path, index_dir: Option<&Path>) -> Result<PathBuf> {
    match index_dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => utils::get_index_dir(dataset),
    }
}

/// Index directory of a dataset that must already be indexed
fn require_index(dataset: &Path, index_dir: Option<&Path>) -> Result<PathBuf> {
    let index_dir = resolve_index_dir(dataset, index_dir)?;
    if !index_dir.join(META_FILE).exists() {
        bail!(
            "{} is not indexed; run `namedex index {}` first",
            dataset.display(),
            dataset.display()
        );
    }
    Ok(index_dir)
}

fn validate_paging(page: usize, limit: usize, config: &AppConfig) -> Result<()> {
    if page == 0 {
        bail!("--page must be at least 1");
    }
    if limit == 0 || limit > config.max_limit {
        bail!("--limit must be between 1 and {}", config.max_limit);
    }
    Ok(())
}
