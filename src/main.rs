//! Psychologist Directory
//!
//! Interactive terminal directory by default; `search` and `options` print to
//! stdout for scripting.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use psiho_directory::directory::{card, fetch_pages, DirectoryService, Pager};
use psiho_directory::tui::DirectoryTui;
use psiho_directory::utils::logging;
use psiho_directory::{DirectoryConfig, SearchFilters, SupabaseClient};

#[derive(Parser)]
#[command(name = "psiho_directory", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive directory (default)
    Tui,
    /// Print the values offered by the filter dropdowns
    Options {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Search the registry and print the matching records
    Search(SearchArgs),
}

#[derive(Args)]
struct SearchArgs {
    /// Name or part of a name
    name: Option<String>,
    #[arg(long = "specialty")]
    specialties: Vec<String>,
    #[arg(long = "branch")]
    branches: Vec<String>,
    #[arg(long, default_value_t = false)]
    dgpc: bool,
    #[arg(long, default_value_t = false)]
    tsa: bool,
    #[arg(long, default_value_t = false)]
    expert: bool,
    /// Stop after this many pages
    #[arg(long, default_value_t = 1)]
    pages: usize,
    #[arg(long, default_value_t = false)]
    json: bool,
}

impl SearchArgs {
    fn filters(&self) -> SearchFilters {
        let mut filters = SearchFilters::new().with_name(self.name.clone().unwrap_or_default());
        for s in &self.specialties {
            filters.toggle_specialty(s);
        }
        for b in &self.branches {
            filters.toggle_branch(b);
        }
        filters.dgpc = self.dgpc;
        filters.tsa = self.tsa;
        filters.expert = self.expert;
        filters
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = DirectoryConfig::from_env().context("Failed to load directory configuration")?;
    let service: Arc<dyn DirectoryService> =
        Arc::new(SupabaseClient::new(&config).context("Failed to build data service client")?);

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            let _guard = logging::init_file_logging(&config.log_dir)?;
            info!(url = %config.service_url, page_size = config.page_size, "starting directory");
            DirectoryTui::new(service, config).run().await?;
        }
        Commands::Options { json } => {
            logging::init_stderr_logging()?;
            let options = service
                .filter_options()
                .await
                .context("Failed to fetch specialties. Please check your Supabase configuration.")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&options)?);
            } else {
                println!("Specializări:");
                for s in &options.specialties {
                    println!("  {}", s);
                }
                println!("Filiale:");
                for b in &options.branches {
                    println!("  {}", b);
                }
            }
        }
        Commands::Search(args) => {
            logging::init_stderr_logging()?;
            let filters = args.filters();
            info!(unfiltered = filters.is_empty(), pages = args.pages, "searching registry");
            let mut pager = Pager::new(config.page_size);
            let pages = fetch_pages(service.as_ref(), &mut pager, &filters, args.pages.max(1))
                .await
                .context("Failed to fetch psychologists. Please check your Supabase configuration.")?;
            info!(pages, records = pager.records().len(), "search finished");

            if args.json {
                println!("{}", serde_json::to_string_pretty(pager.records())?);
            } else {
                for record in pager.records() {
                    println!("{}", card::render_text(record));
                }
                if pager.has_more() {
                    println!("... mai multe rezultate disponibile (--pages {})", args.pages.max(1) + 1);
                }
            }
        }
    }

    Ok(())
}
