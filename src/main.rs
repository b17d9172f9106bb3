use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use exchange_rates::config::{Config, DEFAULT_PAGE_SIZE};
use exchange_rates::session::Session;
use exchange_rates::table::ColumnId;
use exchange_rates::{catalog, render, HttpRatesSource, RatesSource, TableViewController};
use std::{io, sync::Arc, time::Duration};
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "exchange-rates", version, about = "Currency exchange rates in the terminal")]
struct Cli {
    /// Base URL of the rates API (overrides API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Rows per page
    #[arg(long, global = true, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List known currencies, optionally only those matching QUERY
    Currencies { query: Option<String> },

    /// Print one page of rates for a base currency
    Rates {
        code: String,

        /// Only currencies containing this text
        #[arg(short, long)]
        filter: Option<String>,

        /// Sort by `currency` or `rate`
        #[arg(short, long)]
        sort: Option<ColumnId>,

        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,

        /// Page to show, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },

    /// Browse rates interactively (the default)
    Browse {
        code: Option<String>,

        /// Minimum time the loading placeholder stays up
        #[arg(long)]
        min_loading_ms: Option<u64>,
    },
}

impl Cli {
    /// Extra validations on top of what clap does
    fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            bail!("Page size must be at least 1");
        }

        if let Some(Commands::Rates { sort, page, .. }) = &self.command {
            if let Some(column) = sort {
                if !column.is_sortable() {
                    bail!("The {} column cannot be sorted", column);
                }
            }
            if *page == 0 {
                bail!("Pages start at 1");
            }
        }

        Ok(())
    }

    fn config(&self) -> Config {
        let mut config = Config::from_env();
        if let Some(url) = &self.api_url {
            config = config.with_api_url(url);
        }
        config.page_size = self.page_size;
        config
    }
}

/// `RUST_LOG` when it parses, `warn` otherwise.
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(log_filter())
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    cli.validate()?;
    let mut config = cli.config();
    let source: Arc<dyn RatesSource> = Arc::new(HttpRatesSource::new(&config.api_url));

    let command = cli.command.unwrap_or(Commands::Browse {
        code: None,
        min_loading_ms: None,
    });

    match command {
        Commands::Currencies { query } => {
            let entries = catalog::list_currencies(source.as_ref()).await;
            let matches = catalog::search(&entries, query.as_deref().unwrap_or_default());
            print!("{}", render::shell_header());
            print!("{}", render::catalog_view(&matches));
        }
        Commands::Rates {
            code,
            filter,
            sort,
            desc,
            page,
        } => {
            let mut view = TableViewController::new(&code.to_lowercase(), config.page_size);
            view.load(source.as_ref(), Duration::ZERO).await;

            if let Some(text) = filter {
                view.set_filter_text(&text);
            }
            if let Some(column) = sort {
                view.toggle_sort(column);
                if desc {
                    view.toggle_sort(column);
                }
            }
            view.go_to_page(page - 1);

            print!("{}", render::shell_header());
            print!("{}", render::rates_view(&view));
        }
        Commands::Browse {
            code,
            min_loading_ms,
        } => {
            if let Some(ms) = min_loading_ms {
                config.min_loading = Duration::from_millis(ms);
            }
            let code = code.map(|c| c.to_lowercase());

            let mut session = Session::new(source, config, io::stdout());
            println!("Type 'help' for commands.");
            session
                .run(BufReader::new(tokio::io::stdin()), code.as_deref())
                .await?;
        }
    }

    Ok(())
}
