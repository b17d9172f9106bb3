//! Interactive browsing: reads commands line by line and redraws the view
//! after each command and each applied fetch. Rate fetches run as tasks so
//! commands keep being handled while one is outstanding.

use crate::api::RatesSource;
use crate::catalog;
use crate::config::Config;
use crate::controller::{run_fetch, FetchTicket, RequestId, TableViewController};
use crate::error::FetchError;
use crate::models::{CurrencyCatalogEntry, CurrencyQuoteSet};
use crate::render;
use crate::table::ColumnId;
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, warn};

pub const HELP: &str = "\
Commands:
  open CODE        show rates for a base currency
  sort COLUMN      sort by currency or rate (repeat to flip direction)
  filter [TEXT]    show currencies containing TEXT (empty clears)
  next | prev      change page
  refresh          reset the view and fetch the rates again
  search [QUERY]   list currencies matching QUERY
  home             back to the currency list
  help             this text
  quit             leave
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(String),
    Sort(ColumnId),
    Filter(String),
    Next,
    Prev,
    Refresh,
    Search(String),
    Home,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_lowercase().as_str() {
            "open" | "rates" if rest.is_empty() => Err("usage: open CODE".to_string()),
            "open" | "rates" => Ok(Command::Open(rest.to_lowercase())),
            "sort" => Ok(Command::Sort(rest.parse()?)),
            "filter" => Ok(Command::Filter(rest.to_string())),
            "next" | "n" => Ok(Command::Next),
            "prev" | "previous" | "p" => Ok(Command::Prev),
            "refresh" | "r" => Ok(Command::Refresh),
            "search" => Ok(Command::Search(rest.to_string())),
            "home" => Ok(Command::Home),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(format!("unknown command '{}'", other)),
        }
    }
}

type FetchOutcome = (RequestId, Result<CurrencyQuoteSet, FetchError>);

pub struct Session<W: Write> {
    source: Arc<dyn RatesSource>,
    config: Config,
    view: Option<TableViewController>,
    catalog: Option<Vec<CurrencyCatalogEntry>>,
    tasks: JoinSet<FetchOutcome>,
    out: W,
}

impl<W: Write> Session<W> {
    pub fn new(source: Arc<dyn RatesSource>, config: Config, out: W) -> Self {
        Self {
            source,
            config,
            view: None,
            catalog: None,
            tasks: JoinSet::new(),
            out,
        }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Runs until `quit`, or until input ends and every outstanding fetch
    /// has settled.
    pub async fn run<R>(&mut self, input: R, initial: Option<&str>) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        match initial {
            Some(code) => self.open(code)?,
            None => self.show_catalog("").await?,
        }

        let mut lines = input.lines();
        let mut input_open = true;

        loop {
            if !input_open && self.tasks.is_empty() {
                break;
            }

            tokio::select! {
                line = lines.next_line(), if input_open => match line? {
                    Some(line) if line.trim().is_empty() => {}
                    Some(line) => {
                        if !self.handle_line(&line).await? {
                            break;
                        }
                    }
                    None => input_open = false,
                },
                Some(joined) = self.tasks.join_next(), if !self.tasks.is_empty() => {
                    self.on_fetch_settled(joined)?;
                }
            }
        }

        self.unmount();
        Ok(())
    }

    /// Returns false once the session should end.
    async fn handle_line(&mut self, line: &str) -> io::Result<bool> {
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                writeln!(self.out, "{} (type 'help' for commands)", e)?;
                return Ok(true);
            }
        };
        debug!(?command, "command");

        match command {
            Command::Quit => return Ok(false),
            Command::Help => write!(self.out, "{}", HELP)?,
            Command::Open(code) => self.open(&code)?,
            Command::Home => self.show_catalog("").await?,
            Command::Search(query) => self.show_catalog(&query).await?,
            command => {
                let Some(view) = self.view.as_mut() else {
                    writeln!(self.out, "Open a currency first, e.g. 'open usd'.")?;
                    return Ok(true);
                };

                match command {
                    Command::Sort(column) => {
                        if !view.toggle_sort(column) {
                            writeln!(self.out, "The {} column cannot be sorted.", column)?;
                            return Ok(true);
                        }
                    }
                    Command::Filter(text) => view.set_filter_text(&text),
                    Command::Next => view.next_page(),
                    Command::Prev => view.previous_page(),
                    Command::Refresh => {
                        let ticket = view.refresh();
                        self.spawn_fetch(ticket);
                    }
                    _ => {}
                }
                self.draw()?;
            }
        }
        Ok(true)
    }

    fn open(&mut self, code: &str) -> io::Result<()> {
        let ticket = match self.view.as_mut() {
            Some(view) => view.navigate(code),
            None => {
                let view = self
                    .view
                    .insert(TableViewController::new(code, self.config.page_size));
                view.trigger_fetch()
            }
        };
        self.spawn_fetch(ticket);
        self.draw()
    }

    async fn show_catalog(&mut self, query: &str) -> io::Result<()> {
        self.unmount();

        if self.catalog.is_none() {
            self.catalog = Some(catalog::list_currencies(self.source.as_ref()).await);
        }
        let entries = self.catalog.as_deref().unwrap_or_default();
        let matches = catalog::search(entries, query);

        write!(self.out, "{}", render::shell_header())?;
        write!(self.out, "{}", render::catalog_view(&matches))?;
        self.out.flush()
    }

    fn spawn_fetch(&mut self, ticket: FetchTicket) {
        let source = Arc::clone(&self.source);
        let min_display = self.config.min_loading;
        self.tasks
            .spawn(async move { run_fetch(source.as_ref(), ticket, min_display).await });
    }

    fn on_fetch_settled(&mut self, joined: Result<FetchOutcome, JoinError>) -> io::Result<()> {
        match joined {
            Ok((id, result)) => {
                let applied = self
                    .view
                    .as_mut()
                    .is_some_and(|view| view.complete(id, result));
                if applied {
                    self.draw()?;
                }
            }
            Err(e) if e.is_cancelled() => {}
            Err(e) => warn!("rate fetch task failed: {}", e),
        }
        Ok(())
    }

    /// Drops the rates view; fetches still in flight are aborted.
    fn unmount(&mut self) {
        if let Some(mut view) = self.view.take() {
            view.unmount();
        }
        self.tasks = JoinSet::new();
    }

    fn draw(&mut self) -> io::Result<()> {
        if let Some(view) = &self.view {
            write!(self.out, "{}", render::shell_header())?;
            write!(self.out, "{}", render::rates_view(view))?;
        }
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{parse_catalog, parse_quote_set};
    use async_trait::async_trait;
    use std::time::Duration;

    const USD: &str = r#"{
        "date": "2024-01-01",
        "usd": { "eur": 0.9, "jpy": 140, "sek": 10.4, "aed": 3.67 }
    }"#;

    struct DocumentSource;

    #[async_trait]
    impl RatesSource for DocumentSource {
        async fn fetch_rates(&self, code: &str) -> Result<CurrencyQuoteSet, FetchError> {
            parse_quote_set(code, "memory://rates", USD)
        }

        async fn fetch_catalog(&self) -> Result<Vec<CurrencyCatalogEntry>, FetchError> {
            parse_catalog("memory://catalog", r#"{ "usd": "US Dollar", "eur": "Euro" }"#)
        }
    }

    struct NeverSource;

    #[async_trait]
    impl RatesSource for NeverSource {
        async fn fetch_rates(&self, _code: &str) -> Result<CurrencyQuoteSet, FetchError> {
            std::future::pending().await
        }

        async fn fetch_catalog(&self) -> Result<Vec<CurrencyCatalogEntry>, FetchError> {
            Ok(Vec::new())
        }
    }

    fn config() -> Config {
        Config {
            min_loading: Duration::ZERO,
            ..Config::default()
        }
    }

    fn last_frame(output: &str) -> &str {
        output.rsplit(render::APP_TITLE).next().unwrap_or_default()
    }

    #[test]
    fn parses_commands() {
        assert_eq!("open USD".parse(), Ok(Command::Open("usd".to_string())));
        assert_eq!("sort rate".parse(), Ok(Command::Sort(ColumnId::Rate)));
        assert_eq!("filter".parse(), Ok(Command::Filter(String::new())));
        assert_eq!("filter  e ".parse(), Ok(Command::Filter("e".to_string())));
        assert_eq!("  next ".parse(), Ok(Command::Next));
        assert_eq!("q".parse(), Ok(Command::Quit));
        assert!("open".parse::<Command>().is_err());
        assert!("sort price".parse::<Command>().is_err());
        assert!("convert usd eur".parse::<Command>().is_err());
    }

    #[tokio::test]
    async fn commands_shape_the_final_view() {
        let mut session = Session::new(Arc::new(DocumentSource), config(), Vec::new());
        let input: &[u8] = b"filter e\nsort rate\nsort rate\n";
        session.run(input, Some("usd")).await.unwrap();

        let output = String::from_utf8(session.into_output()).unwrap();
        let frame = last_frame(&output);
        assert!(frame.contains("(as of 2024-01-01)"));
        assert!(frame.contains("Rate v"));
        assert!(!frame.contains("JPY"));

        let sek = frame.find("SEK 10.4").unwrap();
        let aed = frame.find("AED 3.67").unwrap();
        let eur = frame.find("EUR 0.9").unwrap();
        assert!(sek < aed && aed < eur);
    }

    #[tokio::test]
    async fn home_lists_catalog() {
        let mut session = Session::new(Arc::new(DocumentSource), config(), Vec::new());
        let input: &[u8] = b"search dollar\n";
        session.run(input, None).await.unwrap();

        let output = String::from_utf8(session.into_output()).unwrap();
        assert!(output.contains("Euro (EUR)"));
        let frame = last_frame(&output);
        assert!(frame.contains("US Dollar (USD)"));
        assert!(!frame.contains("Euro"));
    }

    #[tokio::test]
    async fn view_commands_need_a_currency() {
        let mut session = Session::new(Arc::new(DocumentSource), config(), Vec::new());
        let input: &[u8] = b"next\nbogus\n";
        session.run(input, None).await.unwrap();

        let output = String::from_utf8(session.into_output()).unwrap();
        assert!(output.contains("Open a currency first"));
        assert!(output.contains("unknown command 'bogus'"));
    }

    #[tokio::test]
    async fn quit_abandons_pending_fetch() {
        let mut session = Session::new(Arc::new(NeverSource), config(), Vec::new());
        let input: &[u8] = b"sort base\nquit\n";
        session.run(input, Some("usd")).await.unwrap();

        let output = String::from_utf8(session.into_output()).unwrap();
        assert!(output.contains("The base column cannot be sorted."));
        assert!(output.contains(crate::loading::PLACEHOLDER));
    }
}
