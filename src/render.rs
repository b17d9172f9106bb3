use crate::controller::{LoadState, TableViewController};
use crate::loading;
use crate::models::{CurrencyCatalogEntry, ExchangeRate};
use crate::table::{ColumnId, Sort, SortDirection};
use std::fmt;

pub const APP_TITLE: &str = "Exchange Rates";

/// Plain-text table for single-line rows. Column widths follow the widest
/// cell; width is counted in chars so placeholder glyphs line up.
pub struct Table {
    column_count: usize,
    rows: Vec<Row>,
    right_align: Vec<bool>, // by column index
}

pub enum Row {
    Header(Vec<String>),
    Data(Vec<String>),
    Separator,
}

impl Table {
    pub fn new(column_count: usize) -> Self {
        Self {
            column_count,
            rows: Vec::new(),
            right_align: vec![false; column_count],
        }
    }

    pub fn add_header(&mut self, row: Vec<String>) {
        self.rows.push(Row::Header(row));
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(Row::Data(row));
    }

    pub fn add_separator(&mut self) {
        self.rows.push(Row::Separator);
    }

    pub fn right_align(&mut self, cols: &[usize]) {
        for &col in cols {
            if col < self.column_count {
                self.right_align[col] = true;
            }
        }
    }

    pub fn data_row_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| matches!(row, Row::Data(_)))
            .count()
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths = vec![0; self.column_count];
        for row in &self.rows {
            if let Row::Data(cells) | Row::Header(cells) = row {
                for (i, value) in cells.iter().enumerate().take(self.column_count) {
                    widths[i] = widths[i].max(value.chars().count());
                }
            }
        }
        widths
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.widths();

        for row in &self.rows {
            match row {
                Row::Header(cells) | Row::Data(cells) => {
                    let separator = if matches!(row, Row::Header(_)) { " | " } else { "   " };
                    for (i, value) in cells.iter().enumerate().take(self.column_count) {
                        if self.right_align[i] {
                            write!(f, "{:>width$}", value, width = widths[i])?;
                        } else {
                            write!(f, "{:<width$}", value, width = widths[i])?;
                        }
                        if i + 1 < cells.len() {
                            f.write_str(separator)?;
                        }
                    }
                    writeln!(f)?;
                }
                Row::Separator => {
                    let gaps = 3 * self.column_count.saturating_sub(1);
                    let total: usize = widths.iter().sum::<usize>() + gaps;
                    writeln!(f, "{:-<total$}", "", total = total)?;
                }
            }
        }
        Ok(())
    }
}

/// Header labels, marking the active sort column.
pub fn column_headers(sort: Option<Sort>) -> Vec<String> {
    ColumnId::ALL
        .iter()
        .map(|&column| match sort {
            Some(sort) if sort.column == column => {
                let arrow = match sort.direction {
                    SortDirection::Asc => "^",
                    SortDirection::Desc => "v",
                };
                format!("{} {}", column.header(), arrow)
            }
            _ => column.header().to_string(),
        })
        .collect()
}

pub fn rate_cell(rate: &ExchangeRate) -> String {
    format!(
        "{} 1 -> {} {}",
        rate.base.to_uppercase(),
        rate.currency.to_uppercase(),
        rate.rate
    )
}

pub fn shell_header() -> String {
    format!("{}  (home: currency list)\n", APP_TITLE)
}

pub fn caption(controller: &TableViewController) -> String {
    let quotes = controller.quotes();
    match &quotes.as_of_date {
        Some(date) if !controller.is_loading() => format!(
            "Exchange rates for base currency: {}. (as of {})",
            controller.code().to_uppercase(),
            date
        ),
        _ => format!(
            "Exchange rates for base currency: {}.",
            controller.code().to_uppercase()
        ),
    }
}

fn pager(controller: &TableViewController) -> String {
    let page = controller.page();
    let button = |label: &str, enabled: bool| {
        if enabled {
            format!("[{}]", label)
        } else {
            format!("({})", label)
        }
    };

    format!(
        "{} page(s)    {} {}",
        page.page_count,
        button("Previous", page.can_go_prev),
        button("Next", page.can_go_next)
    )
}

/// The full rates view: caption, table (or skeleton), pager.
pub fn rates_view(controller: &TableViewController) -> String {
    let mut out = String::new();
    out.push_str(&caption(controller));
    out.push('\n');

    if controller.is_loading() {
        out.push_str(&loading::skeleton(controller.view_state().sort()).to_string());
        out.push_str(&pager(controller));
        out.push('\n');
        return out;
    }

    let page = controller.page();
    let mut table = Table::new(ColumnId::ALL.len());
    table.add_header(column_headers(controller.view_state().sort()));
    table.add_separator();
    table.right_align(&[0, 3]);
    for row in &page.rows {
        table.add_row(vec![
            row.index.to_string(),
            row.rate.base.to_uppercase(),
            row.rate.currency.to_uppercase(),
            rate_cell(row.rate),
        ]);
    }
    out.push_str(&table.to_string());

    if let LoadState::Failed(reason) = controller.state() {
        out.push_str(&format!("Could not load rates: {}\n", reason));
    } else if page.rows.is_empty() {
        let filter = controller.view_state().filter_text();
        if filter.is_empty() {
            out.push_str("No rates found.\n");
        } else {
            out.push_str(&format!("No rates match '{}'.\n", filter));
        }
    }

    out.push_str(&pager(controller));
    out.push('\n');
    out
}

/// The landing list: one line per catalog entry with the command opening it.
pub fn catalog_view(entries: &[&CurrencyCatalogEntry]) -> String {
    if entries.is_empty() {
        return "No currency found.\n".to_string();
    }

    let mut table = Table::new(2);
    table.add_header(vec!["Currency".to_string(), "Open with".to_string()]);
    table.add_separator();
    for entry in entries {
        table.add_row(vec![
            format!("{} ({})", entry.label(), entry.key.to_uppercase()),
            format!("rates {}", entry.key),
        ]);
    }
    table.to_string()
}
