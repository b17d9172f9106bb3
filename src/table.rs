//! Sorting, filtering and pagination of rate rows.
//!
//! Everything here is a pure function of the rows and a [`ViewState`]; the
//! controller owns the state and the renderer consumes the derived
//! [`PageView`].

use crate::models::ExchangeRate;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnId {
    Index,
    Base,
    Currency,
    Rate,
}

impl ColumnId {
    pub const ALL: [ColumnId; 4] = [
        ColumnId::Index,
        ColumnId::Base,
        ColumnId::Currency,
        ColumnId::Rate,
    ];

    pub fn header(self) -> &'static str {
        match self {
            ColumnId::Index => "#",
            ColumnId::Base => "Base Currency",
            ColumnId::Currency => "Currency",
            ColumnId::Rate => "Rate",
        }
    }

    pub fn is_sortable(self) -> bool {
        matches!(self, ColumnId::Currency | ColumnId::Rate)
    }

    fn compare(self, a: &ExchangeRate, b: &ExchangeRate) -> Ordering {
        match self {
            ColumnId::Currency => a.currency.cmp(&b.currency),
            ColumnId::Rate => a.rate.total_cmp(&b.rate),
            ColumnId::Index | ColumnId::Base => Ordering::Equal,
        }
    }
}

impl FromStr for ColumnId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "#" | "index" => Ok(ColumnId::Index),
            "base" => Ok(ColumnId::Base),
            "currency" => Ok(ColumnId::Currency),
            "rate" => Ok(ColumnId::Rate),
            other => Err(format!("unknown column '{}'", other)),
        }
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnId::Index => "#",
            ColumnId::Base => "base",
            ColumnId::Currency => "currency",
            ColumnId::Rate => "rate",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub column: ColumnId,
    pub direction: SortDirection,
}

/// Interactive state of one rates table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewState {
    sort: Option<Sort>,
    filter_text: String,
    current_page: usize,
}

impl ViewState {
    pub fn sort(&self) -> Option<Sort> {
        self.sort
    }

    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn set_filter_text(&mut self, text: &str) {
        if self.filter_text != text {
            self.filter_text = text.to_string();
            self.current_page = 0;
        }
    }

    /// Sorts by `column`, ascending first, flipping direction on repeat.
    /// Returns false for columns that cannot be sorted.
    pub fn toggle_sort(&mut self, column: ColumnId) -> bool {
        if !column.is_sortable() {
            return false;
        }

        let direction = match self.sort {
            Some(current) if current.column == column => current.direction.flipped(),
            _ => SortDirection::Asc,
        };
        self.sort = Some(Sort { column, direction });
        self.current_page = 0;
        true
    }

    pub fn next_page(&mut self, page_count: usize) {
        if self.current_page + 1 < page_count {
            self.current_page += 1;
        }
    }

    /// Jumps to `page`, clamped to the last of `page_count` pages.
    pub fn go_to_page(&mut self, page: usize, page_count: usize) {
        self.current_page = page.min(page_count.saturating_sub(1));
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.saturating_sub(1);
    }

    pub fn first_page(&mut self) {
        self.current_page = 0;
    }

    pub fn reset(&mut self) {
        *self = ViewState::default();
    }
}

/// A row as displayed: `index` is the 1-based rank in the filtered, sorted set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayRow<'a> {
    pub index: usize,
    pub rate: &'a ExchangeRate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageView<'a> {
    pub rows: Vec<DisplayRow<'a>>,
    pub page: usize,
    pub page_count: usize,
    pub filtered_count: usize,
    pub can_go_prev: bool,
    pub can_go_next: bool,
}

pub fn page_count(row_count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    row_count.div_ceil(page_size)
}

fn matches_filter(rate: &ExchangeRate, needle: &str) -> bool {
    needle.is_empty() || rate.currency.to_lowercase().contains(needle)
}

/// Filtered and sorted rows, before pagination.
pub fn filter_and_sort<'a>(
    rates: &'a [ExchangeRate],
    state: &ViewState,
) -> Vec<&'a ExchangeRate> {
    let needle = state.filter_text.to_lowercase();
    let mut rows: Vec<&ExchangeRate> = rates
        .iter()
        .filter(|rate| matches_filter(rate, &needle))
        .collect();

    if let Some(sort) = state.sort {
        rows.sort_by(|a, b| {
            let ordering = sort.column.compare(a, b);
            match sort.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
    }

    rows
}

/// Rows and pager flags for the current page. An out-of-range page is
/// clamped to the last one.
pub fn derive_page<'a>(
    rates: &'a [ExchangeRate],
    state: &ViewState,
    page_size: usize,
) -> PageView<'a> {
    let rows = filter_and_sort(rates, state);
    let filtered_count = rows.len();
    let page_count = page_count(filtered_count, page_size);
    let page = state.current_page.min(page_count.saturating_sub(1));

    let visible = rows
        .into_iter()
        .enumerate()
        .skip(page * page_size)
        .take(page_size)
        .map(|(rank, rate)| DisplayRow {
            index: rank + 1,
            rate,
        })
        .collect();

    PageView {
        rows: visible,
        page,
        page_count,
        filtered_count,
        can_go_prev: page > 0,
        can_go_next: page + 1 < page_count,
    }
}
