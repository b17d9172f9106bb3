use crate::config::SKELETON_ROWS;
use crate::render::{column_headers, Table};
use crate::table::{ColumnId, Sort};

pub const PLACEHOLDER: &str = "░░░░░░";

/// Placeholder grid drawn while rates are loading: the real headers over
/// a fixed number of blank rows.
pub fn skeleton(sort: Option<Sort>) -> Table {
    let columns = ColumnId::ALL.len();
    let mut table = Table::new(columns);
    table.add_header(column_headers(sort));
    table.add_separator();
    for _ in 0..SKELETON_ROWS {
        table.add_row(vec![PLACEHOLDER.to_string(); columns]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skeleton_has_fixed_rows() {
        let table = skeleton(None);
        assert_eq!(table.data_row_count(), 10);

        let text = table.to_string();
        assert!(text.starts_with("#"));
        assert_eq!(text.lines().count(), 12);
        assert!(text.lines().last().unwrap().contains(PLACEHOLDER));
    }
}
