// src/virtual_table.rs

use std::cmp::Ordering;
use std::rc::Rc;

use crate::data_loader::{is_missing, TableData};

// Numbers sort before text, and missing cells sort last.
#[derive(Debug)]
enum SortKey<'a> {
    Number(f64),
    Text(&'a str),
    Missing,
}

fn sort_key(cell: &str) -> SortKey<'_> {
    if is_missing(cell) {
        return SortKey::Missing;
    }
    match cell.trim().parse::<f64>() {
        Ok(num) if !num.is_nan() => SortKey::Number(num),
        _ => SortKey::Text(cell),
    }
}

/// Total order over cells: numbers compare numerically, text lexically.
pub fn compare_cells(a: &str, b: &str) -> Ordering {
    match (sort_key(a), sort_key(b)) {
        (SortKey::Number(x), SortKey::Number(y)) => x.total_cmp(&y),
        (SortKey::Text(x), SortKey::Text(y)) => x.cmp(y),
        (SortKey::Missing, SortKey::Missing) => Ordering::Equal,
        (x, y) => rank(&x).cmp(&rank(&y)),
    }
}

fn rank(key: &SortKey<'_>) -> u8 {
    match key {
        SortKey::Number(_) => 0,
        SortKey::Text(_) => 1,
        SortKey::Missing => 2,
    }
}

/// A read-only window onto shared table data. Sorting and filtering only
/// change which rows are visible and in what order.
pub struct VirtualTable {
    pub data: Rc<TableData>,
    order: Vec<usize>,
    sort: Option<(usize, bool)>,
    filters: Vec<(usize, String)>,
}

impl VirtualTable {
    pub fn new(data: Rc<TableData>) -> Self {
        let order = (0..data.row_count()).collect();
        VirtualTable {
            data,
            order,
            sort: None,
            filters: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.order.len()
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        &self.data.columns[col][self.order[row]]
    }

    pub fn visible_column(&self, col: usize) -> Vec<&str> {
        let column = &self.data.columns[col];
        self.order.iter().map(|&i| column[i].as_str()).collect()
    }

    pub fn source_row(&self, row: usize) -> usize {
        self.order[row]
    }

    pub fn filters(&self) -> &[(usize, String)] {
        &self.filters
    }

    pub fn sort(&mut self, col: usize, ascending: bool) {
        let column = &self.data.columns[col];
        self.order.sort_by(|&i, &j| {
            let ord = compare_cells(&column[i], &column[j]);
            if ascending {
                ord
            } else {
                ord.reverse()
            }
        });
        self.sort = Some((col, ascending));
    }

    /// Keeps only rows whose `col` equals `value`.
    pub fn filter_eq(&mut self, col: usize, value: &str) {
        let column = &self.data.columns[col];
        self.order.retain(|&i| column[i] == value);
        self.filters.push((col, value.to_string()));
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.order = (0..self.data.row_count()).collect();
        if let Some((col, ascending)) = self.sort {
            self.sort(col, ascending);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> VirtualTable {
        let data = TableData::new(
            vec!["species".to_string(), "mass".to_string()],
            vec![
                vec!["Adelie", "Gentoo", "Adelie", "Chinstrap"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
                vec!["3750", "5000", "325", "3500"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
            ],
        );
        VirtualTable::new(Rc::new(data))
    }

    #[test]
    fn numeric_sort_is_not_lexicographic() {
        let mut t = table();
        t.sort(1, true);
        assert_eq!(t.visible_column(1), vec!["325", "3500", "3750", "5000"]);
        t.sort(1, false);
        assert_eq!(t.visible_column(1), vec!["5000", "3750", "3500", "325"]);
        assert_eq!(t.cell(0, 0), "Gentoo");
    }

    #[test]
    fn sorting_leaves_shared_data_untouched() {
        let mut t = table();
        let shared = Rc::clone(&t.data);
        t.sort(0, false);
        assert_eq!(shared.columns[0][0], "Adelie");
        assert_eq!(t.cell(0, 0), "Gentoo");
        assert_eq!(t.source_row(0), 1);
    }

    #[test]
    fn filter_then_clear_restores_sorted_rows() {
        let mut t = table();
        t.sort(1, true);
        t.filter_eq(0, "Adelie");
        assert_eq!(t.row_count(), 2);
        assert_eq!(t.visible_column(1), vec!["325", "3750"]);
        assert_eq!(t.filters().len(), 1);

        t.clear_filters();
        assert_eq!(t.row_count(), 4);
        assert!(t.filters().is_empty());
        assert_eq!(t.visible_column(1), vec!["325", "3500", "3750", "5000"]);
    }

    #[test]
    fn compare_cells_falls_back_to_text() {
        assert_eq!(compare_cells("10", "9"), Ordering::Greater);
        assert_eq!(compare_cells("NA", "9"), Ordering::Greater);
        assert_eq!(compare_cells("Adelie", "Gentoo"), Ordering::Less);
        assert_eq!(compare_cells("NaN", "NA"), Ordering::Equal);
    }

    #[test]
    fn comparison_is_transitive_across_numbers_and_text() {
        assert_eq!(compare_cells("10", "1a"), Ordering::Less);
        assert_eq!(compare_cells("1a", "9"), Ordering::Greater);
        assert_eq!(compare_cells("9", "10"), Ordering::Less);
        assert_eq!(compare_cells("NaN", "3"), Ordering::Greater);
    }

    fn single_column(cells: Vec<String>) -> VirtualTable {
        let data = TableData::new(vec!["value".to_string()], vec![cells]);
        VirtualTable::new(Rc::new(data))
    }

    #[test]
    fn mixed_column_sorts_in_both_directions() {
        let cells: Vec<String> = (0..64)
            .map(|i| match i % 4 {
                0 => "NaN".to_string(),
                1 => "NA".to_string(),
                2 => format!("{}a", i % 10),
                _ => (i * 7 % 23).to_string(),
            })
            .collect();
        let mut t = single_column(cells);

        t.sort(0, true);
        let asc: Vec<String> = t.visible_column(0).into_iter().map(String::from).collect();
        assert_eq!(asc.len(), 64);
        assert!(asc.windows(2).all(|w| compare_cells(&w[0], &w[1]) != Ordering::Greater));
        assert_eq!(asc[0], "0");
        assert!(asc[32..].iter().all(|c| c == "NaN" || c == "NA"));

        t.sort(0, false);
        let desc = t.visible_column(0);
        assert!(desc.windows(2).all(|w| compare_cells(w[0], w[1]) != Ordering::Less));
        assert!(desc[..32].iter().all(|c| *c == "NaN" || *c == "NA"));
    }

    #[test]
    fn numbers_with_alphanumeric_text_sort() {
        let cells: Vec<String> = (0..64)
            .map(|i| if i % 2 == 0 { i.to_string() } else { format!("{}a", i % 10) })
            .collect();
        let mut t = single_column(cells);
        t.sort(0, true);
        let sorted = t.visible_column(0);
        assert_eq!(sorted[0], "0");
        assert_eq!(sorted[31], "62");
        assert_eq!(sorted[32], "1a");
    }
}
