// src/dataframe_view.rs

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Row, Table, TableState},
    Frame,
};
use strum::IntoEnumIterator;
use tracing::debug;

use crate::aggregation::AggregationFunction;
use crate::data_loader::TableData;
use crate::virtual_table::VirtualTable;

const DEFAULT_COLUMN_WIDTH: u16 = 15;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnWidth {
    Fixed(u16),
    Content,
}

impl ColumnWidth {
    fn toggled(self) -> Self {
        match self {
            ColumnWidth::Fixed(_) => ColumnWidth::Content,
            ColumnWidth::Content => ColumnWidth::Fixed(DEFAULT_COLUMN_WIDTH),
        }
    }
}

pub enum ViewAction {
    None,
    Open(DataframeView),
    Close,
}

pub struct DataframeView {
    pub table: VirtualTable,
    pub title: String,
    pub selected_row: usize,
    pub selected_column: usize,
    pub table_state: TableState,

    pub show_aggregation_popup: bool,
    pub aggregation_state: ListState,
    pub selected_aggregations: HashMap<usize, Vec<AggregationFunction>>,

    pub awaiting_g_key: bool,
    pub column_widths: Vec<ColumnWidth>,
    pub horizontal_offset: u16,
    pub table_area_width: u16,
}

impl DataframeView {
    pub fn new(data: Rc<TableData>, title: impl Into<String>) -> Self {
        let mut table_state = TableState::default();
        table_state.select(Some(0));

        let mut aggregation_state = ListState::default();
        aggregation_state.select(Some(0));

        let headers_len = data.headers.len();

        DataframeView {
            table: VirtualTable::new(data),
            title: title.into(),
            selected_row: 0,
            selected_column: 0,
            table_state,

            show_aggregation_popup: false,
            aggregation_state,
            selected_aggregations: HashMap::new(),

            awaiting_g_key: false,
            column_widths: vec![ColumnWidth::Fixed(DEFAULT_COLUMN_WIDTH); headers_len],
            horizontal_offset: 0,
            table_area_width: 0,
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> ViewAction {
        if self.show_aggregation_popup {
            self.handle_popup_key(code);
            return ViewAction::None;
        }

        if self.awaiting_g_key {
            match code {
                KeyCode::Char('-') => self.selected_aggregations.clear(),
                KeyCode::Char('_') => {
                    for width in &mut self.column_widths {
                        *width = width.toggled();
                    }
                }
                _ => {}
            }
            self.awaiting_g_key = false;
            return ViewAction::None;
        }

        let column_count = self.table.data.column_count();
        match code {
            KeyCode::Char('g') => self.awaiting_g_key = true,
            KeyCode::Char('_') => {
                if let Some(width) = self.column_widths.get_mut(self.selected_column) {
                    *width = width.toggled();
                }
            }
            KeyCode::Up => self.select_row(self.selected_row.saturating_sub(1)),
            KeyCode::Down => self.select_row(self.selected_row + 1),
            KeyCode::PageUp => self.select_row(self.selected_row.saturating_sub(10)),
            KeyCode::PageDown => self.select_row(self.selected_row + 10),
            KeyCode::Home => self.select_row(0),
            KeyCode::End => self.select_row(usize::MAX),
            KeyCode::Left => {
                if self.selected_column > 0 {
                    self.selected_column -= 1;
                    self.adjust_horizontal_offset();
                }
            }
            KeyCode::Right => {
                if self.selected_column + 1 < column_count {
                    self.selected_column += 1;
                    self.adjust_horizontal_offset();
                }
            }
            KeyCode::Char('[') => self.sort_table(true),
            KeyCode::Char(']') => self.sort_table(false),
            KeyCode::Char('f') => self.filter_by_selected_cell(),
            KeyCode::Char('F') => {
                self.table.clear_filters();
                self.select_row(0);
            }
            KeyCode::Char(' ') => {
                if column_count > 0 {
                    self.show_aggregation_popup = true;
                    self.aggregation_state.select(Some(0));
                }
            }
            KeyCode::Enter => {
                if let Some(detail) = self.open_detail_view() {
                    return ViewAction::Open(detail);
                }
            }
            KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Close,
            _ => {}
        }
        ViewAction::None
    }

    fn handle_popup_key(&mut self, code: KeyCode) {
        let options = AggregationFunction::iter().count();
        match code {
            KeyCode::Up => {
                let i = match self.aggregation_state.selected() {
                    Some(0) | None => options - 1,
                    Some(i) => i - 1,
                };
                self.aggregation_state.select(Some(i));
            }
            KeyCode::Down => {
                let i = match self.aggregation_state.selected() {
                    Some(i) if i + 1 < options => i + 1,
                    _ => 0,
                };
                self.aggregation_state.select(Some(i));
            }
            KeyCode::Char(' ') => {
                let index = self.aggregation_state.selected().unwrap_or(0);
                if let Some(agg) = AggregationFunction::iter().nth(index) {
                    self.toggle_aggregation(agg);
                }
            }
            KeyCode::Enter | KeyCode::Char('q') | KeyCode::Esc => {
                self.show_aggregation_popup = false;
            }
            _ => {}
        }
    }

    pub fn toggle_aggregation(&mut self, agg: AggregationFunction) {
        let entry = self
            .selected_aggregations
            .entry(self.selected_column)
            .or_default();
        if entry.contains(&agg) {
            entry.retain(|&x| x != agg);
            if entry.is_empty() {
                self.selected_aggregations.remove(&self.selected_column);
            }
        } else {
            entry.push(agg);
        }
    }

    fn select_row(&mut self, row: usize) {
        let last = self.table.row_count().saturating_sub(1);
        self.selected_row = row.min(last);
        self.table_state.select(Some(self.selected_row));
    }

    fn adjust_horizontal_offset(&mut self) {
        let col_start = self.column_start(self.selected_column);
        let selected_col_width = self.get_column_width(self.selected_column);
        let visible_width = self.table_area_width.saturating_sub(2);

        if col_start < self.horizontal_offset {
            self.horizontal_offset = col_start;
        } else {
            let col_end = col_start.saturating_add(selected_col_width);
            if col_end > self.horizontal_offset.saturating_add(visible_width) {
                self.horizontal_offset = col_end.saturating_sub(visible_width);
            }
        }
    }

    fn column_start(&self, index: usize) -> u16 {
        (0..index).fold(0u16, |start, i| {
            start.saturating_add(self.get_column_width(i)).saturating_add(1)
        })
    }

    /// First column that starts at or after the horizontal scroll offset.
    fn first_visible_column(&self) -> usize {
        (0..self.table.data.column_count())
            .find(|&i| self.column_start(i) >= self.horizontal_offset)
            .unwrap_or(self.selected_column)
            .min(self.selected_column)
    }

    fn get_column_width(&self, index: usize) -> u16 {
        match self.column_widths[index] {
            ColumnWidth::Fixed(w) => w,
            ColumnWidth::Content => {
                let header_width = self.table.data.headers[index].chars().count();
                let max_content_width = self.table.data.columns[index]
                    .iter()
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(header_width))
                    .max()
                    .unwrap_or(10);
                u16::try_from(max_content_width)
                    .unwrap_or(u16::MAX)
                    .saturating_add(2)
            }
        }
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect) {
        let agg_results = if self.selected_aggregations.is_empty() {
            None
        } else {
            Some(self.calculate_aggregations())
        };

        let constraints = match &agg_results {
            Some(results) => vec![Constraint::Min(0), Constraint::Length(3 + results.len() as u16)],
            None => vec![Constraint::Percentage(100)],
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        self.table_area_width = chunks[0].width;
        self.render_table(f, chunks[0]);

        if let Some(agg_results) = &agg_results {
            self.render_aggregations(f, chunks[1], agg_results);
        }

        if self.show_aggregation_popup {
            self.render_aggregation_popup(f, area);
        }
    }

    fn render_table(&mut self, f: &mut Frame, area: Rect) {
        let first_col = self.first_visible_column();
        let visible_cols: Vec<usize> = (first_col..self.table.data.column_count()).collect();

        let header_cells = visible_cols.iter().map(|&i| {
            let mut style = Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
            if i == self.selected_column {
                style = style.bg(Color::Blue);
            }
            Cell::from(self.table.data.headers[i].clone()).style(style)
        });
        let header = Row::new(header_cells).height(1).bottom_margin(0);

        let rows = (0..self.table.row_count()).map(|row_idx| {
            let cells = visible_cols.iter().map(|&col_idx| {
                let mut cell = Cell::from(self.table.cell(row_idx, col_idx).to_string());
                if row_idx == self.selected_row && col_idx == self.selected_column {
                    cell = cell.style(Style::default().bg(Color::LightBlue));
                }
                cell
            });
            Row::new(cells).height(1).bottom_margin(0)
        });

        let widths = visible_cols
            .iter()
            .map(|&i| Constraint::Length(self.get_column_width(i)))
            .collect::<Vec<_>>();

        let mut title = format!(
            "{} ({} of {} rows)",
            self.title,
            self.table.row_count(),
            self.table.data.row_count()
        );
        for (col, value) in self.table.filters() {
            title.push_str(&format!(" [{} = {}]", self.table.data.headers[*col], value));
        }

        let table = Table::new(rows, &widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("-> ")
            .column_spacing(2);

        f.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn render_aggregations(
        &self,
        f: &mut Frame,
        area: Rect,
        agg_results: &HashMap<usize, HashMap<AggregationFunction, Option<String>>>,
    ) {
        let mut all_aggs: Vec<AggregationFunction> = self
            .selected_aggregations
            .values()
            .flatten()
            .copied()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        all_aggs.sort();

        let mut header_cells =
            vec![Cell::from("Column").style(Style::default().add_modifier(Modifier::BOLD))];
        for agg in &all_aggs {
            header_cells.push(Cell::from(agg.to_string()).style(Style::default().add_modifier(Modifier::BOLD)));
        }
        let header = Row::new(header_cells).height(1).bottom_margin(0);

        let mut col_indices: Vec<_> = agg_results.keys().copied().collect();
        col_indices.sort();

        let rows: Vec<Row> = col_indices
            .iter()
            .map(|col_idx| {
                let col_aggs = &agg_results[col_idx];
                let mut cells = vec![Cell::from(self.table.data.headers[*col_idx].clone())];
                for agg in &all_aggs {
                    let text = col_aggs
                        .get(agg)
                        .and_then(|result| result.clone())
                        .unwrap_or_else(|| "-".to_string());
                    cells.push(Cell::from(text));
                }
                Row::new(cells).height(1).bottom_margin(0)
            })
            .collect();

        if rows.is_empty() {
            return;
        }

        let widths = vec![Constraint::Length(DEFAULT_COLUMN_WIDTH); all_aggs.len() + 1];
        let agg_table = Table::new(rows, &widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title("Aggregations"))
            .column_spacing(1);

        f.render_widget(agg_table, area);
    }

    fn render_aggregation_popup(&mut self, f: &mut Frame, area: Rect) {
        let popup_area = centered_rect(60, 40, area);

        let block = Block::default()
            .title("Select aggregation functions (q to close)")
            .borders(Borders::ALL)
            .style(Style::default().bg(Color::Black));
        let inner_area = block.inner(popup_area);

        f.render_widget(Clear, popup_area);
        f.render_widget(block, popup_area);

        let list_height = AggregationFunction::iter().count() as u16;
        let top_padding = inner_area.height.saturating_sub(list_height) / 2;

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(top_padding),
                Constraint::Length(list_height),
                Constraint::Min(0),
            ])
            .split(inner_area);

        let chosen = self.selected_aggregations.get(&self.selected_column);
        let items: Vec<ListItem> = AggregationFunction::iter()
            .map(|agg| {
                let is_selected = chosen.is_some_and(|v| v.contains(&agg));
                let checkbox = if is_selected { "[x]" } else { "[ ]" };
                ListItem::new(format!("{} {}", checkbox, agg))
            })
            .collect();

        let list = List::new(items)
            .highlight_style(Style::default().fg(Color::Yellow).bg(Color::Blue))
            .highlight_symbol(">> ");

        f.render_stateful_widget(list, layout[1], &mut self.aggregation_state);
    }

    pub fn calculate_aggregations(&self) -> HashMap<usize, HashMap<AggregationFunction, Option<String>>> {
        let mut results = HashMap::new();

        for (&col_idx, aggs) in &self.selected_aggregations {
            let column_data = self.table.visible_column(col_idx);
            let agg_results: HashMap<_, _> = aggs
                .iter()
                .map(|&agg| (agg, agg.apply(&column_data)))
                .collect();

            if !agg_results.is_empty() {
                results.insert(col_idx, agg_results);
            }
        }

        results
    }

    pub fn open_detail_view(&self) -> Option<DataframeView> {
        if self.table.row_count() == 0 {
            return None;
        }
        let source_row = self.table.source_row(self.selected_row);
        let field_column = self.table.data.headers.clone();
        let value_column: Vec<String> = self
            .table
            .data
            .columns
            .iter()
            .map(|col| col[source_row].clone())
            .collect();

        let detail_data = TableData::new(
            vec!["Field".to_string(), "Value".to_string()],
            vec![field_column, value_column],
        );
        debug!(row = source_row, "opening row detail");

        Some(DataframeView::new(
            Rc::new(detail_data),
            format!("Row {}", source_row + 1),
        ))
    }

    fn sort_table(&mut self, ascending: bool) {
        if self.selected_column < self.table.data.column_count() {
            self.table.sort(self.selected_column, ascending);
            self.select_row(0);
        }
    }

    fn filter_by_selected_cell(&mut self) {
        if self.table.row_count() == 0 {
            return;
        }
        let value = self.table.cell(self.selected_row, self.selected_column).to_string();
        self.table.filter_eq(self.selected_column, &value);
        self.select_row(0);
    }
}

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
