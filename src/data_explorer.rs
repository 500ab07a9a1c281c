// src/data_explorer.rs

//! Chart exploration over the shared dataset: pick columns for the X, Y and
//! Color channels and switch between a scatter plot and per-category counts.

use std::collections::BTreeMap;
use std::rc::Rc;

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, BarChart, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use crate::data_loader::{is_missing, ColumnKind, TableData};

const PALETTE: [Color; 6] = [
    Color::Cyan,
    Color::Magenta,
    Color::Yellow,
    Color::Green,
    Color::Red,
    Color::Blue,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, Display)]
pub enum Encoding {
    X,
    Y,
    Color,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, Display)]
pub enum Mark {
    Point,
    Bar,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub points: Vec<(f64, f64)>,
}

pub struct DataExplorer {
    pub data: Rc<TableData>,
    pub x: Option<usize>,
    pub y: Option<usize>,
    pub color: Option<usize>,
    pub focus: Encoding,
    pub mark: Mark,
}

impl DataExplorer {
    pub fn new(data: Rc<TableData>) -> Self {
        let quantitative = data.columns_of_kind(ColumnKind::Quantitative);
        let categorical = data.columns_of_kind(ColumnKind::Categorical);
        DataExplorer {
            x: quantitative.first().copied(),
            y: quantitative.get(1).or(quantitative.first()).copied(),
            color: categorical.first().copied(),
            data,
            focus: Encoding::X,
            mark: Mark::Point,
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up => self.focus = self.cycle_focus(false),
            KeyCode::Down => self.focus = self.cycle_focus(true),
            KeyCode::Left => self.cycle_column(false),
            KeyCode::Right => self.cycle_column(true),
            KeyCode::Char('m') => {
                self.mark = match self.mark {
                    Mark::Point => Mark::Bar,
                    Mark::Bar => Mark::Point,
                }
            }
            _ => {}
        }
    }

    fn cycle_focus(&self, forward: bool) -> Encoding {
        let all: Vec<Encoding> = Encoding::iter().collect();
        let pos = all.iter().position(|e| *e == self.focus).unwrap_or(0);
        let next = if forward {
            (pos + 1) % all.len()
        } else {
            (pos + all.len() - 1) % all.len()
        };
        all[next]
    }

    fn cycle_column(&mut self, forward: bool) {
        let (choices, slot) = match self.focus {
            Encoding::X => (self.options(ColumnKind::Quantitative, false), &mut self.x),
            Encoding::Y => (self.options(ColumnKind::Quantitative, false), &mut self.y),
            Encoding::Color => (self.options(ColumnKind::Categorical, true), &mut self.color),
        };
        if choices.is_empty() {
            return;
        }
        let pos = choices.iter().position(|c| *c == *slot).unwrap_or(0);
        let next = if forward {
            (pos + 1) % choices.len()
        } else {
            (pos + choices.len() - 1) % choices.len()
        };
        *slot = choices[next];
    }

    // Candidate columns for a channel, with `None` first when the channel is optional.
    fn options(&self, kind: ColumnKind, optional: bool) -> Vec<Option<usize>> {
        let columns = self.data.columns_of_kind(kind).into_iter().map(Some);
        if optional {
            std::iter::once(None).chain(columns).collect()
        } else {
            columns.collect()
        }
    }

    fn column_name(&self, col: Option<usize>) -> &str {
        col.map_or("none", |c| self.data.headers[c].as_str())
    }

    /// One series per color category, in order of first appearance. Rows with
    /// a missing x or y are left out.
    pub fn scatter_series(&self) -> Vec<Series> {
        let (Some(x), Some(y)) = (self.x, self.y) else {
            return Vec::new();
        };

        let mut series: Vec<Series> = Vec::new();
        for row in 0..self.data.row_count() {
            let (Some(px), Some(py)) = (self.data.number(x, row), self.data.number(y, row)) else {
                continue;
            };
            let name = self.category(row);
            match series.iter_mut().find(|s| s.name == name) {
                Some(s) => s.points.push((px, py)),
                None => series.push(Series {
                    name,
                    points: vec![(px, py)],
                }),
            }
        }
        series
    }

    /// Row counts per category of the color column.
    pub fn bar_counts(&self) -> Vec<(String, u64)> {
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for row in 0..self.data.row_count() {
            *counts.entry(self.category(row)).or_insert(0) += 1;
        }
        counts.into_iter().collect()
    }

    fn category(&self, row: usize) -> String {
        match self.color {
            Some(c) => {
                let value = &self.data.columns[c][row];
                if is_missing(value) {
                    "(missing)".to_string()
                } else {
                    value.clone()
                }
            }
            None => "all".to_string(),
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(28), Constraint::Min(0)])
            .split(area);

        self.render_encodings(f, chunks[0]);
        match self.mark {
            Mark::Point => self.render_scatter(f, chunks[1]),
            Mark::Bar => self.render_bars(f, chunks[1]),
        }
    }

    fn render_encodings(&self, f: &mut Frame, area: Rect) {
        let mut lines: Vec<Line> = Encoding::iter()
            .map(|encoding| {
                let col = match encoding {
                    Encoding::X => self.x,
                    Encoding::Y => self.y,
                    Encoding::Color => self.color,
                };
                let style = if encoding == self.focus {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                Line::from(vec![
                    Span::styled(format!("{:<6}", encoding.to_string()), style),
                    Span::raw(self.column_name(col).to_string()),
                ])
            })
            .collect();
        lines.push(Line::from(""));
        lines.push(Line::from(format!("Mark  {}", self.mark)));
        lines.push(Line::from(""));
        lines.push(Line::from("up/down: channel"));
        lines.push(Line::from("left/right: column"));
        lines.push(Line::from("m: mark"));

        let panel = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Encodings"));
        f.render_widget(panel, area);
    }

    fn render_scatter(&self, f: &mut Frame, area: Rect) {
        let series = self.scatter_series();
        let xs: Vec<f64> = series.iter().flat_map(|s| s.points.iter().map(|p| p.0)).collect();
        let ys: Vec<f64> = series.iter().flat_map(|s| s.points.iter().map(|p| p.1)).collect();
        let x_bounds = axis_bounds(&xs);
        let y_bounds = axis_bounds(&ys);

        let datasets: Vec<Dataset> = series
            .iter()
            .enumerate()
            .map(|(i, s)| {
                Dataset::default()
                    .name(s.name.clone())
                    .marker(Marker::Braille)
                    .graph_type(GraphType::Scatter)
                    .style(Style::default().fg(PALETTE[i % PALETTE.len()]))
                    .data(&s.points)
            })
            .collect();

        let chart = Chart::new(datasets)
            .block(Block::default().borders(Borders::ALL).title(format!(
                "{} vs {}",
                self.column_name(self.y),
                self.column_name(self.x)
            )))
            .x_axis(
                Axis::default()
                    .title(self.column_name(self.x).to_string())
                    .bounds(x_bounds)
                    .labels(bound_labels(x_bounds)),
            )
            .y_axis(
                Axis::default()
                    .title(self.column_name(self.y).to_string())
                    .bounds(y_bounds)
                    .labels(bound_labels(y_bounds)),
            );
        f.render_widget(chart, area);
    }

    fn render_bars(&self, f: &mut Frame, area: Rect) {
        let counts = self.bar_counts();
        let bars: Vec<(&str, u64)> = counts.iter().map(|(name, n)| (name.as_str(), *n)).collect();

        let chart = BarChart::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("count by {}", self.column_name(self.color))),
            )
            .data(bars.as_slice())
            .bar_width(9)
            .bar_gap(2)
            .bar_style(Style::default().fg(Color::Cyan))
            .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));
        f.render_widget(chart, area);
    }
}

/// Data range padded by 5% on each side; a flat range is widened by 1.
pub fn axis_bounds(values: &[f64]) -> [f64; 2] {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return [0.0, 1.0];
    }
    let span = max - min;
    if span == 0.0 {
        [min - 1.0, max + 1.0]
    } else {
        [min - span * 0.05, max + span * 0.05]
    }
}

fn bound_labels(bounds: [f64; 2]) -> Vec<Span<'static>> {
    let mid = (bounds[0] + bounds[1]) / 2.0;
    [bounds[0], mid, bounds[1]]
        .iter()
        .map(|v| Span::raw(format!("{:.1}", v)))
        .collect()
}
