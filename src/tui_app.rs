// src/tui_app.rs

use std::io;
use std::rc::Rc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Paragraph, Tabs},
    Frame, Terminal,
};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};
use tracing::debug;

use crate::data_explorer::DataExplorer;
use crate::data_loader::TableData;
use crate::dataframe_view::{DataframeView, ViewAction};

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, Display)]
pub enum Panel {
    Dataframe,
    Explorer,
}

/// Both panels hold the same `Rc<TableData>`; neither can mutate it.
pub struct TuiApp {
    pub title: String,
    pub active: Panel,
    pub view_stack: Vec<DataframeView>,
    pub explorer: DataExplorer,
    pub running: bool,
}

impl TuiApp {
    pub fn new(title: impl Into<String>, data: Rc<TableData>) -> Self {
        TuiApp {
            title: title.into(),
            active: Panel::Dataframe,
            view_stack: vec![DataframeView::new(Rc::clone(&data), "Dataframe")],
            explorer: DataExplorer::new(data),
            running: true,
        }
    }

    pub fn main_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        while self.running {
            terminal.draw(|f| self.draw_ui(f))?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }
        Ok(())
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        if code == KeyCode::Tab && !self.popup_open() {
            self.active = match self.active {
                Panel::Dataframe => Panel::Explorer,
                Panel::Explorer => Panel::Dataframe,
            };
            debug!(panel = %self.active, "switched panel");
            return;
        }

        match self.active {
            Panel::Dataframe => {
                let Some(view) = self.view_stack.last_mut() else {
                    self.running = false;
                    return;
                };
                match view.handle_key(code) {
                    ViewAction::None => {}
                    ViewAction::Open(detail) => self.view_stack.push(detail),
                    ViewAction::Close => {
                        self.view_stack.pop();
                        if self.view_stack.is_empty() {
                            self.running = false;
                        }
                    }
                }
            }
            Panel::Explorer => match code {
                KeyCode::Char('q') | KeyCode::Esc => self.running = false,
                _ => self.explorer.handle_key(code),
            },
        }
    }

    fn popup_open(&self) -> bool {
        self.active == Panel::Dataframe
            && self
                .view_stack
                .last()
                .is_some_and(|view| view.show_aggregation_popup)
    }

    pub fn draw_ui(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(f.area());

        let title = Paragraph::new(Line::from(self.title.clone()))
            .style(Style::default().add_modifier(Modifier::BOLD));
        f.render_widget(title, chunks[0]);

        let selected = Panel::iter().position(|p| p == self.active).unwrap_or(0);
        let tabs = Tabs::new(Panel::iter().map(|p| p.to_string()).collect::<Vec<_>>())
            .select(selected)
            .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
        f.render_widget(tabs, chunks[1]);

        self.draw_panel(f, chunks[2]);

        let help = match self.active {
            Panel::Dataframe => {
                "tab: explorer  [ ]: sort  f/F: filter/clear  space: aggregate  enter: row  q: back"
            }
            Panel::Explorer => "tab: dataframe  up/down: channel  left/right: column  m: mark  q: quit",
        };
        f.render_widget(
            Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
            chunks[3],
        );
    }

    fn draw_panel(&mut self, f: &mut Frame, area: Rect) {
        match self.active {
            Panel::Dataframe => {
                if let Some(view) = self.view_stack.last_mut() {
                    view.render(f, area);
                }
            }
            Panel::Explorer => self.explorer.render(f, area),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_loader::CsvLoader;
    use ratatui::backend::TestBackend;

    fn app() -> TuiApp {
        let data = CsvLoader
            .read("species,bill_length_mm,bill_depth_mm\nAdelie,39.1,18.7\nGentoo,46.1,13.2\n".as_bytes())
            .unwrap();
        TuiApp::new("Palmer penguins", Rc::new(data))
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn panels_share_one_dataset() {
        let app = app();
        assert!(Rc::ptr_eq(&app.view_stack[0].table.data, &app.explorer.data));
    }

    #[test]
    fn tab_switches_panels() {
        let mut app = app();
        app.handle_key(KeyCode::Tab);
        assert_eq!(app.active, Panel::Explorer);
        app.handle_key(KeyCode::Right);
        assert_eq!(app.explorer.x, Some(2));
        app.handle_key(KeyCode::Tab);
        assert_eq!(app.active, Panel::Dataframe);
    }

    #[test]
    fn tab_is_ignored_while_aggregation_popup_is_open() {
        let mut app = app();
        app.handle_key(KeyCode::Char(' '));
        app.handle_key(KeyCode::Tab);
        assert_eq!(app.active, Panel::Dataframe);
    }

    #[test]
    fn quit_closes_detail_before_exiting() {
        let mut app = app();
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.view_stack.len(), 2);
        app.handle_key(KeyCode::Char('q'));
        assert_eq!(app.view_stack.len(), 1);
        assert!(app.running);
        app.handle_key(KeyCode::Char('q'));
        assert!(!app.running);
    }

    #[test]
    fn quit_from_explorer() {
        let mut app = app();
        app.handle_key(KeyCode::Tab);
        app.handle_key(KeyCode::Char('q'));
        assert!(!app.running);
    }

    #[test]
    fn draws_title_tabs_and_both_panels() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();

        terminal.draw(|f| app.draw_ui(f)).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("Palmer penguins"));
        assert!(text.contains("Explorer"));
        assert!(text.contains("Adelie"));

        app.handle_key(KeyCode::Tab);
        terminal.draw(|f| app.draw_ui(f)).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("Encodings"));
        assert!(text.contains("bill_depth_mm vs bill_length_mm"));
    }
}
