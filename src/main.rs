// src/main.rs

use std::io::{self, Write};
use std::panic;
use std::rc::Rc;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    cursor, execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use penguinview::config::Cli;
use penguinview::data_loader::{get_loader, ColumnKind, TableData};
use penguinview::locator::{DatasetLocation, DatasetLocator};
use penguinview::tui_app::TuiApp;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(cli.log_filter()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    info!("penguinview v{}", env!("CARGO_PKG_VERSION"));

    let mode = cli.execution_mode()?;
    let locator = DatasetLocator::new(mode).with_file_name(cli.file.as_str());
    let location = locator.resolve()?;

    let extension = location.extension().unwrap_or("").to_string();
    let loader = get_loader(&extension)?;
    let data = Rc::new(
        loader
            .load(&location)
            .with_context(|| format!("loading dataset from {}", location))?,
    );

    if cli.print {
        print_summary(&mut io::stdout().lock(), &location, &data)?;
        return Ok(());
    }

    run_tui(TuiApp::new(cli.title.as_str(), data))?;
    Ok(())
}

fn print_summary<W: Write>(out: &mut W, location: &DatasetLocation, data: &TableData) -> io::Result<()> {
    writeln!(out, "source: {}", location)?;
    writeln!(out, "shape: {} rows x {} columns", data.row_count(), data.column_count())?;
    for (header, kind) in data.headers.iter().zip(&data.kinds) {
        let kind = match kind {
            ColumnKind::Quantitative => "quantitative",
            ColumnKind::Categorical => "categorical",
        };
        writeln!(out, "  {:<24} {}", header, kind)?;
    }
    Ok(())
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, cursor::Show)
}

// Leave raw mode and the alternate screen before the panic message prints.
fn install_panic_hook() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        default_hook(info);
    }));
}

fn run_tui(mut app: TuiApp) -> io::Result<()> {
    install_panic_hook();
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    terminal.hide_cursor()?;

    let result = app.main_loop(&mut terminal);

    terminal.show_cursor()?;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use penguinview::data_loader::CsvLoader;
    use std::path::PathBuf;

    #[test]
    fn summary_lists_shape_and_column_kinds() {
        let data = CsvLoader
            .read("species,body_mass_g\nAdelie,3750\nGentoo,NA\n".as_bytes())
            .unwrap();
        let location = DatasetLocation::File(PathBuf::from("penguins.csv"));
        let mut out = Vec::new();
        print_summary(&mut out, &location, &data).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("source: penguins.csv\n"));
        assert!(text.contains("shape: 2 rows x 2 columns"));
        assert!(text.contains("species"));
        assert!(text.contains("categorical"));
        assert!(text.contains("quantitative"));
    }
}
