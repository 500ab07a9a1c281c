// src/lib.rs

pub mod aggregation;
pub mod config;
pub mod data_explorer;
pub mod data_loader;
pub mod dataframe_view;
pub mod error;
pub mod locator;
pub mod tui_app;
pub mod virtual_table;

pub use data_loader::{get_loader, CsvLoader, DataLoader, TableData};
pub use error::DatasetError;
pub use locator::{DatasetLocation, DatasetLocator, ExecutionMode};
