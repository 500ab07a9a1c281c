// Runs in its own test binary because it changes the working directory.

use std::fs;

use penguinview::{get_loader, DatasetLocation, DatasetLocator, ExecutionMode};
use tempfile::TempDir;

#[test]
fn local_mode_reads_penguins_csv_from_working_directory() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("penguins.csv"),
        "species,bill_length_mm,bill_depth_mm\n\
         Adelie,39.1,18.7\n\
         Gentoo,46.1,13.2\n\
         Chinstrap,46.5,17.9\n",
    )
    .unwrap();
    std::env::set_current_dir(dir.path()).unwrap();

    let location = DatasetLocator::new(ExecutionMode::Local).resolve().unwrap();
    assert_eq!(location, DatasetLocation::File("penguins.csv".into()));

    let loader = get_loader(location.extension().unwrap()).unwrap();
    let data = loader.load(&location).unwrap();
    assert_eq!(data.row_count(), 3);
    assert_eq!(data.headers, vec!["species", "bill_length_mm", "bill_depth_mm"]);
}
