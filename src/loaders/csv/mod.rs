mod csv_file_loader;
mod parser;

pub use csv_file_loader::{CsvLoader, DEFAULT_SEPARATOR, DEFAULT_TARGET};
