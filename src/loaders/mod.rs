pub mod csv;

pub use csv::CsvLoader;
