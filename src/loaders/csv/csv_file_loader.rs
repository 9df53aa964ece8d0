use crate::core::dataset::Dataset;
use crate::core::table_header::TableHeader;
use crate::errors::LoadError;
use crate::loaders::csv::parser::{is_blank, parse_header_line, parse_row_values};
use crate::utils::file_parsing::unescape_separator;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

pub const DEFAULT_SEPARATOR: &str = ",";
pub const DEFAULT_TARGET: &str = "target";

/// Reads a delimited text file with a header row into a [`Dataset`].
#[derive(Debug, Clone)]
pub struct CsvLoader {
    path: PathBuf,
    separator: String,
    target: String,
}

impl CsvLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            separator: DEFAULT_SEPARATOR.to_string(),
            target: DEFAULT_TARGET.to_string(),
        }
    }

    /// `\t` and `tab` select a tab, `\s` and `space` a single space.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = unescape_separator(&separator.into());
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Dataset, LoadError> {
        let (header, rows) = self.read_table()?;
        let dataset = Dataset::from_rows(header, &rows)?;
        tracing::info!(
            path = %self.path.display(),
            rows = dataset.len(),
            features = dataset.number_of_features(),
            target = %self.target,
            "loaded dataset"
        );
        Ok(dataset)
    }

    /// Reads the header and every data row, target column included.
    pub fn read_table(&self) -> Result<(TableHeader, Vec<Vec<f64>>), LoadError> {
        if self.separator.is_empty() {
            return Err(LoadError::EmptySeparator);
        }

        let file = File::open(&self.path).map_err(|source| self.io_error(source))?;
        let mut reader = BufReader::new(file);

        let relation = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed_relation".to_string());

        let mut line = String::new();
        let mut line_number = 0usize;
        let header = loop {
            line.clear();
            let n = reader
                .read_line(&mut line)
                .map_err(|source| self.io_error(source))?;
            if n == 0 {
                return Err(LoadError::Empty);
            }
            line_number += 1;
            if is_blank(&line) {
                continue;
            }
            break parse_header_line(relation, &line, &self.separator, &self.target)?;
        };

        let mut rows = Vec::new();
        loop {
            line.clear();
            let n = reader
                .read_line(&mut line)
                .map_err(|source| self.io_error(source))?;
            if n == 0 {
                break;
            }
            line_number += 1;
            if is_blank(&line) {
                continue;
            }
            rows.push(parse_row_values(
                &header,
                &line,
                line_number,
                &self.separator,
            )?);
        }

        if rows.is_empty() {
            return Err(LoadError::NoRows);
        }

        Ok((header, rows))
    }

    fn io_error(&self, source: std::io::Error) -> LoadError {
        LoadError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().expect("tempfile");
        f.write_all(contents.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn loads_features_and_target() {
        let tf = write_csv("a,b,target\n1,2,0\n3,4,1\n5,6,1\n");
        let ds = CsvLoader::new(tf.path()).load().unwrap();

        assert_eq!(ds.len(), 3);
        assert_eq!(ds.number_of_features(), 2);
        assert_eq!(ds.header().feature_names(), vec!["a", "b"]);
        assert_eq!(ds.features().row(1).to_vec(), vec![3.0, 4.0]);
        assert_eq!(ds.target().to_vec(), vec![0.0, 1.0, 1.0]);
    }

    #[test]
    fn honours_custom_separator_and_target() {
        let tf = write_csv("label\tx\n2\t0.5\n3\t1.5\n");
        let ds = CsvLoader::new(tf.path())
            .with_separator("\t")
            .with_target("label")
            .load()
            .unwrap();

        assert_eq!(ds.target().to_vec(), vec![2.0, 3.0]);
        assert_eq!(ds.features().column(0).to_vec(), vec![0.5, 1.5]);
    }

    #[test]
    fn skips_blank_lines() {
        let tf = write_csv("\na,target\n\n1,0\n  \n2,1\n");
        let ds = CsvLoader::new(tf.path()).load().unwrap();
        assert_eq!(ds.len(), 2);
    }

    #[test]
    fn apostrophe_in_column_name_keeps_separators() {
        let tf = write_csv("patient's age,bmi,target\n40,22.5,0\n51,30.1,1\n");
        let ds = CsvLoader::new(tf.path()).load().unwrap();
        assert_eq!(ds.header().feature_names(), vec!["patient's age", "bmi"]);
        assert_eq!(ds.features().row(1).to_vec(), vec![51.0, 30.1]);
        assert_eq!(ds.target().to_vec(), vec![0.0, 1.0]);
    }

    #[test]
    fn hash_prefixed_header_is_not_a_comment() {
        let tf = write_csv("#id,x,target\n1,0.5,0\n2,1.5,1\n");
        let ds = CsvLoader::new(tf.path()).load().unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.header().feature_names(), vec!["#id", "x"]);
        assert_eq!(ds.features().column(0).to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = CsvLoader::new("no/such/file.csv").load().unwrap_err();
        match err {
            LoadError::Io { source, .. } => {
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound)
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn empty_file_errors() {
        let tf = write_csv("");
        assert!(matches!(
            CsvLoader::new(tf.path()).load().unwrap_err(),
            LoadError::Empty
        ));
    }

    #[test]
    fn header_only_errors() {
        let tf = write_csv("a,target\n");
        assert!(matches!(
            CsvLoader::new(tf.path()).load().unwrap_err(),
            LoadError::NoRows
        ));
    }

    #[test]
    fn missing_target_column_errors() {
        let tf = write_csv("a,class\n1,0\n");
        assert!(matches!(
            CsvLoader::new(tf.path()).load().unwrap_err(),
            LoadError::MissingTarget(_)
        ));
    }

    #[test]
    fn non_numeric_cell_reports_file_line() {
        let tf = write_csv("a,target\n1,0\n\nx,1\n");
        let err = CsvLoader::new(tf.path()).load().unwrap_err();
        assert!(matches!(err, LoadError::NonNumeric { line: 4, .. }));
    }

    #[test]
    fn empty_separator_errors() {
        let tf = write_csv("a,target\n1,0\n");
        assert!(matches!(
            CsvLoader::new(tf.path()).with_separator("").load().unwrap_err(),
            LoadError::EmptySeparator
        ));
    }

    #[test]
    fn missing_label_errors() {
        let tf = write_csv("a,target\n1,\n");
        assert!(matches!(
            CsvLoader::new(tf.path()).load().unwrap_err(),
            LoadError::MissingLabel { .. }
        ));
    }
}
