use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PredictionFormat {
    #[default]
    Csv,
    Tsv,
    Json,
}

#[derive(Debug, Serialize)]
struct PredictionRecord {
    row: usize,
    predicted: f64,
    actual: f64,
}

/// Writes one `(row, predicted, actual)` record per test row.
/// `rows` are indices into the loaded dataset.
pub fn write_predictions<W: Write>(
    mut out: W,
    format: PredictionFormat,
    rows: &[usize],
    predicted: &Array1<f64>,
    actual: &Array1<f64>,
) -> io::Result<()> {
    let records = rows
        .iter()
        .zip(predicted.iter().zip(actual.iter()))
        .map(|(&row, (&predicted, &actual))| PredictionRecord {
            row,
            predicted,
            actual,
        });

    match format {
        PredictionFormat::Json => {
            let records: Vec<PredictionRecord> = records.collect();
            serde_json::to_writer_pretty(&mut out, &records).map_err(io::Error::other)?;
            writeln!(out)?;
        }
        PredictionFormat::Csv | PredictionFormat::Tsv => {
            let sep = if format == PredictionFormat::Csv { ',' } else { '\t' };
            writeln!(out, "row{sep}predicted{sep}actual")?;
            for r in records {
                writeln!(out, "{}{sep}{}{sep}{}", r.row, r.predicted, r.actual)?;
            }
        }
    }
    out.flush()
}

pub fn export_predictions(
    path: &Path,
    format: PredictionFormat,
    rows: &[usize],
    predicted: &Array1<f64>,
    actual: &Array1<f64>,
) -> io::Result<()> {
    let file = File::create(path)?;
    write_predictions(BufWriter::new(file), format, rows, predicted, actual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use serde_json::Value;
    use std::str::FromStr;

    fn render(format: PredictionFormat) -> String {
        let mut buf = Vec::new();
        write_predictions(
            &mut buf,
            format,
            &[7, 2],
            &array![1.0, 0.0],
            &array![1.0, 1.0],
        )
        .unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn csv_output() {
        assert_eq!(
            render(PredictionFormat::Csv),
            "row,predicted,actual\n7,1,1\n2,0,1\n"
        );
    }

    #[test]
    fn tsv_output() {
        let text = render(PredictionFormat::Tsv);
        assert_eq!(text.lines().next(), Some("row\tpredicted\tactual"));
        assert_eq!(text.lines().nth(2), Some("2\t0\t1"));
    }

    #[test]
    fn json_output() {
        let value: Value = serde_json::from_str(&render(PredictionFormat::Json)).unwrap();
        let records = value.as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["row"], 7);
        assert_eq!(records[1]["predicted"], 0.0);
    }

    #[test]
    fn format_parsing() {
        assert_eq!(
            PredictionFormat::from_str("JSON").unwrap(),
            PredictionFormat::Json
        );
        assert_eq!(PredictionFormat::Tsv.to_string(), "tsv");
        assert!(PredictionFormat::from_str("xml").is_err());
    }

    #[test]
    fn export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("predictions.csv");
        export_predictions(
            &path,
            PredictionFormat::Csv,
            &[0],
            &array![2.0],
            &array![2.0],
        )
        .unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "row,predicted,actual\n0,2,2\n");
    }
}
