use crate::core::table_header::TableHeader;
use crate::errors::LoadError;
use ndarray::{Array1, Array2};

/// A numeric table split into a feature matrix and a target vector.
#[derive(Clone, Debug)]
pub struct Dataset {
    header: TableHeader,
    features: Array2<f64>,
    target: Array1<f64>,
}

impl Dataset {
    /// Builds a dataset from full rows (target column included), dropping the
    /// target column from the feature matrix.
    pub fn from_rows(header: TableHeader, rows: &[Vec<f64>]) -> Result<Self, LoadError> {
        if rows.is_empty() {
            return Err(LoadError::NoRows);
        }

        let n_columns = header.number_of_columns();
        let target_index = header.target_index();

        let mut target = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n_columns {
                return Err(LoadError::RaggedRow {
                    line: i + 2,
                    expected: n_columns,
                    found: row.len(),
                });
            }
            let label = row[target_index];
            if label.is_nan() {
                return Err(LoadError::MissingLabel { line: i + 2 });
            }
            target.push(label);
        }

        let features = Array2::from_shape_fn((rows.len(), header.number_of_features()), |(i, j)| {
            rows[i][header.feature_index_to_column_index(j)]
        });

        Ok(Self {
            header,
            features,
            target: Array1::from_vec(target),
        })
    }

    pub fn header(&self) -> &TableHeader {
        &self.header
    }

    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    pub fn target(&self) -> &Array1<f64> {
        &self.target
    }

    pub fn into_parts(self) -> (Array2<f64>, Array1<f64>) {
        (self.features, self.target)
    }

    pub fn len(&self) -> usize {
        self.features.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.features.nrows() == 0
    }

    pub fn number_of_features(&self) -> usize {
        self.features.ncols()
    }

    /// Distinct target values in ascending order.
    pub fn classes(&self) -> Vec<f64> {
        let mut classes: Vec<f64> = self.target.to_vec();
        classes.sort_by(f64::total_cmp);
        classes.dedup();
        classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> TableHeader {
        TableHeader::new(
            "t".into(),
            vec!["x0".into(), "x1".into(), "target".into(), "x2".into()],
            2,
        )
    }

    #[test]
    fn dropping_target_leaves_one_fewer_column() {
        let rows = vec![vec![1.0, 2.0, 0.0, 3.0], vec![4.0, 5.0, 1.0, 6.0]];
        let ds = Dataset::from_rows(header(), &rows).unwrap();

        assert_eq!(ds.number_of_features(), header().number_of_columns() - 1);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.features().row(0).to_vec(), vec![1.0, 2.0, 3.0]);
        assert_eq!(ds.features().row(1).to_vec(), vec![4.0, 5.0, 6.0]);
        assert_eq!(ds.target().to_vec(), vec![0.0, 1.0]);
    }

    #[test]
    fn classes_are_sorted_and_unique() {
        let rows = vec![
            vec![0.0, 0.0, 2.0, 0.0],
            vec![0.0, 0.0, 1.0, 0.0],
            vec![0.0, 0.0, 2.0, 0.0],
        ];
        let ds = Dataset::from_rows(header(), &rows).unwrap();
        assert_eq!(ds.classes(), vec![1.0, 2.0]);
    }

    #[test]
    fn nan_label_is_rejected() {
        let rows = vec![vec![1.0, 2.0, f64::NAN, 3.0]];
        let err = Dataset::from_rows(header(), &rows).unwrap_err();
        assert!(matches!(err, LoadError::MissingLabel { line: 2 }));
    }

    #[test]
    fn ragged_row_is_rejected() {
        let rows = vec![vec![1.0, 2.0, 0.0]];
        let err = Dataset::from_rows(header(), &rows).unwrap_err();
        assert!(matches!(
            err,
            LoadError::RaggedRow {
                expected: 4,
                found: 3,
                ..
            }
        ));
    }

    #[test]
    fn no_rows_is_rejected() {
        let err = Dataset::from_rows(header(), &[]).unwrap_err();
        assert!(matches!(err, LoadError::NoRows));
    }
}
