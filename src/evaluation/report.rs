use crate::evaluation::cross_validation::mean;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Summary of one train/predict run.
#[derive(Clone, Debug, Serialize)]
pub struct Report {
    pub relation: String,
    pub rows: usize,
    pub features: usize,
    pub classes: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub accuracy: f64,
    pub kappa: f64,
    pub cv_scores: Option<Vec<f64>>,
    /// CPU seconds spent in fit and in predict.
    pub fit_seconds: f64,
    pub predict_seconds: f64,
    pub extras: BTreeMap<String, f64>,
}

impl Report {
    #[inline]
    fn fmtv(v: f64) -> String {
        if v.is_nan() {
            "NaN".into()
        } else {
            format!("{:.6}", v)
        }
    }

    pub fn mean_cv_accuracy(&self) -> Option<f64> {
        self.cv_scores.as_deref().map(mean)
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "rows={}, features={}, classes={}, train={}, test={}, acc={}, kappa={}",
            self.rows,
            self.features,
            self.classes,
            self.train_rows,
            self.test_rows,
            Self::fmtv(self.accuracy),
            Self::fmtv(self.kappa),
        )?;

        if let Some(cv) = self.mean_cv_accuracy() {
            write!(f, ", cv_acc={}", Self::fmtv(cv))?;
        }

        write!(
            f,
            ", fit_t={:.6}s, predict_t={:.6}s",
            self.fit_seconds, self.predict_seconds
        )?;

        for (k, v) in self.extras.iter() {
            write!(f, ", {}={}", k, Self::fmtv(*v))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> Report {
        Report {
            relation: "iris".into(),
            rows: 150,
            features: 4,
            classes: 3,
            train_rows: 112,
            test_rows: 38,
            accuracy: 0.95,
            kappa: f64::NAN,
            cv_scores: None,
            fit_seconds: 0.25,
            predict_seconds: 0.001,
            extras: BTreeMap::new(),
        }
    }

    #[test]
    fn display_without_cv() {
        let s = report().to_string();
        assert!(s.starts_with("rows=150, features=4, classes=3, train=112, test=38"));
        assert!(s.contains("acc=0.950000"));
        assert!(s.contains("kappa=NaN"));
        assert!(!s.contains("cv_acc"));
    }

    #[test]
    fn display_with_cv_and_extras() {
        let mut r = report();
        r.cv_scores = Some(vec![1.0, 0.5]);
        r.extras.insert("oob_improvement".into(), 0.5);
        let s = r.to_string();
        assert!(s.contains("cv_acc=0.750000"));
        assert!(s.ends_with("oob_improvement=0.500000"));
        assert_eq!(r.mean_cv_accuracy(), Some(0.75));
    }
}
