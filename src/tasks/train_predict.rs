use crate::config::TaskConfig;
use crate::core::split::train_test_split;
use crate::evaluation::{
    ConfusionMatrix, Report, StratifiedKFold, cohen_kappa, cross_val_score, mean,
};
use crate::loaders::CsvLoader;
use crate::pipeline::configured_pipeline;
use crate::tasks::prediction_dump::export_predictions;
use anyhow::{Context, Result, bail};
use cpu_time::ThreadTime;
use ndarray::Array1;
use std::collections::BTreeMap;
use tracing::info;

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    pub predictions: Array1<f64>,
    pub y_test: Array1<f64>,
    /// Dataset rows that formed the test subset, aligned with `predictions`.
    pub test_indices: Vec<usize>,
    pub classes: Vec<f64>,
    pub confusion: ConfusionMatrix,
    pub report: Report,
}

/// Load, split, optionally cross-validate, fit, predict and evaluate.
pub struct TrainPredictTask {
    config: TaskConfig,
}

impl TrainPredictTask {
    pub fn new(config: TaskConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TaskConfig {
        &self.config
    }

    pub fn run(&self) -> Result<TaskOutcome> {
        let config = &self.config;
        if config.data.as_os_str().is_empty() {
            bail!("no data file given");
        }

        let dataset = CsvLoader::new(&config.data)
            .with_separator(config.separator.as_str())
            .with_target(config.target.as_str())
            .load()
            .with_context(|| format!("failed to load {}", config.data.display()))?;

        let split = train_test_split(dataset.features(), dataset.target(), config.split_options())
            .context("failed to split dataset")?;
        info!(
            train = split.x_train.nrows(),
            test = split.x_test.nrows(),
            "split dataset"
        );

        let classifier_params = config.classifier_params();
        let factory = || configured_pipeline(config.scaler.clone(), classifier_params.clone());

        let cv_scores = match config.cv_folds {
            Some(folds) => {
                let cv = StratifiedKFold::new(folds);
                let scores = cross_val_score(factory, &split.x_train, &split.y_train, &cv)
                    .context("cross-validation failed")?;
                info!(folds, mean_accuracy = mean(&scores), "cross-validated");
                Some(scores)
            }
            None => None,
        };

        let mut pipeline = factory();
        let fit_start = ThreadTime::now();
        pipeline
            .fit(&split.x_train, &split.y_train)
            .context("failed to fit pipeline")?;
        let fit_seconds = fit_start.elapsed().as_secs_f64();

        let predict_start = ThreadTime::now();
        let predictions = pipeline
            .predict(&split.x_test)
            .context("failed to predict")?;
        let predict_seconds = predict_start.elapsed().as_secs_f64();

        let confusion = ConfusionMatrix::from_labels(&split.y_test, &predictions);
        let classes = pipeline.classifier().classes().to_vec();

        let mut extras = BTreeMap::new();
        if let Some(scores) = cv_scores.as_deref()
            && scores.len() > 1
        {
            let m = mean(scores);
            let var = scores.iter().map(|s| (s - m).powi(2)).sum::<f64>() / scores.len() as f64;
            extras.insert("cv_std".to_string(), var.sqrt());
        }

        let report = Report {
            relation: dataset.header().relation_name().to_string(),
            rows: dataset.len(),
            features: dataset.number_of_features(),
            classes: classes.len(),
            train_rows: split.x_train.nrows(),
            test_rows: split.x_test.nrows(),
            accuracy: confusion.accuracy(),
            kappa: cohen_kappa(&split.y_test, &predictions),
            cv_scores,
            fit_seconds,
            predict_seconds,
            extras,
        };
        info!(accuracy = report.accuracy, kappa = report.kappa, "predicted test rows");

        if let Some(path) = &config.dump_file
            && !path.as_os_str().is_empty()
        {
            export_predictions(
                path,
                config.dump_format,
                &split.test_indices,
                &predictions,
                &split.y_test,
            )
            .with_context(|| format!("failed to export predictions to {}", path.display()))?;
            info!(path = %path.display(), format = %config.dump_format, "wrote predictions");
        }

        Ok(TaskOutcome {
            predictions,
            y_test: split.y_test,
            test_indices: split.test_indices,
            classes,
            confusion,
            report,
        })
    }
}
