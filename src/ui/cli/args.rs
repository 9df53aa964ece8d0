use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand, ValueHint};

use crate::config::{KeyValue, TaskConfig, parse_key_value};
use crate::tasks::PredictionFormat;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Fit a robust-scaled gradient boosting pipeline on a delimited file and predict its held-out rows"
)]
pub struct Cli {
    /// Log at debug level (overrides RUST_LOG)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load, split, fit and predict
    Run(RunArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Delimited data file with a header row
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub data: Option<PathBuf>,

    /// Column separator (`\t` or `tab` for tabs)
    #[arg(long, value_name = "SEP")]
    pub separator: Option<String>,

    /// Name of the label column
    #[arg(long, value_name = "NAME")]
    pub target: Option<String>,

    /// Share of rows held out for testing
    #[arg(long, value_name = "FRACTION")]
    pub test_size: Option<f64>,

    /// Seed for the split, cross-validation and classifier (omit for a random run)
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Cross-validate on the train subset with this many stratified folds
    #[arg(
        long,
        value_name = "K",
        value_parser = clap::value_parser!(u64).range(2..),
    )]
    pub cv_folds: Option<u64>,

    /// JSON file with a full or partial run configuration
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// File to write test-set predictions to
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub dump_file: Option<PathBuf>,

    /// Format for the dump file (csv, tsv, json)
    #[arg(long, value_name = "FORMAT")]
    pub dump_format: Option<String>,

    /// Override classifier parameters (key=value, nested keys with dots)
    #[arg(long = "classifier-param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub classifier_params: Vec<KeyValue>,

    /// Override scaler parameters (key=value, nested keys with dots)
    #[arg(long = "scaler-param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub scaler_params: Vec<KeyValue>,
}

impl RunArgs {
    pub fn into_task_config(self) -> Result<TaskConfig> {
        let mut config = match &self.config {
            Some(path) => TaskConfig::from_json_file(path)?,
            None => TaskConfig::default(),
        };

        if let Some(data) = self.data {
            config.data = data;
        }
        if let Some(separator) = self.separator {
            config.separator = separator;
        }
        if let Some(target) = self.target {
            config.target = target;
        }
        if let Some(test_size) = self.test_size {
            config.test_size = test_size;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(folds) = self.cv_folds {
            config.cv_folds = Some(folds as usize);
        }
        if let Some(path) = self.dump_file {
            config.dump_file = Some(path);
        }
        if let Some(fmt) = self.dump_format {
            config.dump_format =
                parse_dump_format(&fmt).with_context(|| format!("invalid dump format '{fmt}'"))?;
        }

        if config.data.as_os_str().is_empty() {
            return Err(anyhow!("no data file given (use --data or a config file)"));
        }

        config
            .with_overrides("classifier", &self.classifier_params)?
            .with_overrides("scaler", &self.scaler_params)
    }
}

fn parse_dump_format(input: &str) -> Result<PredictionFormat> {
    PredictionFormat::from_str(input.trim()).map_err(|_| anyhow!("unknown format '{input}'"))
}
