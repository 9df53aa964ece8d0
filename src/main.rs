use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use boostline::config::TaskConfig;
use boostline::evaluation::Report;
use boostline::tasks::{TaskOutcome, TrainPredictTask};
use boostline::ui::cli::args::{Cli, Command};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const FG_CYAN: &str = "\x1b[36m";
const FG_GREEN: &str = "\x1b[32m";
const FG_MAGENTA: &str = "\x1b[35m";
const FG_GREY: &str = "\x1b[90m";

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match cli.command {
        Command::Run(args) => args.into_task_config()?,
    };

    for line in header_lines(&config) {
        println!("{line}");
    }

    let outcome = TrainPredictTask::new(config)
        .run()
        .context("run failed")?;

    print_outcome(&outcome);
    Ok(())
}

/// Logs go to stderr so stdout only carries the report.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn header_lines(config: &TaskConfig) -> Vec<String> {
    let c = &config.classifier;
    vec![
        format!(
            "{BOLD}{FG_CYAN}▶ RobustScaler → GradientBoostingClassifier{RESET}  {}",
            config.data.display()
        ),
        format!(
            "{DIM}lr={} depth={} max_features={:?} leaf={} split={} trees={} subsample={}{RESET}  {}",
            c.learning_rate,
            c.max_depth,
            c.max_features,
            c.min_samples_leaf,
            c.min_samples_split,
            c.n_estimators,
            c.subsample,
            timestamp_now()
        ),
        format!(
            "{FG_GREY}────────────────────────────────────────────────────────────────────────{RESET}"
        ),
    ]
}

fn print_outcome(outcome: &TaskOutcome) {
    let r: &Report = &outcome.report;
    println!(
        "{FG_GREEN}{BOLD}rows{RESET} {:>7}  {DIM}train{RESET} {}  {DIM}test{RESET} {}  {DIM}features{RESET} {}  {DIM}classes{RESET} {}",
        r.rows, r.train_rows, r.test_rows, r.features, r.classes
    );
    println!(
        "{FG_CYAN}{BOLD}acc{RESET} {}%  {FG_MAGENTA}{BOLD}κ{RESET} {}%  {DIM}fit{RESET} {:.3}s  {DIM}predict{RESET} {:.3}s",
        fmtf(r.accuracy * 100.0, 2),
        fmtf(r.kappa * 100.0, 2),
        r.fit_seconds,
        r.predict_seconds
    );
    if let Some(cv) = r.mean_cv_accuracy() {
        println!("{DIM}average CV score on the training set{RESET} {}", fmtf(cv, 4));
    }
    println!();
    print!("{}", outcome.confusion);
    println!();
    println!("{r}");
}

fn fmtf(x: f64, prec: usize) -> String {
    if x.is_nan() {
        format!("{DIM}NaN{RESET}")
    } else {
        format!("{:>1$.prec$}", x, 6, prec = prec)
    }
}

fn timestamp_now() -> String {
    use chrono::{Local, SecondsFormat};
    let now = Local::now();
    format!(
        "{DIM}{}{}",
        now.to_rfc3339_opts(SecondsFormat::Secs, true),
        RESET
    )
}
