use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use nalgebra::DVector;
use tracing::{error, info};

use rusty_id3::data::dataset::Dataset;
use rusty_id3::data::reader::read_dataset;
use rusty_id3::forests::classifier::RandomForestClassifier;
use rusty_id3::forests::params::ForestParams;
use rusty_id3::metrics::confusion::ConfusionMatrix;
use rusty_id3::metrics::validation::{CrossValidation, CrossValidationResult, FoldSizing};
use rusty_id3::pool::{PoolConfig, WorkerPools};
use rusty_id3::trees::classifier::DecisionTreeClassifier;
use rusty_id3::trees::params::TreeParams;

#[derive(Parser)]
#[command(name = "rusty-id3")]
#[command(about = "Build and cross-validate ID3 trees and attribute-bagged forests")]
#[command(version)]
struct Cli {
    /// Path to the data file, one `label,value_1,...,value_n` line per instance
    data: PathBuf,

    /// Comma separated attribute names, in column order
    #[arg(value_delimiter = ',', required = true)]
    attributes: Vec<String>,

    /// Number of cross-validation folds
    #[arg(long, default_value_t = 10)]
    folds: usize,

    /// Max depths to evaluate the midpoint strategy with
    #[arg(long, value_delimiter = ',', default_value = "2,3,4")]
    depths: Vec<u16>,

    /// Number of trees in the forest
    #[arg(long, default_value_t = 10)]
    trees: usize,

    /// Attributes sampled for each forest tree
    #[arg(long, default_value_t = 6)]
    sample_size: usize,

    /// RNG seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Threads evaluating attributes during greedy split search
    #[arg(long, default_value_t = 140)]
    attribute_workers: usize,

    /// Threads building forest trees
    #[arg(long, default_value_t = 40)]
    tree_workers: usize,

    /// What the fold size is computed from
    #[arg(long, value_enum, default_value_t = Sizing::Attributes)]
    fold_sizing: Sizing,

    /// Enable verbose (debug-level) logging
    #[arg(long)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long)]
    quiet: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Sizing {
    /// ceil(attribute count / folds)
    Attributes,
    /// ceil(record count / folds)
    Records,
}

impl From<Sizing> for FoldSizing {
    fn from(sizing: Sizing) -> Self {
        match sizing {
            Sizing::Attributes => FoldSizing::ByAttributeCount,
            Sizing::Records => FoldSizing::ByRecordCount,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(&cli) {
        error!("{err:#}");
        return Err(err);
    }
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    let dataset: Dataset<f64, i64> = read_dataset(&cli.data, &cli.attributes)
        .with_context(|| format!("failed to read {}", cli.data.display()))?;
    info!(
        instances = dataset.len(),
        attributes = dataset.attributes().len(),
        "dataset loaded"
    );

    let mut config = PoolConfig::new();
    config.set_attribute_workers(cli.attribute_workers)?;
    config.set_tree_workers(cli.tree_workers)?;
    let pools = WorkerPools::new(&config).context("failed to start worker pools")?;

    let mut cv = CrossValidation::new(cli.folds)?;
    cv.set_sizing(cli.fold_sizing.into());

    for &max_depth in &cli.depths {
        let mut params = TreeParams::midpoint(max_depth)?;
        params.set_seed(cli.seed);
        let name = format!("midpoint split (max depth {max_depth})");
        evaluate_tree(&name, params, &dataset, &pools, &cv)?;
    }

    let mut params = TreeParams::new();
    params.set_seed(cli.seed);
    evaluate_tree("greedy split", params, &dataset, &pools, &cv)?;

    let mut forest_params = ForestParams::new();
    forest_params.set_num_trees(cli.trees)?;
    forest_params.set_attribute_sample_size(cli.sample_size)?;
    forest_params.set_seed(cli.seed);

    let result = cv
        .evaluate(&dataset, |training| {
            let mut forest = RandomForestClassifier::with_params(forest_params.clone(), pools.clone());
            forest.fit(training)?;
            Ok(forest)
        })
        .context("forest cross-validation failed")?;
    report(
        &format!("random forest ({} trees, {} attributes each)", cli.trees, cli.sample_size),
        &cv,
        &result,
    );
    Ok(())
}

fn evaluate_tree(
    name: &str,
    params: TreeParams,
    dataset: &Dataset<f64, i64>,
    pools: &WorkerPools,
    cv: &CrossValidation,
) -> Result<()> {
    let start = Instant::now();
    let mut tree = DecisionTreeClassifier::with_params(params.clone(), pools.attributes().clone());
    tree.fit(dataset)
        .with_context(|| format!("failed to build {name} tree"))?;
    info!(
        tree = name,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "tree built on full dataset"
    );
    println!("== {name} ==\n{tree}");

    let actual = DVector::from_iterator(
        dataset.len(),
        dataset.records().iter().map(|record| record.class()),
    );
    let resubstitution = ConfusionMatrix::from_predictions(&actual, &tree.predict_dataset(dataset)?)?;
    println!("training accuracy: {:.4}\n", resubstitution.accuracy());

    let result = cv
        .evaluate(dataset, |training| {
            let mut tree = DecisionTreeClassifier::with_params(params.clone(), pools.attributes().clone());
            tree.fit(training)?;
            Ok(tree)
        })
        .with_context(|| format!("{name} cross-validation failed"))?;
    report(name, cv, &result);
    Ok(())
}

fn report(name: &str, cv: &CrossValidation, result: &CrossValidationResult<i64>) {
    info!(
        model = name,
        accuracy = result.confusion.accuracy(),
        folds = result.folds,
        "cross-validation finished"
    );
    println!("== {name}: {}-fold cross-validation ==\n{result}", cv.k());
}
