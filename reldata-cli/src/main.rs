//! reldata: command-line frontend for relational dataset releases
//!
//! # Subcommands
//! - `home`: print the data home directory
//! - `clear`: delete everything cached in the data home
//! - `latest`: print the newest release tag
//! - `fetch <name> [--version V]`: download (or reuse) an archive, print its path
//! - `load <name> [--version V] [--fold K] [--json]`: deserialize a train/test split
//! - `convert <input.json> [--names a,b,..]`: turn a vector dataset into facts and modes

use anyhow::Context;
use clap::{Parser, Subcommand};
use ndarray::{Array1, Array2};
use reldata_core::{
    clear_data_home, from_numpy, get_data_home, load, ArchiveSource, DatasetsConfig, Element,
    RelationalDataset, ReleaseClient, DEFAULT_FOLD,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "reldata",
    version,
    about = "Fetch, load and convert relational datasets"
)]
struct Cli {
    /// Optional TOML config file
    #[arg(long, env = "RELATIONAL_DATASETS_CONFIG")]
    config: Option<String>,

    /// Data home directory (overrides the config file and RELATIONAL_DATASETS)
    #[arg(long)]
    data_home: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the data home directory
    Home,

    /// Delete all cached archives
    Clear,

    /// Print the latest release version
    Latest,

    /// Download a dataset archive (if not cached) and print its local path
    Fetch {
        /// Dataset name, e.g. toy_cancer
        name: String,

        /// Release version, e.g. v0.0.3 (defaults to the configured version)
        #[arg(long)]
        version: Option<String>,
    },

    /// Load the train/test split of a dataset
    Load {
        /// Dataset name, e.g. toy_cancer
        name: String,

        /// Release version, e.g. v0.0.3 (defaults to the configured version)
        #[arg(long)]
        version: Option<String>,

        /// Fold to load from cross-validated datasets
        #[arg(long, default_value_t = DEFAULT_FOLD)]
        fold: usize,

        /// Print both splits as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Convert a JSON vector dataset `{"x": [[..]], "y": [..]}` to facts
    Convert {
        /// Path to the JSON input
        input: PathBuf,

        /// Comma-separated relation names: one per feature, then the target
        #[arg(long, value_delimiter = ',')]
        names: Option<Vec<String>>,
    },
}

// ============================================================================
// Convert Input
// ============================================================================

/// JSON shape accepted by `convert`.
#[derive(Debug, Deserialize)]
pub struct VectorInput {
    pub x: Vec<Vec<serde_json::Number>>,
    pub y: Vec<serde_json::Number>,
    #[serde(default)]
    pub names: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct ConvertOutput {
    pub dataset: RelationalDataset,
    pub modes: Vec<String>,
}

#[derive(Debug, Serialize)]
struct LoadOutput {
    train: RelationalDataset,
    test: RelationalDataset,
}

/// Feature matrix parsed from JSON: all-integer input stays integer, anything else is float.
#[derive(Debug)]
enum Matrix {
    Int(Array2<i64>),
    Float(Array2<f64>),
}

fn all_integers<'a>(values: impl IntoIterator<Item = &'a serde_json::Number>) -> bool {
    values.into_iter().all(|n| n.as_i64().is_some())
}

fn parse_matrix(rows: &[Vec<serde_json::Number>]) -> anyhow::Result<Matrix> {
    let width = rows.first().map(|r| r.len()).unwrap_or(0);
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
        anyhow::bail!("row {} of x has {} values, expected {}", i + 1, row.len(), width);
    }

    let shape = (rows.len(), width);
    let cells = rows.iter().flatten();
    Ok(if all_integers(cells.clone()) {
        Matrix::Int(Array2::from_shape_vec(shape, cells.filter_map(|n| n.as_i64()).collect())?)
    } else {
        Matrix::Float(Array2::from_shape_vec(shape, cells.filter_map(|n| n.as_f64()).collect())?)
    })
}

fn convert_typed<A: Element>(
    x: Array2<A>,
    y: &[serde_json::Number],
    names: Option<&[String]>,
) -> anyhow::Result<ConvertOutput> {
    let (dataset, modes) = if all_integers(y) {
        let y: Array1<i64> = y.iter().filter_map(|n| n.as_i64()).collect();
        from_numpy(x.view(), y.view(), names)?
    } else {
        let y: Array1<f64> = y.iter().filter_map(|n| n.as_f64()).collect();
        from_numpy(x.view(), y.view(), names)?
    };
    Ok(ConvertOutput { dataset, modes })
}

/// Convert a parsed JSON vector dataset. Integer `y` means classification, float `y` regression.
pub fn convert_input(input: &VectorInput, names: Option<&[String]>) -> anyhow::Result<ConvertOutput> {
    let names = names.or(input.names.as_deref());
    match parse_matrix(&input.x)? {
        Matrix::Int(x) => convert_typed(x, &input.y, names),
        Matrix::Float(x) => convert_typed(x, &input.y, names),
    }
}

// ============================================================================
// Commands
// ============================================================================

fn do_load(
    client: &ReleaseClient,
    name: &str,
    version: Option<&str>,
    fold: usize,
    json_output: bool,
) -> anyhow::Result<()> {
    let (train, test) = load(client, name, version, fold)
        .with_context(|| format!("failed to load {}", name))?;

    if json_output {
        let out = LoadOutput { train, test };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for (split, data) in [("train", &train), ("test", &test)] {
            println!(
                "{:<6} pos={:<6} neg={:<6} facts={}",
                split,
                data.pos.len(),
                data.neg.len(),
                data.facts.len()
            );
        }
    }
    Ok(())
}

fn do_convert(input: &Path, names: Option<&[String]>) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let parsed: VectorInput = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse {}", input.display()))?;
    let out = convert_input(&parsed, names)?;
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = DatasetsConfig::load_or_default(cli.config.as_deref())
        .context("failed to load config")?;
    if cli.data_home.is_some() {
        config.data_home = cli.data_home.clone();
    }

    // Init logging (stderr, so stdout stays machine-readable)
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(command = ?cli.command, "Running command");

    match cli.command {
        Commands::Home => {
            let home = get_data_home(config.data_home.as_deref())?;
            println!("{}", home.display());
        }
        Commands::Clear => {
            clear_data_home(config.data_home.as_deref())?;
        }
        Commands::Latest => {
            let client = ReleaseClient::new(&config)?;
            println!("{}", client.latest_version()?);
        }
        Commands::Fetch { name, version } => {
            let client = ReleaseClient::new(&config)?;
            let path = client.fetch(&name, version.as_deref())?;
            println!("{}", path.display());
        }
        Commands::Load { name, version, fold, json } => {
            let client = ReleaseClient::new(&config)?;
            do_load(&client, &name, version.as_deref(), fold, json)?;
        }
        Commands::Convert { input, names } => {
            do_convert(&input, names.as_deref())?;
        }
    }
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("reldata: {:#}", e);
        std::process::exit(1);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn input(json: &str) -> VectorInput {
        serde_json::from_str(json).expect("valid input json")
    }

    #[test]
    fn test_convert_integer_target_is_classification() {
        let parsed = input(r#"{"x": [[0,1,1],[1,0,2],[2,2,0],[1,1,1]], "y": [0,0,1,1]}"#);
        let out = convert_input(&parsed, None).unwrap();

        assert_eq!(out.dataset.pos, vec!["v4(id3).", "v4(id4)."]);
        assert_eq!(out.dataset.neg, vec!["v4(id1).", "v4(id2)."]);
        assert_eq!(out.dataset.facts[0], "v1(id1,v1_0).");
        assert_eq!(out.modes.last().unwrap(), "v4(+id).");
    }

    #[test]
    fn test_convert_float_target_is_regression() {
        let parsed = input(r#"{"x": [[0,1,1],[1,0,2],[2,2,0],[1,1,1]], "y": [0.1,0.2,0.3,0.4]}"#);
        let out = convert_input(&parsed, None).unwrap();

        assert_eq!(out.dataset.pos[0], "regressionExample(v4(id1),0.1).");
        assert_eq!(out.dataset.pos.len(), 4);
        assert!(out.dataset.neg.is_empty());
    }

    #[test]
    fn test_convert_float_features() {
        let parsed = input(r#"{"x": [[0.5],[1.5]], "y": [1, 0]}"#);
        let out = convert_input(&parsed, None).unwrap();
        assert_eq!(out.dataset.facts, vec!["v1(id1,v1_0.5).", "v1(id2,v1_1.5)."]);
    }

    #[test]
    fn test_convert_names_from_flag_override_file() {
        let parsed = input(r#"{"x": [[3],[4]], "y": [0, 2], "names": ["a", "b"]}"#);
        let flag = vec!["age".to_string(), "stage".to_string()];
        let out = convert_input(&parsed, Some(&flag)).unwrap();

        assert_eq!(out.dataset.pos, vec!["stage(id1,stage_0).", "stage(id2,stage_2)."]);
        assert_eq!(out.modes, vec!["age(+id,#varage).", "stage(+id,#classlabel)."]);

        let out = convert_input(&parsed, None).unwrap();
        assert_eq!(out.modes[0], "a(+id,#vara).");
    }

    #[test]
    fn test_convert_ragged_rows_rejected() {
        let parsed = input(r#"{"x": [[1,2],[3]], "y": [0, 1]}"#);
        let err = convert_input(&parsed, None).unwrap_err();
        assert!(err.to_string().contains("row 2"), "unexpected error: {}", err);
    }

    #[test]
    fn test_convert_shape_mismatch_surfaces() {
        let parsed = input(r#"{"x": [[1],[2],[3]], "y": [0, 1]}"#);
        let err = convert_input(&parsed, None).unwrap_err();
        assert!(
            err.downcast_ref::<reldata_core::DatasetError>().is_some(),
            "expected a DatasetError, got {}",
            err
        );
    }

    #[test]
    fn test_cli_parses_load_defaults() {
        let cli = Cli::try_parse_from(["reldata", "load", "webkb"]).unwrap();
        match cli.command {
            Commands::Load { name, version, fold, json } => {
                assert_eq!(name, "webkb");
                assert!(version.is_none());
                assert_eq!(fold, 1);
                assert!(!json);
            }
            other => panic!("Expected Load, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_parses_convert_names() {
        let cli = Cli::try_parse_from(["reldata", "convert", "data.json", "--names", "a,b,c"]).unwrap();
        match cli.command {
            Commands::Convert { input, names } => {
                assert_eq!(input, PathBuf::from("data.json"));
                assert_eq!(names.unwrap(), vec!["a", "b", "c"]);
            }
            other => panic!("Expected Convert, got {:?}", other),
        }
    }
}
