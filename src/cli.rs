use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::catalog;
use crate::config::Config;
use crate::notify::LogNotifier;
use crate::runtime::Runtime;
use crate::service::DecisionTreeService;

#[derive(Parser)]
#[command(name = "decision-tree")]
#[command(about = "Validate and execute JSON decision trees", long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default search)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter directive (overrides config file and env vars)
    #[arg(long, global = true)]
    pub log_filter: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Execute a decision tree
    Execute {
        /// Tree JSON file, or `-` for stdin
        file: PathBuf,
    },

    /// Validate a decision tree without executing it
    Validate {
        /// Tree JSON file, or `-` for stdin
        file: PathBuf,
    },

    /// Print the built-in example trees
    Examples {
        /// Print only the tree of the named example
        name: Option<String>,
    },
}

/// Run the CLI by parsing process arguments
pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    run_cli_with_args(cli).await
}

async fn run_cli_with_args(cli: Cli) -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::builder()
        .config_path(cli.config.clone())
        .log_filter(cli.log_filter.clone())
        .build()?;

    crate::logging::init(&config.logging)?;

    let runtime = Runtime::new(Arc::new(LogNotifier::new(config.execution.log_context)));
    let service = DecisionTreeService::new(runtime);

    match cli.command {
        Commands::Execute { file } => {
            let tree = read_tree(&file)?;
            let result = service.execute_decision_tree(&tree).await;
            print_json(&result, config.output.pretty)?;

            if !result.success {
                std::process::exit(1);
            }
        }

        Commands::Validate { file } => {
            let tree = read_tree(&file)?;
            let result = service.validate_decision_tree(&tree);
            print_json(&result, config.output.pretty)?;

            if !result.valid {
                std::process::exit(1);
            }
        }

        Commands::Examples { name } => match name {
            Some(name) => match catalog::find(&name) {
                Some(example) => print_json(&example.tree, config.output.pretty)?,
                None => {
                    let known: Vec<_> = catalog::examples().iter().map(|e| e.name).collect();
                    eprintln!("Unknown example: {}. Available: {}", name, known.join(", "));
                    std::process::exit(1);
                }
            },
            None => print_json(&catalog::examples(), config.output.pretty)?,
        },
    }

    Ok(())
}

/// Read a tree document from a file, or stdin when the path is `-`
fn read_tree(path: &Path) -> Result<JsonValue> {
    let source = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read decision tree from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };

    serde_json::from_str(&source).context("Decision tree is not valid JSON")
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}
