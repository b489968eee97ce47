/// Decision tree CLI
///
/// Validates and executes JSON decision trees, and prints the built-in examples.

use decision_tree::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run_cli().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
