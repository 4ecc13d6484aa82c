//! Minimal collaborator CLI: reads a JSON array of input rows plus a JSON
//! config object from stdin, runs [`sdc_suppress::suppress`], and writes a
//! JSON envelope to stdout. Deliberately thin — anything fancier belongs
//! in a caller's own tooling, not in this crate.

use std::io::{self, Read};

use sdc_suppress::{suppress, Config, ConfigBuilder, InputRow};
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
struct CliInput {
    rows: Vec<InputRow>,
    threshold: u64,
    dimensions: Vec<String>,
    incidence_column: String,
    #[serde(default)]
    non_summable_dimensions: Vec<String>,
    #[serde(default)]
    first_order_only: bool,
}

fn build_config(input: &CliInput) -> Result<Config, sdc_suppress::SuppressionError> {
    ConfigBuilder::new()
        .threshold(input.threshold)
        .dimensions(input.dimensions.clone())
        .non_summable_dimensions(input.non_summable_dimensions.clone())
        .incidence_column(input.incidence_column.clone())
        .first_order_only(input.first_order_only)
        .build()
}

fn main() {
    // Engine events (`info!`/`debug!`/`warn!` in `engine.rs`/`scan.rs`) go
    // nowhere without a subscriber installed somewhere — this is the only
    // place in the crate that does. Logs go to stderr so they never land in
    // the JSON envelope this binary writes to stdout.
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut raw = String::new();
    if let Err(err) = io::stdin().read_to_string(&mut raw) {
        print_error(format!("failed to read stdin: {err}"));
        std::process::exit(1);
    }

    let input: CliInput = match serde_json::from_str(&raw) {
        Ok(input) => input,
        Err(err) => {
            print_error(format!("malformed input envelope: {err}"));
            std::process::exit(1);
        }
    };

    let config = match build_config(&input) {
        Ok(config) => config,
        Err(err) => {
            print_error(err.to_string());
            std::process::exit(1);
        }
    };

    match suppress(input.rows, &config) {
        Ok(output) => {
            println!(
                "{}",
                json!({
                    "success": true,
                    "data": output.rows,
                    "stats": output.stats,
                    "redaction_sentinel": output.redaction_sentinel,
                })
            );
        }
        Err(err) => print_error(err.to_string()),
    }
}

fn print_error(message: String) {
    println!("{}", json!({ "success": false, "error": message }));
}
