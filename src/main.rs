//! CLI: печатает сводку пополнений и стоимости портфеля за период.

use std::env;

use tin_analysis::{Analyzer, Config, RestClient};
use tracing_subscriber::EnvFilter;

const DEFAULT_START: &str = "2024-05-01";
const DEFAULT_END: &str = "2024-05-31";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let (start, end) = match args.as_slice() {
        [] => (DEFAULT_START, DEFAULT_END),
        [start, end] => (start.as_str(), end.as_str()),
        _ => {
            println!("Usage: tin-analysis [START END]   (dates as YYYY-MM-DD)");
            return Ok(());
        }
    };

    let config = Config::from_env()?;
    let client = RestClient::new(&config)?;
    let analyzer = Analyzer::new(client, config.account_names.as_slice())?;
    let report = analyzer.analyze(start, end)?;

    print!("{report}");
    Ok(())
}
