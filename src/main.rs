//! Finds the best nearby Yggdrasil peers: samples the public peer catalog
//! per region, picks the lowest-latency region, exhaustively probes it, and
//! prints a protocol-diversified shortlist ready for yggdrasil.conf.

mod catalog;
mod endpoint;
mod output;
mod probe;

use clap::Parser;

use probe::ProbeConfig;

/// Find the best nearby Yggdrasil peers by live connect latency
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Reduce output verbosity
    #[arg(long)]
    quiet: bool,

    /// Print the result as JSON instead of the text report
    #[arg(long)]
    json: bool,

    /// Peer catalog URL (HTML table or JSON mapping)
    #[arg(long, default_value = catalog::DEFAULT_SOURCE)]
    source: String,

    /// Per-connection timeout in milliseconds
    #[arg(long, default_value_t = 1000)]
    timeout_ms: u64,

    /// Peers probed per region while ranking regions
    #[arg(long, default_value_t = 5)]
    sample_size: usize,

    /// Size of the final shortlist
    #[arg(long, default_value_t = 3)]
    top: usize,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let verbose = !cli.quiet && !cli.json;

    let config = ProbeConfig {
        sample_size: cli.sample_size,
        attempt_timeout_ms: cli.timeout_ms,
        shortlist_size: cli.top,
        verbose,
        ..ProbeConfig::default()
    };

    let catalog = catalog::fetch_catalog(&cli.source, verbose).await;

    let selection = match probe::find_peers(&catalog, &config).await {
        Ok(selection) => selection,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    if cli.json {
        println!("{}", output::render_json(&selection));
    } else {
        output::print_report(&selection);
    }
}
