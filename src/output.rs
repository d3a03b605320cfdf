//! Report rendering: ranked shortlist table, Yggdrasil config snippet, and
//! the machine-readable JSON variant.

use serde::Serialize;

use crate::endpoint::Protocol;
use crate::probe::{PeerSelection, ProbeResult};

#[derive(Serialize)]
struct ReportEntry<'a> {
    address: &'a str,
    latency_ms: f64,
    protocol: Protocol,
    reliability: &'a str,
}

#[derive(Serialize)]
struct Report<'a> {
    region: &'a str,
    peers: Vec<ReportEntry<'a>>,
}

/// Print the human-readable result report
pub fn print_report(selection: &PeerSelection) {
    let banner = "=".repeat(60);

    println!("\n{}", banner);
    println!(
        "TOP {} RECOMMENDED PEERS IN {}",
        selection.shortlist.len(),
        selection.region.to_uppercase()
    );
    println!("{}", banner);
    for (i, result) in selection.shortlist.iter().enumerate() {
        println!(
            "{}. {:<50} {:6.1}ms",
            i + 1,
            result.endpoint.raw,
            result.latency_ms.unwrap_or(0.0)
        );
    }

    println!("\n{}", banner);
    println!("YGGDRASIL CONFIG (add to /etc/yggdrasil.conf):");
    println!("{}", banner);
    println!("{}", config_line(&selection.shortlist));

    println!(
        "\nFound {} optimal peers in {}",
        selection.shortlist.len(),
        selection.region
    );
}

/// Render the `Peers: [...]` line for yggdrasil.conf
pub fn config_line(shortlist: &[ProbeResult]) -> String {
    let quoted: Vec<String> = shortlist
        .iter()
        .map(|result| format!("\"{}\"", result.endpoint.raw))
        .collect();
    format!("  Peers: [{}]", quoted.join(", "))
}

/// Render the selection as pretty-printed JSON
pub fn render_json(selection: &PeerSelection) -> String {
    let report = Report {
        region: &selection.region,
        peers: selection
            .shortlist
            .iter()
            .map(|result| ReportEntry {
                address: &result.endpoint.raw,
                latency_ms: result.latency_ms.unwrap_or(0.0),
                protocol: result.endpoint.protocol,
                reliability: &result.reliability,
            })
            .collect(),
    };
    serde_json::to_string_pretty(&report).unwrap_or_default()
}
