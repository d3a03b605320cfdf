//! Region-level probing. A cheap sample pass ranks regions by latency, then
//! the winning region gets an exhaustive pass over every listed peer.

use crate::catalog::{CatalogPeer, RegionCatalog};
use crate::endpoint;

use super::connect::{ConnectProber, ProbeError};
use super::runner;
use super::{ProbeConfig, ProbeResult, RegionScore};

/// Probe one catalog entry. Returns `None` for addresses that cannot be
/// probed at all (unparseable, quic); failed attempts come back with
/// `success=false` so samplers can count them.
async fn probe_catalog_peer(
    peer: CatalogPeer,
    region: String,
    timeout_ms: u64,
) -> Option<ProbeResult> {
    let endpoint = endpoint::parse(&peer.address).ok()?;
    let prober = ConnectProber::new().with_timeout(timeout_ms);

    match prober.probe(&endpoint).await {
        Ok(latency) => Some(ProbeResult {
            endpoint,
            region,
            reliability: peer.reliability,
            success: true,
            latency_ms: Some(latency),
        }),
        Err(ProbeError::Unsupported) => None,
        Err(_) => Some(ProbeResult {
            endpoint,
            region,
            reliability: peer.reliability,
            success: false,
            latency_ms: None,
        }),
    }
}

fn score_from_results(region: &str, results: &[ProbeResult], total_candidates: usize) -> RegionScore {
    let latencies: Vec<f64> = results
        .iter()
        .filter(|r| r.success)
        .filter_map(|r| r.latency_ms)
        .collect();

    if latencies.is_empty() {
        // Dead-region sentinel: ranks after every region with a success
        return RegionScore {
            region: region.to_string(),
            avg_latency_ms: f64::INFINITY,
            min_latency_ms: f64::INFINITY,
            success_count: 0,
            total_candidates,
        };
    }

    let sum: f64 = latencies.iter().sum();
    let min = latencies.iter().copied().fold(f64::INFINITY, f64::min);
    RegionScore {
        region: region.to_string(),
        avg_latency_ms: sum / latencies.len() as f64,
        min_latency_ms: min,
        success_count: latencies.len(),
        total_candidates,
    }
}

/// Probe the first `sample_size` peers of a region (catalog order, no
/// shuffle) and aggregate the outcome into a score.
pub async fn sample_region(
    region: &str,
    peers: &[CatalogPeer],
    config: &ProbeConfig,
) -> RegionScore {
    let sample_len = peers.len().min(config.sample_size);
    let tasks: Vec<_> = peers[..sample_len]
        .iter()
        .map(|peer| probe_catalog_peer(peer.clone(), region.to_string(), config.attempt_timeout_ms))
        .collect();

    let results: Vec<ProbeResult> =
        runner::run_all(tasks, config.sample_workers, config.sample_deadline())
            .await
            .into_iter()
            .flatten()
            .collect();

    score_from_results(region, &results, peers.len())
}

/// Sample every eligible region concurrently and pick the one with the best
/// `(min latency, avg latency)` tuple. `None` when no region had a success.
pub async fn select_best_region(catalog: &RegionCatalog, config: &ProbeConfig) -> Option<String> {
    if config.verbose {
        println!(
            "\nTesting all regions simultaneously ({} peers per region)...",
            config.sample_size
        );
        println!("{}", "=".repeat(60));
    }

    let tasks: Vec<_> = catalog
        .iter()
        .filter(|(_, peers)| peers.len() >= config.min_region_candidates)
        .map(|(region, peers)| {
            let region = region.clone();
            let peers = peers.clone();
            let config = config.clone();
            async move {
                let score = sample_region(&region, &peers, &config).await;
                if config.verbose {
                    if score.success_count > 0 {
                        println!(
                            "  {}: {:.1}ms avg, {:.1}ms min ({}/{} successful)",
                            score.region,
                            score.avg_latency_ms,
                            score.min_latency_ms,
                            score.success_count,
                            peers.len().min(config.sample_size)
                        );
                    } else {
                        println!("  {}: No successful connections", score.region);
                    }
                }
                score
            }
        })
        .collect();

    let sampled = runner::run_all(tasks, config.select_workers, config.select_deadline()).await;
    let scores = rank_regions(sampled);
    if scores.is_empty() {
        return None;
    }

    if config.verbose {
        println!("\nBest regions by latency:");
        for (i, score) in scores.iter().take(5).enumerate() {
            println!(
                "  {}. {}: {:.1}ms min, {:.1}ms avg ({} peers available)",
                i + 1,
                score.region,
                score.min_latency_ms,
                score.avg_latency_ms,
                score.total_candidates
            );
        }
        println!("\nSelected region: {}", scores[0].region);
    }

    Some(scores[0].region.clone())
}

/// Drop dead regions and sort the rest ascending by the
/// `(min latency, avg latency)` tuple.
fn rank_regions(scores: Vec<RegionScore>) -> Vec<RegionScore> {
    let mut scores: Vec<RegionScore> = scores
        .into_iter()
        .filter(|score| score.success_count > 0)
        .collect();

    scores.sort_by(|a, b| {
        a.min_latency_ms
            .total_cmp(&b.min_latency_ms)
            .then(a.avg_latency_ms.total_cmp(&b.avg_latency_ms))
    });
    scores
}

/// Probe every peer in a region, returning only the reachable ones.
pub async fn probe_region(
    region: &str,
    peers: &[CatalogPeer],
    config: &ProbeConfig,
) -> Vec<ProbeResult> {
    if config.verbose {
        println!("\nTesting all peers in {} ({} peers)...", region, peers.len());
        println!("{}", "=".repeat(60));
    }

    let tasks: Vec<_> = peers
        .iter()
        .map(|peer| {
            let peer = peer.clone();
            let region = region.to_string();
            let config = config.clone();
            async move {
                let address = peer.address.clone();
                let result =
                    probe_catalog_peer(peer, region, config.attempt_timeout_ms).await;
                if config.verbose {
                    match &result {
                        Some(r) if r.success => {
                            println!("  {:<50} {:6.1}ms", r.endpoint.raw, r.latency_ms.unwrap_or(0.0))
                        }
                        _ => println!("  {:<50} FAILED", address),
                    }
                }
                result
            }
        })
        .collect();

    runner::run_all(tasks, config.exhaustive_workers, config.exhaustive_deadline())
        .await
        .into_iter()
        .flatten()
        .filter(|result| result.success)
        .collect()
}
