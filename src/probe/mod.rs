//! Latency probing engine. Samples a few peers per region to rank regions,
//! exhaustively probes the winner, and ranks the survivors into a
//! protocol-diversified shortlist.

pub mod connect;
pub mod rank;
pub mod region;
pub mod runner;

use std::time::Duration;

use crate::catalog::RegionCatalog;
use crate::endpoint::PeerEndpoint;

/// Outcome of one probe attempt. Immutable once created; aggregation only.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub endpoint: PeerEndpoint,
    pub region: String,
    /// Reliability tag as reported by the catalog, e.g. "100%"
    pub reliability: String,
    pub success: bool,
    pub latency_ms: Option<f64>,
}

/// Aggregate statistics for one sampled region
#[derive(Debug, Clone)]
pub struct RegionScore {
    pub region: String,
    /// Mean latency over successful probes; +inf when none succeeded
    pub avg_latency_ms: f64,
    /// Best successful latency; +inf when none succeeded
    pub min_latency_ms: f64,
    pub success_count: usize,
    /// Total peers the catalog lists for this region, not just the sample
    pub total_candidates: usize,
}

/// Tuning knobs for the whole probing run
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Peers probed per region during the sample phase
    pub sample_size: usize,
    /// Per-connection timeout, both phases
    pub attempt_timeout_ms: u64,
    pub sample_workers: usize,
    pub sample_deadline_ms: u64,
    pub select_workers: usize,
    pub select_deadline_ms: u64,
    pub exhaustive_workers: usize,
    pub exhaustive_deadline_ms: u64,
    /// Regions with fewer candidates than this are not sampled at all
    pub min_region_candidates: usize,
    pub shortlist_size: usize,
    pub verbose: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            sample_size: 5,
            attempt_timeout_ms: 1000,
            sample_workers: 10,
            sample_deadline_ms: 3000,
            select_workers: 20,
            select_deadline_ms: 10_000,
            exhaustive_workers: 15,
            exhaustive_deadline_ms: 5000,
            min_region_candidates: 2,
            shortlist_size: 3,
            verbose: true,
        }
    }
}

impl ProbeConfig {
    pub fn sample_deadline(&self) -> Duration {
        Duration::from_millis(self.sample_deadline_ms)
    }

    pub fn select_deadline(&self) -> Duration {
        Duration::from_millis(self.select_deadline_ms)
    }

    pub fn exhaustive_deadline(&self) -> Duration {
        Duration::from_millis(self.exhaustive_deadline_ms)
    }
}

/// Run-level failures. Everything below these (DNS errors, refused
/// connections, timeouts, unparseable addresses) is absorbed per peer and
/// never reaches the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinderError {
    /// No region had a single successful sample probe
    NoRegionFound,
    /// The winning region produced zero successes on the exhaustive pass
    NoPeersInRegion(String),
}

impl std::fmt::Display for FinderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FinderError::NoRegionFound => write!(f, "No suitable regions found"),
            FinderError::NoPeersInRegion(region) => {
                write!(f, "No working peers found in {}", region)
            }
        }
    }
}

impl std::error::Error for FinderError {}

/// Winning region plus its ranked shortlist
#[derive(Debug, Clone)]
pub struct PeerSelection {
    pub region: String,
    pub shortlist: Vec<ProbeResult>,
}

/// Full two-phase run: rank regions from samples, then exhaustively probe
/// the winner. The exhaustive phase never starts before a region is chosen.
pub async fn find_peers(
    catalog: &RegionCatalog,
    config: &ProbeConfig,
) -> Result<PeerSelection, FinderError> {
    let best = region::select_best_region(catalog, config)
        .await
        .ok_or(FinderError::NoRegionFound)?;

    let peers = catalog.get(&best).map(Vec::as_slice).unwrap_or(&[]);
    let results = region::probe_region(&best, peers, config).await;
    if results.is_empty() {
        return Err(FinderError::NoPeersInRegion(best));
    }

    Ok(PeerSelection {
        region: best,
        shortlist: rank::rank(results, config.shortlist_size),
    })
}
