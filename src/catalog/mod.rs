//! Peer catalog acquisition. Fetches the public peer listing (HTML table or
//! JSON mapping), keeps only healthy entries, and falls back to a built-in
//! list when the source is unreachable.

pub mod fallback;
pub mod html;

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Public peer listing scraped by default
pub const DEFAULT_SOURCE: &str = "https://publicpeers.neilalexander.dev/";

const FETCH_TIMEOUT: Duration = Duration::from_secs(15);
const USER_AGENT: &str = "Mozilla/5.0 (compatible; YggPeerFinder/0.3)";

/// One catalog entry: a peer URI plus the reliability tag the listing
/// reports for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogPeer {
    pub address: String,
    #[serde(default = "unknown_reliability")]
    pub reliability: String,
}

fn unknown_reliability() -> String {
    "N/A".to_string()
}

/// Region name to peers, in catalog presentation order per region
pub type RegionCatalog = HashMap<String, Vec<CatalogPeer>>;

#[derive(Debug)]
pub enum CatalogError {
    Http(reqwest::Error),
    Json(serde_json::Error),
    /// The source answered but no usable peers came out of it
    Empty,
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Http(e) => write!(f, "{}", e),
            CatalogError::Json(e) => write!(f, "invalid catalog JSON: {}", e),
            CatalogError::Empty => write!(f, "catalog contained no usable peers"),
        }
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        CatalogError::Http(e)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Json(e)
    }
}

/// Fetch the live catalog, falling back to the built-in list on any failure
/// so callers never see an empty catalog.
pub async fn fetch_catalog(source: &str, verbose: bool) -> RegionCatalog {
    if verbose {
        println!("Fetching peers from {}...", source);
    }

    match fetch_remote(source).await {
        Ok(catalog) => {
            if verbose {
                let total: usize = catalog.values().map(Vec::len).sum();
                println!(
                    "Found {} online peers across {} countries/regions",
                    total,
                    catalog.len()
                );
            }
            catalog
        }
        Err(e) => {
            eprintln!("Error fetching peers: {}", e);
            eprintln!("Using fallback peer list...");
            fallback::fallback_catalog()
        }
    }
}

async fn fetch_remote(source: &str) -> Result<RegionCatalog, CatalogError> {
    // The listing is public data; an invalid certificate should not keep us
    // from reading it
    let client = reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .danger_accept_invalid_certs(true)
        .user_agent(USER_AGENT)
        .build()?;

    let body = match fetch_body(&client, source).await {
        Ok(body) => body,
        Err(e) => match source.strip_prefix("https://") {
            // One retry over plain HTTP when the TLS fetch breaks
            Some(rest) => fetch_body(&client, &format!("http://{}", rest)).await?,
            None => return Err(e),
        },
    };

    let mut catalog = parse_body(&body)?;
    catalog.retain(|_, peers| !peers.is_empty());
    if catalog.is_empty() {
        return Err(CatalogError::Empty);
    }
    Ok(catalog)
}

async fn fetch_body(client: &reqwest::Client, url: &str) -> Result<String, CatalogError> {
    Ok(client.get(url).send().await?.text().await?)
}

/// A body starting with `{` is the JSON mapping `{region: [peers]}`;
/// everything else goes through the HTML table extractor.
fn parse_body(body: &str) -> Result<RegionCatalog, CatalogError> {
    let trimmed = body.trim_start();
    if trimmed.starts_with('{') {
        Ok(serde_json::from_str(trimmed)?)
    } else {
        Ok(html::parse_peer_table(body))
    }
}
