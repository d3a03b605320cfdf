//! Built-in peer list used when the live catalog cannot be fetched.

use super::{CatalogPeer, RegionCatalog};

/// Known-stable public peers, by region
const FALLBACK_PEERS: &[(&str, &[(&str, &str)])] = &[
    (
        "united-states",
        &[
            ("tls://ygg.jjolly.dev:3443", "100%"),
            ("tls://23.184.48.86:993", "100%"),
            ("tls://44.234.134.124:443", "100%"),
            ("tcp://mo.us.ygg.triplebit.org:9000", "100%"),
            ("tls://mo.us.ygg.triplebit.org:993", "100%"),
        ],
    ),
    (
        "germany",
        &[
            ("tls://ygg.mkg20001.io:443", "100%"),
            ("tcp://ygg.mkg20001.io:80", "100%"),
            ("tls://yggdrasil.su:62586", "100%"),
            ("tcp://yggdrasil.su:62486", "100%"),
        ],
    ),
    (
        "netherlands",
        &[
            ("tls://vpn.itrus.su:7992", "100%"),
            ("tcp://vpn.itrus.su:7991", "100%"),
            ("tls://23.137.249.65:444", "100%"),
        ],
    ),
    (
        "france",
        &[
            ("tls://s2.i2pd.xyz:39575", "100%"),
            ("tcp://s2.i2pd.xyz:39565", "100%"),
            ("tls://51.15.204.214:54321", "100%"),
        ],
    ),
];

/// Build the fallback catalog. Never empty, so region selection always has
/// something to work with.
pub fn fallback_catalog() -> RegionCatalog {
    FALLBACK_PEERS
        .iter()
        .map(|(region, peers)| {
            (
                region.to_string(),
                peers
                    .iter()
                    .map(|(address, reliability)| CatalogPeer {
                        address: address.to_string(),
                        reliability: reliability.to_string(),
                    })
                    .collect(),
            )
        })
        .collect()
}
