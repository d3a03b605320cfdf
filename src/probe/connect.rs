//! Transport connectivity prober. Measures TCP (and TLS where the scheme
//! asks for it) connect latency under a hard per-attempt timeout.

use std::net::{IpAddr, Ipv6Addr, SocketAddr};
use std::time::Instant;

use tokio::net::{TcpStream, lookup_host};

use crate::endpoint::{PeerEndpoint, Protocol};

/// Why a single probe attempt failed. Callers collapse all of these to
/// `success=false`; nothing here aborts a run.
#[derive(Debug)]
pub enum ProbeError {
    /// No transport-level test exists for this scheme (quic)
    Unsupported,
    Resolve,
    Connect(std::io::Error),
    Tls(native_tls::Error),
    TimedOut,
}

impl std::fmt::Display for ProbeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeError::Unsupported => write!(f, "unsupported protocol"),
            ProbeError::Resolve => write!(f, "address resolution failed"),
            ProbeError::Connect(e) => write!(f, "connect failed: {}", e),
            ProbeError::Tls(e) => write!(f, "tls handshake failed: {}", e),
            ProbeError::TimedOut => write!(f, "timed out"),
        }
    }
}

/// Single-attempt connect prober
pub struct ConnectProber {
    timeout_ms: u64,
}

impl ConnectProber {
    pub fn new() -> Self {
        Self { timeout_ms: 1000 }
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Probe one endpoint and return the connect latency in milliseconds.
    ///
    /// Resolution, connect and (for tls/wss) the handshake all run under the
    /// configured timeout, so the attempt can never outlive it.
    pub async fn probe(&self, endpoint: &PeerEndpoint) -> Result<f64, ProbeError> {
        let timeout = std::time::Duration::from_millis(self.timeout_ms);
        match tokio::time::timeout(timeout, self.attempt(endpoint)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ProbeError::TimedOut),
        }
    }

    async fn attempt(&self, endpoint: &PeerEndpoint) -> Result<f64, ProbeError> {
        let needs_tls = match endpoint.protocol {
            Protocol::Tls | Protocol::Wss => true,
            Protocol::Tcp | Protocol::Ws => false,
            Protocol::Quic => return Err(ProbeError::Unsupported),
        };

        let addr = resolve_preferring_ipv6(&endpoint.host, endpoint.port).await?;

        let start = Instant::now();
        let stream = TcpStream::connect(addr).await.map_err(ProbeError::Connect)?;
        if needs_tls {
            // Peer identity is not verified; only reachability and handshake
            // completion are measured
            let connector = native_tls::TlsConnector::builder()
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true)
                .build()
                .map_err(ProbeError::Tls)?;
            let connector = tokio_native_tls::TlsConnector::from(connector);
            let tls_stream = connector
                .connect(&endpoint.host, stream)
                .await
                .map_err(ProbeError::Tls)?;
            let elapsed = start.elapsed().as_secs_f64() * 1000.0;
            drop(tls_stream);
            return Ok(elapsed);
        }

        let elapsed = start.elapsed().as_secs_f64() * 1000.0;
        drop(stream);
        Ok(elapsed)
    }
}

impl Default for ConnectProber {
    fn default() -> Self {
        Self::new()
    }
}

/// Pick a socket address for `host`, preferring the IPv6 family: an IPv6
/// literal wins outright, then any IPv6 record from resolution, then the
/// first (IPv4) record.
async fn resolve_preferring_ipv6(host: &str, port: u16) -> Result<SocketAddr, ProbeError> {
    if let Ok(v6) = host.parse::<Ipv6Addr>() {
        return Ok(SocketAddr::new(IpAddr::V6(v6), port));
    }

    let addrs: Vec<SocketAddr> = lookup_host((host, port))
        .await
        .map_err(|_| ProbeError::Resolve)?
        .collect();

    addrs
        .iter()
        .find(|a| a.is_ipv6())
        .or_else(|| addrs.first())
        .copied()
        .ok_or(ProbeError::Resolve)
}
