//! Peer address parsing. Turns catalog URIs like `tls://host:port` or
//! `tcp://[2001:db8::1]:9001?key=...` into typed endpoint descriptors.

use serde::{Deserialize, Serialize};

/// Transport schemes a catalog entry can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Tls,
    Ws,
    Wss,
    Quic,
}

impl Protocol {
    fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme {
            "tcp" => Some(Protocol::Tcp),
            "tls" => Some(Protocol::Tls),
            "ws" => Some(Protocol::Ws),
            "wss" => Some(Protocol::Wss),
            "quic" => Some(Protocol::Quic),
            _ => None,
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Protocol::Tcp => write!(f, "tcp"),
            Protocol::Tls => write!(f, "tls"),
            Protocol::Ws => write!(f, "ws"),
            Protocol::Wss => write!(f, "wss"),
            Protocol::Quic => write!(f, "quic"),
        }
    }
}

/// Parsed peer address
#[derive(Debug, Clone, PartialEq)]
pub struct PeerEndpoint {
    /// Original catalog URI, kept for display and config output
    pub raw: String,
    pub protocol: Protocol,
    /// Hostname or IP literal; IPv6 literals are stored without brackets
    pub host: String,
    pub port: u16,
}

/// Why an address string could not be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    MissingScheme,
    UnknownScheme,
    MalformedHost,
    InvalidPort,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::MissingScheme => write!(f, "missing scheme separator"),
            ParseError::UnknownScheme => write!(f, "unknown scheme"),
            ParseError::MalformedHost => write!(f, "malformed host"),
            ParseError::InvalidPort => write!(f, "invalid port"),
        }
    }
}

/// Parse a peer URI of the form `scheme://host:port[?query]`.
///
/// Bracketed IPv6 hosts are tried first, then plain hosts. The plain host
/// part may not contain `:`, so unbracketed IPv6 literals are rejected.
pub fn parse(raw: &str) -> Result<PeerEndpoint, ParseError> {
    let (scheme, rest) = raw.split_once("://").ok_or(ParseError::MissingScheme)?;
    let protocol =
        Protocol::from_scheme(&scheme.to_lowercase()).ok_or(ParseError::UnknownScheme)?;

    // Optional ?query suffix is ignored for connectivity purposes
    let rest = rest.split('?').next().unwrap_or(rest);

    let (host, port_str) = if let Some(bracketed) = rest.strip_prefix('[') {
        let (host, after) = bracketed.split_once(']').ok_or(ParseError::MalformedHost)?;
        let port = after.strip_prefix(':').ok_or(ParseError::MalformedHost)?;
        (host, port)
    } else {
        let (host, port) = rest.split_once(':').ok_or(ParseError::MalformedHost)?;
        (host, port)
    };

    if host.is_empty() {
        return Err(ParseError::MalformedHost);
    }

    let port: u16 = port_str.parse().map_err(|_| ParseError::InvalidPort)?;
    if port == 0 {
        return Err(ParseError::InvalidPort);
    }

    Ok(PeerEndpoint {
        raw: raw.to_string(),
        protocol,
        host: host.to_string(),
        port,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_host() {
        let ep = parse("tcp://ygg.example.org:9001").unwrap();
        assert_eq!(ep.protocol, Protocol::Tcp);
        assert_eq!(ep.host, "ygg.example.org");
        assert_eq!(ep.port, 9001);
        assert_eq!(ep.raw, "tcp://ygg.example.org:9001");
    }

    #[test]
    fn test_parse_ipv4_literal() {
        let ep = parse("tls://23.184.48.86:993").unwrap();
        assert_eq!(ep.protocol, Protocol::Tls);
        assert_eq!(ep.host, "23.184.48.86");
        assert_eq!(ep.port, 993);
    }

    #[test]
    fn test_parse_bracketed_ipv6() {
        // Brackets are stripped from the stored host
        let ep = parse("tls://[2001:db8::1]:443").unwrap();
        assert_eq!(ep.protocol, Protocol::Tls);
        assert_eq!(ep.host, "2001:db8::1");
        assert_eq!(ep.port, 443);
    }

    #[test]
    fn test_parse_with_query() {
        let ep = parse("tls://ygg.example.org:443?key=0000000000000000").unwrap();
        assert_eq!(ep.host, "ygg.example.org");
        assert_eq!(ep.port, 443);

        let ep = parse("quic://[2001:db8::2]:9002?password=x").unwrap();
        assert_eq!(ep.protocol, Protocol::Quic);
        assert_eq!(ep.host, "2001:db8::2");
    }

    #[test]
    fn test_parse_uppercase_scheme() {
        let ep = parse("TLS://ygg.example.org:443").unwrap();
        assert_eq!(ep.protocol, Protocol::Tls);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(parse("no-scheme-here"), Err(ParseError::MissingScheme));
        assert_eq!(parse("gopher://host:70"), Err(ParseError::UnknownScheme));
        assert_eq!(parse("tcp://hostonly"), Err(ParseError::MalformedHost));
        assert_eq!(parse("tcp://:9001"), Err(ParseError::MalformedHost));
        assert_eq!(parse("tcp://host:"), Err(ParseError::InvalidPort));
        assert_eq!(parse("tcp://host:notaport"), Err(ParseError::InvalidPort));
        assert_eq!(parse("tcp://host:0"), Err(ParseError::InvalidPort));
        assert_eq!(parse("tcp://host:70000"), Err(ParseError::InvalidPort));
    }

    #[test]
    fn test_parse_rejects_unbracketed_ipv6() {
        // The colon lands inside the port segment and fails to parse
        assert!(parse("tcp://2001:db8::1:9001").is_err());
    }

    #[test]
    fn test_parse_rejects_unterminated_bracket() {
        assert_eq!(parse("tls://[2001:db8::1:443"), Err(ParseError::MalformedHost));
        assert_eq!(parse("tls://[2001:db8::1]443"), Err(ParseError::MalformedHost));
    }

    #[test]
    fn test_protocol_display() {
        assert_eq!(format!("{}", Protocol::Tcp), "tcp");
        assert_eq!(format!("{}", Protocol::Wss), "wss");
        assert_eq!(format!("{}", Protocol::Quic), "quic");
    }
}
