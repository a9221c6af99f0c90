//! Suspect classification of pixel fetches.
//!
//! Webmail providers fetch remote images through their own infrastructure
//! for privacy and caching, producing an "open" with no human behind it at
//! that moment. Those fetches are real delivery signals but unreliable
//! engagement signals, so they are flagged rather than discarded.

use std::net::IpAddr;

/// A CIDR prefix used to recognize proxy-operated address ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpPrefix {
    network: IpAddr,
    bits: u8,
}

impl IpPrefix {
    /// Build a prefix from a network address and prefix length.
    ///
    /// The length is clamped to the address family's width.
    pub fn new(network: IpAddr, bits: u8) -> Self {
        let width = match network {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };
        Self {
            network,
            bits: bits.min(width),
        }
    }

    /// Parse `"17.0.0.0/8"`-style notation; `None` when malformed.
    pub fn parse(value: &str) -> Option<Self> {
        let (network, bits) = value.split_once('/')?;
        let network: IpAddr = network.trim().parse().ok()?;
        let bits: u8 = bits.trim().parse().ok()?;
        Some(Self::new(network, bits))
    }

    /// Whether the address falls inside this prefix.
    ///
    /// Addresses of the other family never match.
    pub fn contains(&self, address: IpAddr) -> bool {
        match (self.network, address) {
            (IpAddr::V4(network), IpAddr::V4(address)) => {
                if self.bits == 0 {
                    return true;
                }
                let shift = 32 - u32::from(self.bits);
                u32::from(network) >> shift == u32::from(address) >> shift
            }
            (IpAddr::V6(network), IpAddr::V6(address)) => {
                if self.bits == 0 {
                    return true;
                }
                let shift = 128 - u32::from(self.bits);
                u128::from(network) >> shift == u128::from(address) >> shift
            }
            _ => false,
        }
    }
}

/// Signature set recognizing automated image-proxy fetches.
///
/// Constructed once at startup and shared by reference; any rule firing
/// marks the fetch suspect. Empty or absent inputs simply match nothing.
#[derive(Debug, Clone)]
pub struct ProxySignatures {
    user_agent_markers: Vec<String>,
    via_markers: Vec<String>,
    ip_prefixes: Vec<IpPrefix>,
}

impl Default for ProxySignatures {
    /// Known webmail image-proxy signatures: Gmail and Yahoo rewrite the
    /// user agent, Apple's mail-privacy fetches come from 17.0.0.0/8, and
    /// intermediary hops advertise themselves in the Via header.
    fn default() -> Self {
        Self {
            user_agent_markers: vec![
                "googleimageproxy".to_owned(),
                "yahoomailproxy".to_owned(),
            ],
            via_markers: vec!["proxy".to_owned()],
            ip_prefixes: vec![IpPrefix::new(IpAddr::from([17, 0, 0, 0]), 8)],
        }
    }
}

impl ProxySignatures {
    /// Signature set matching nothing; every fetch classifies as genuine.
    pub fn empty() -> Self {
        Self {
            user_agent_markers: Vec::new(),
            via_markers: Vec::new(),
            ip_prefixes: Vec::new(),
        }
    }

    /// Add a lowercase substring matched against the user agent.
    pub fn with_user_agent_marker(mut self, marker: impl Into<String>) -> Self {
        self.user_agent_markers.push(marker.into().to_lowercase());
        self
    }

    /// Add a lowercase substring matched against the Via header.
    pub fn with_via_marker(mut self, marker: impl Into<String>) -> Self {
        self.via_markers.push(marker.into().to_lowercase());
        self
    }

    /// Add a proxy-operated address range.
    pub fn with_ip_prefix(mut self, prefix: IpPrefix) -> Self {
        self.ip_prefixes.push(prefix);
        self
    }

    /// Classify one fetch: `true` when any signature recognizes it as an
    /// automated proxy fetch. Pure and infallible.
    pub fn classify(&self, user_agent: &str, client_ip: Option<IpAddr>, via: &str) -> bool {
        let user_agent = user_agent.to_lowercase();
        if self
            .user_agent_markers
            .iter()
            .any(|marker| user_agent.contains(marker))
        {
            return true;
        }

        if let Some(address) = client_ip {
            if self.ip_prefixes.iter().any(|prefix| prefix.contains(address)) {
                return true;
            }
        }

        let via = via.to_lowercase();
        self.via_markers.iter().any(|marker| via.contains(marker))
    }
}
