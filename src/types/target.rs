//! Host target parsing and resolution.
//!
//! A hosts-list entry is an IP, a CIDR range, or a hostname. All of it
//! is resolved to concrete addresses up front, before the task set is
//! built, so workers never touch DNS.

use ipnetwork::IpNetwork;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// A probe target resolved to a concrete address.
///
/// `original` is what the operator wrote; records and logs use it so a
/// credential verified against a resolved IP is still reported under
/// the supplied name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostTarget {
    pub original: String,
    pub ip: IpAddr,
}

impl HostTarget {
    pub fn new(original: impl Into<String>, ip: IpAddr) -> Self {
        Self {
            original: original.into(),
            ip,
        }
    }
}

impl fmt::Display for HostTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.original == self.ip.to_string() {
            write!(f, "{}", self.ip)
        } else {
            write!(f, "{} ({})", self.original, self.ip)
        }
    }
}

/// Why a hosts-list entry could not be turned into targets.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TargetError {
    #[error("not an IP, CIDR range, or hostname: {0}")]
    InvalidFormat(String),
    #[error("invalid CIDR notation: {0}")]
    InvalidCidr(String),
    #[error("CIDR range spans {0} addresses, the limit is {1}")]
    CidrTooLarge(u128, u128),
    #[error("could not resolve '{0}': {1}")]
    DnsResolutionFailed(String, String),
    #[error("'{0}' resolved to no addresses")]
    NoAddressesFound(String),
}

/// One unresolved entry from the hosts list.
#[derive(Debug, Clone)]
pub enum HostSpec {
    Single(IpAddr),
    Cidr(IpNetwork),
    Hostname(String),
}

impl HostSpec {
    /// Largest CIDR entry accepted.
    ///
    /// The task set is the cross product of hosts and credentials, so
    /// this cap sits far below what a plain port scanner would take.
    pub const MAX_CIDR_HOSTS: u128 = 4096;

    /// Parse a hosts-list entry.
    pub fn parse(s: &str) -> Result<Self, TargetError> {
        let s = s.trim();

        if let Ok(ip) = s.parse::<IpAddr>() {
            return Ok(Self::Single(ip));
        }

        if s.contains('/') {
            let network: IpNetwork = s
                .parse()
                .map_err(|_| TargetError::InvalidCidr(s.to_string()))?;
            let span = address_span(&network);
            if span > Self::MAX_CIDR_HOSTS {
                return Err(TargetError::CidrTooLarge(span, Self::MAX_CIDR_HOSTS));
            }
            return Ok(Self::Cidr(network));
        }

        if is_valid_hostname(s) {
            return Ok(Self::Hostname(s.to_string()));
        }

        Err(TargetError::InvalidFormat(s.to_string()))
    }

    /// Resolve this entry to concrete probe targets.
    ///
    /// A CIDR entry expands to each usable host address; a hostname
    /// resolves to its first address.
    pub async fn resolve(
        &self,
        resolver: &TokioAsyncResolver,
    ) -> Result<Vec<HostTarget>, TargetError> {
        match self {
            Self::Single(ip) => Ok(vec![HostTarget::new(ip.to_string(), *ip)]),

            Self::Cidr(network) => Ok(network
                .iter()
                .filter(|ip| is_usable_host(network, ip))
                .map(|ip| HostTarget::new(ip.to_string(), ip))
                .collect()),

            Self::Hostname(hostname) => {
                let response = resolver.lookup_ip(hostname.as_str()).await.map_err(|e| {
                    TargetError::DnsResolutionFailed(hostname.clone(), e.to_string())
                })?;

                let ip = response
                    .iter()
                    .next()
                    .ok_or_else(|| TargetError::NoAddressesFound(hostname.clone()))?;

                Ok(vec![HostTarget::new(hostname.clone(), ip)])
            }
        }
    }
}

impl FromStr for HostSpec {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Resolve every hosts-list entry, skipping bad ones with a warning.
///
/// An entry that cannot be parsed or resolved is a per-host problem,
/// not a fatal configuration error; the rest of the list still scans.
pub async fn resolve_hosts(entries: &[String]) -> Vec<HostTarget> {
    let resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());
    let mut targets = Vec::new();

    for entry in entries {
        let resolved = match HostSpec::parse(entry) {
            Ok(spec) => spec.resolve(&resolver).await,
            Err(e) => Err(e),
        };
        match resolved {
            Ok(mut hosts) => targets.append(&mut hosts),
            Err(e) => tracing::warn!(host = %entry, error = %e, "skipping host entry"),
        }
    }

    targets
}

fn address_span(network: &IpNetwork) -> u128 {
    match network {
        IpNetwork::V4(net) => u128::from(net.size()),
        IpNetwork::V6(net) => {
            let prefix = u32::from(net.prefix());
            if prefix >= 128 {
                1
            } else {
                1u128 << (128 - prefix)
            }
        }
    }
}

/// IPv4 network and broadcast addresses are not probe targets.
fn is_usable_host(network: &IpNetwork, ip: &IpAddr) -> bool {
    match (network, ip) {
        (IpNetwork::V4(net), IpAddr::V4(addr)) if net.prefix() < 31 => {
            *addr != net.network() && *addr != net.broadcast()
        }
        _ => true,
    }
}

fn is_valid_hostname(s: &str) -> bool {
    if s.is_empty() || s.len() > 253 {
        return false;
    }
    s.split('.').all(is_valid_label)
}

/// DNS label: 1-63 characters, alphanumeric plus inner hyphens.
fn is_valid_label(label: &str) -> bool {
    let first_ok = label.chars().next().is_some_and(char::is_alphanumeric);
    let last_ok = label.chars().last().is_some_and(char::is_alphanumeric);

    !label.is_empty()
        && label.len() <= 63
        && first_ok
        && last_ok
        && label.chars().all(|c| c.is_alphanumeric() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ipv4() {
        let spec = HostSpec::parse("192.168.1.1").unwrap();
        assert!(matches!(spec, HostSpec::Single(IpAddr::V4(_))));
    }

    #[test]
    fn test_parse_hostname() {
        let spec = HostSpec::parse("mail.example.com").unwrap();
        assert!(matches!(spec, HostSpec::Hostname(_)));
    }

    #[test]
    fn test_parse_cidr() {
        let spec = HostSpec::parse("192.168.1.0/30").unwrap();
        assert!(matches!(spec, HostSpec::Cidr(_)));
    }

    #[test]
    fn test_cidr_too_large() {
        let result = HostSpec::parse("10.0.0.0/8");
        assert!(matches!(result, Err(TargetError::CidrTooLarge(_, _))));
    }

    #[test]
    fn test_invalid_entry() {
        assert!(HostSpec::parse("-bad-.example").is_err());
        assert!(HostSpec::parse("").is_err());
    }

    #[tokio::test]
    async fn test_cidr_expansion_skips_network_and_broadcast() {
        let resolver =
            TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());
        let spec = HostSpec::parse("192.168.1.0/30").unwrap();
        let targets = spec.resolve(&resolver).await.unwrap();
        let ips: Vec<String> = targets.iter().map(|t| t.ip.to_string()).collect();
        assert_eq!(ips, vec!["192.168.1.1", "192.168.1.2"]);
    }

    #[test]
    fn test_valid_hostname() {
        assert!(is_valid_hostname("example.com"));
        assert!(is_valid_hostname("my-server"));
        assert!(!is_valid_hostname(""));
        assert!(!is_valid_hostname("-invalid.com"));
        assert!(!is_valid_hostname("bad..label"));
    }
}
