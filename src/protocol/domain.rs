//! Domain derivation from the server greeting.
//!
//! The login-facing domain of a mail host often differs from the name
//! that was probed, so the full username is synthesized from whatever
//! the banner announces. This is a best-effort heuristic: it must never
//! fail a connection, only fall back to a sentinel.

/// Sentinel returned when no domain can be derived from a banner.
pub const UNKNOWN_DOMAIN: &str = "unknown.domain";

/// TLD suffixes recognized as the end of a registrable domain.
const KNOWN_TLDS: &[&str] = &[
    ".com", ".org", ".net", ".edu", ".gov", ".co.uk", ".de", ".fr",
];

/// Derive a domain from an SMTP greeting line.
///
/// Takes the first whitespace-delimited token after the `220` status
/// code (or after the `220-` continuation marker) and reduces it to its
/// last two dot-separated labels. A token without dots is returned
/// whole; an empty or unparseable banner yields [`UNKNOWN_DOMAIN`].
pub fn domain_from_banner(banner: &str) -> String {
    let token = if let Some(rest) = banner.strip_prefix("220 ") {
        rest.split_whitespace().next().unwrap_or("")
    } else if banner.starts_with("220-") {
        banner
            .split_whitespace()
            .next()
            .unwrap_or("")
            .trim_start_matches("220-")
    } else {
        banner.split_whitespace().next().unwrap_or("")
    };

    let token = token.trim_end();
    if token.is_empty() {
        return UNKNOWN_DOMAIN.to_string();
    }

    for tld in KNOWN_TLDS {
        if token.ends_with(tld) {
            return last_two_labels(token);
        }
    }

    last_two_labels(token)
}

fn last_two_labels(token: &str) -> String {
    let labels: Vec<&str> = token.split('.').collect();
    if labels.len() >= 2 {
        labels[labels.len() - 2..].join(".")
    } else {
        token.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_banner() {
        assert_eq!(
            domain_from_banner("220 mail.example.com ESMTP ready"),
            "example.com"
        );
    }

    #[test]
    fn test_continuation_banner() {
        assert_eq!(
            domain_from_banner("220-mx1.example.org ESMTP"),
            "example.org"
        );
    }

    #[test]
    fn test_deep_subdomain() {
        assert_eq!(
            domain_from_banner("220 smtp.eu.mail.example.net ESMTP"),
            "example.net"
        );
    }

    #[test]
    fn test_token_without_dots() {
        assert_eq!(domain_from_banner("220 localhost ESMTP"), "localhost");
    }

    #[test]
    fn test_unrecognized_banner_uses_first_token() {
        // No status prefix at all: the first token still gets the rule.
        assert_eq!(domain_from_banner("mail.example.com"), "example.com");
        assert_eq!(domain_from_banner("mx.example.de ready"), "example.de");
    }

    #[test]
    fn test_empty_and_malformed() {
        assert_eq!(domain_from_banner(""), UNKNOWN_DOMAIN);
        assert_eq!(domain_from_banner("220 "), UNKNOWN_DOMAIN);
        assert_eq!(domain_from_banner("   "), UNKNOWN_DOMAIN);
    }
}
