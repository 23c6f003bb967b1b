//! Hostname normalization for domain-policy keys and story URLs.
//!
//! Every policy table is keyed by the same normalized form: lower-cased ASCII
//! (IDN labels converted to punycode), no trailing dot, `www.` stripped.

use std::net::IpAddr;
use url::{Host, Url};

use crate::common::{CorpusError, CorpusResult};

fn invalid(input: &str, why: &str) -> CorpusError {
    CorpusError::validation(format!("\"{}\" is not a valid hostname: {}", input, why))
}

fn strip_www(host: &str) -> String {
    let host = host.trim_end_matches('.').to_lowercase();
    host.strip_prefix("www.")
        .map(|s| s.to_string())
        .unwrap_or(host)
}

/// Derives the normalized domain name of a story URL.
///
/// Examples:
/// - "https://www.Example.org/page" -> "example.org"
/// - "http://blog.example.org" -> "blog.example.org"
/// - "https://bücher.de/x" -> "xn--bcher-kva.de"
pub fn domain_name_from_url(raw_url: &str) -> CorpusResult<String> {
    let url = Url::parse(raw_url.trim())
        .map_err(|e| CorpusError::validation(format!("Invalid URL \"{}\": {}", raw_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(CorpusError::validation(format!(
            "Invalid URL \"{}\": only http and https URLs are accepted",
            raw_url
        )));
    }

    match url.host() {
        Some(Host::Domain(domain)) => Ok(strip_www(domain)),
        _ => Err(CorpusError::validation(format!(
            "Invalid URL \"{}\": a domain name is required",
            raw_url
        ))),
    }
}

/// Validates and normalizes a bare hostname supplied by an operator.
///
/// Rejects full URLs, wildcards, ports, IP addresses, `localhost` and public
/// suffixes such as `co.uk` that cannot name a single publisher.
pub fn normalize_hostname(input: &str) -> CorpusResult<String> {
    let candidate = input.trim();

    if candidate.is_empty() {
        return Err(invalid(input, "hostname is empty"));
    }
    if candidate.contains("://") || candidate.contains(['/', '?', '#', '@']) {
        return Err(invalid(input, "expected a hostname, not a URL"));
    }
    if candidate.contains('*') {
        return Err(invalid(input, "wildcards are not allowed"));
    }
    if candidate
        .trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<IpAddr>()
        .is_ok()
    {
        return Err(invalid(input, "IP addresses are not allowed"));
    }
    if candidate.contains(':') {
        return Err(invalid(input, "ports are not allowed"));
    }

    let parsed = Url::parse(&format!("https://{}", candidate))
        .map_err(|e| invalid(input, &e.to_string()))?;

    let host = match parsed.host() {
        Some(Host::Domain(domain)) => strip_www(domain),
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => {
            return Err(invalid(input, "IP addresses are not allowed"))
        }
        None => return Err(invalid(input, "hostname is empty")),
    };

    if host == "localhost" || host.ends_with(".localhost") {
        return Err(invalid(input, "localhost is not allowed"));
    }

    if psl::domain_str(&host).is_none() {
        return Err(invalid(
            input,
            "a public suffix cannot be used as a publisher hostname",
        ));
    }

    Ok(host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::CorpusErrorKind;

    #[test]
    fn test_domain_name_from_url() {
        assert_eq!(
            domain_name_from_url("https://www.example.org/page").unwrap(),
            "example.org"
        );
        assert_eq!(
            domain_name_from_url("http://EXAMPLE.ORG").unwrap(),
            "example.org"
        );
        assert_eq!(
            domain_name_from_url("https://www.blog.example.org/a?b=c").unwrap(),
            "blog.example.org"
        );
        assert_eq!(
            domain_name_from_url("  https://a.example/x  ").unwrap(),
            "a.example"
        );
    }

    #[test]
    fn test_domain_name_from_url_converts_idn_to_ascii() {
        assert_eq!(
            domain_name_from_url("https://bücher.de/x").unwrap(),
            "xn--bcher-kva.de"
        );
    }

    #[test]
    fn test_domain_name_from_url_rejects_non_web_urls() {
        assert!(domain_name_from_url("ftp://example.org/file").is_err());
        assert!(domain_name_from_url("example.org/no-scheme").is_err());
        assert!(domain_name_from_url("https://127.0.0.1/x").is_err());
    }

    #[test]
    fn test_normalize_hostname_accepts_bare_hosts() {
        assert_eq!(normalize_hostname("example.com").unwrap(), "example.com");
        assert_eq!(
            normalize_hostname("  WWW.Example.COM ").unwrap(),
            "example.com"
        );
        assert_eq!(
            normalize_hostname("news.example.co.uk").unwrap(),
            "news.example.co.uk"
        );
        assert_eq!(normalize_hostname("example.com.").unwrap(), "example.com");
        assert_eq!(
            normalize_hostname("bücher.de").unwrap(),
            "xn--bcher-kva.de"
        );
    }

    #[test]
    fn test_normalize_hostname_rejects_urls() {
        let err = normalize_hostname("https://example.com").unwrap_err();
        assert_eq!(err.kind(), CorpusErrorKind::Validation);
        assert!(normalize_hostname("example.com/path").is_err());
    }

    #[test]
    fn test_normalize_hostname_rejects_wildcards_and_ports() {
        assert!(normalize_hostname("*.example.com").is_err());
        assert!(normalize_hostname("example.com:8080").is_err());
    }

    #[test]
    fn test_normalize_hostname_rejects_ip_addresses() {
        assert!(normalize_hostname("127.0.0.1").is_err());
        assert!(normalize_hostname("::1").is_err());
        assert!(normalize_hostname("[2001:db8::1]").is_err());
    }

    #[test]
    fn test_normalize_hostname_rejects_localhost_and_public_suffixes() {
        assert!(normalize_hostname("localhost").is_err());
        assert!(normalize_hostname("co.uk").is_err());
        assert!(normalize_hostname("com").is_err());
        assert!(normalize_hostname("www.co.uk").is_err());
        assert!(normalize_hostname("").is_err());
    }
}
