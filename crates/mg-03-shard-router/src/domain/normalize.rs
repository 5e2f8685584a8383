//! # URL Normalization
//!
//! Two clients annotating "the same page" must land on the same graph
//! location, so URLs are normalized before anything is derived from them:
//!
//! 1. surrounding whitespace trimmed
//! 2. repeated scheme prefixes collapsed (`https://https://x` → `https://x`)
//! 3. host lowercased, userinfo and default port dropped
//! 4. trailing slashes stripped from the path
//! 5. `utm_*` query parameters removed (the `?` too if nothing is left)
//!
//! The fragment is kept. Normalization is total: input the URL parser
//! refuses still gets steps 1, 2, 4 and 5 applied textually.

use url::Url;

/// Domain used when no host can be extracted.
pub const INVALID_DOMAIN: &str = "invalid";

const SCHEMES: [&str; 2] = ["https://", "http://"];

fn scheme_len(s: &str) -> Option<usize> {
    SCHEMES
        .iter()
        .find(|scheme| {
            s.get(..scheme.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
        })
        .map(|scheme| scheme.len())
}

/// Drop leading scheme prefixes until only one is left.
fn collapse_schemes(mut s: &str) -> &str {
    while let Some(len) = scheme_len(s) {
        let rest = &s[len..];
        if scheme_len(rest).is_none() {
            break;
        }
        s = rest;
    }
    s
}

fn is_tracking_param(pair: &str) -> bool {
    let key = pair.split('=').next().unwrap_or_default();
    key.get(..4)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("utm_"))
}

/// Query string without tracking parameters, in original order and encoding.
fn strip_tracking(query: &str) -> String {
    query
        .split('&')
        .filter(|pair| !pair.is_empty() && !is_tracking_param(pair))
        .collect::<Vec<_>>()
        .join("&")
}

fn push_query_and_fragment(out: &mut String, query: Option<&str>, fragment: Option<&str>) {
    if let Some(query) = query {
        let kept = strip_tracking(query);
        if !kept.is_empty() {
            out.push('?');
            out.push_str(&kept);
        }
    }
    if let Some(fragment) = fragment {
        out.push('#');
        out.push_str(fragment);
    }
}

fn rebuild(url: &Url, host: &str) -> String {
    let mut out = format!("{}://{}", url.scheme(), host);
    if let Some(port) = url.port() {
        out.push(':');
        out.push_str(&port.to_string());
    }
    out.push_str(url.path().trim_end_matches('/'));
    push_query_and_fragment(&mut out, url.query(), url.fragment());
    out
}

/// Textual fallback for strings the parser rejects.
fn fallback(s: &str) -> String {
    let (rest, fragment) = match s.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment)),
        None => (s, None),
    };
    let (base, query) = match rest.split_once('?') {
        Some((base, query)) => (base, Some(query)),
        None => (rest, None),
    };
    let mut out = base.trim_end_matches('/').to_string();
    push_query_and_fragment(&mut out, query, fragment);
    out
}

/// Normalize a URL. Never fails; equal inputs give equal outputs.
pub fn normalize_url(raw: &str) -> String {
    let collapsed = collapse_schemes(raw.trim());
    match Url::parse(collapsed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => match url.host_str() {
            Some(host) if !host.is_empty() => rebuild(&url, host),
            _ => fallback(collapsed),
        },
        _ => fallback(collapsed),
    }
}

/// Hostname of a (normalized or raw) URL, lowercased, without userinfo or
/// port.
pub fn host_of(url: &str) -> Option<String> {
    if let Ok(parsed) = Url::parse(url) {
        if let Some(host) = parsed.host_str().filter(|h| !h.is_empty()) {
            return Some(host.to_ascii_lowercase());
        }
    }

    let after_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let authority = after_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
    let host = match host_port.rsplit_once(':') {
        Some((host, port))
            if !host_port.starts_with('[') && port.chars().all(|c| c.is_ascii_digit()) =>
        {
            host
        }
        _ => host_port,
    };
    let host = host.trim().to_ascii_lowercase();
    (!host.is_empty()).then_some(host)
}

/// Domain label used in shard names: hostname with `.` → `_` and anything
/// outside `[a-z0-9_-]` replaced by `_`.
pub fn domain_of(url: &str) -> String {
    match host_of(url) {
        Some(host) => sanitize_domain(&host),
        None => INVALID_DOMAIN.to_string(),
    }
}

/// Apply the domain character rules to a hostname or domain label.
pub fn sanitize_domain(host: &str) -> String {
    host.chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' | '_' => c,
            'A'..='Z' => c.to_ascii_lowercase(),
            _ => '_',
        })
        .collect()
}
