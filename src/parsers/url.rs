use once_cell::sync::Lazy;
use regex::Regex;

static SCHEME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://")
        .expect("Invalid scheme regex")
});

/// Origin of the site (`scheme://host[:port]`), without a trailing slash
pub fn site_origin(base: &str) -> String {
    match ::url::Url::parse(base) {
        Ok(parsed) if parsed.has_host() => parsed.origin().ascii_serialization(),
        _ => base.trim_end_matches('/').to_string(),
    }
}

/// Resolve a link found on the board against the site origin.
///
/// Values carrying a scheme come back untouched, rooted paths are appended to
/// the origin, anything else is appended with one separating slash.
pub fn absolute_url(base: &str, href: &str) -> String {
    if SCHEME_REGEX.is_match(href) {
        return href.to_string();
    }

    let origin = site_origin(base);
    if href.starts_with('/') {
        format!("{}{}", origin, href)
    } else {
        format!("{}/{}", origin, href)
    }
}

/// Relative links, and absolute ones pointing at the site's own origin
pub fn is_same_site(base: &str, href: &str) -> bool {
    !SCHEME_REGEX.is_match(href) || site_origin(href) == site_origin(base)
}

/// Path component of a link, whether it is absolute or already a path
pub fn link_path(href: &str) -> String {
    if SCHEME_REGEX.is_match(href) {
        if let Ok(parsed) = ::url::Url::parse(href) {
            return parsed.path().to_string();
        }
    }
    href.split(|c| c == '?' || c == '#')
        .next()
        .unwrap_or_default()
        .to_string()
}
