//! URL validation and normalization.
//!
//! User-entered text is accepted either as a full absolute URL or as a bare
//! domain (optionally with a path), which is canonicalized by prepending
//! `https://`. Both functions are pure.

/// Check whether `text` is a valid absolute URL, or a bare domain that
/// becomes one once `https://` is prepended.
pub fn is_valid_url(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return false;
    }

    if parses_as_absolute(text) {
        return true;
    }

    // Retry with a scheme, but only accept inputs that look like a domain
    // (optionally followed by a path).
    let prefixed = format!("https://{}", text);
    parses_as_absolute(&prefixed) && is_domain_with_path(text)
}

/// Canonicalize `text` into a fetchable URL where possible.
///
/// Already-absolute URLs pass through unchanged; bare domains gain an
/// `https://` prefix. Anything else is returned trimmed but otherwise
/// untouched, so callers must not assume success.
pub fn format_url(text: &str) -> String {
    let text = text.trim();
    if parses_as_absolute(text) {
        return text.to_string();
    }

    let prefixed = format!("https://{}", text);
    if parses_as_absolute(&prefixed) {
        return prefixed;
    }

    text.to_string()
}

/// Minimal absolute-URL check: `scheme://authority[/path...]` with a
/// well-formed scheme and a non-empty, whitespace-free authority.
fn parses_as_absolute(text: &str) -> bool {
    let Some((scheme, rest)) = text.split_once("://") else {
        return false;
    };

    let mut chars = scheme.chars();
    let valid_scheme = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    };
    if !valid_scheme {
        return false;
    }

    let authority = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    !authority.is_empty() && !authority.chars().any(char::is_whitespace)
}

/// Check for a domain name with an optional path suffix: dot-separated
/// alphanumeric labels (hyphens allowed mid-label, each at most 63 chars)
/// ending in an alphabetic top-level label of at least 2 chars.
fn is_domain_with_path(text: &str) -> bool {
    let (domain, path) = match text.split_once('/') {
        Some((domain, path)) => (domain, Some(path)),
        None => (text, None),
    };

    if let Some(path) = path {
        if path.chars().any(char::is_whitespace) {
            return false;
        }
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    for label in &labels {
        if label.is_empty() || label.len() > 63 {
            return false;
        }
        if label.starts_with('-') || label.ends_with('-') {
            return false;
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return false;
        }
    }

    // Top-level label must be alphabetic and at least 2 chars.
    let tld = labels[labels.len() - 1];
    tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
}
