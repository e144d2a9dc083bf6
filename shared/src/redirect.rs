/// Resolve the redirect base for a browser-facing response.
///
/// The default is the first allow-listed entry. A caller-supplied override
/// (already URL-decoded) is accepted only when it matches an allow-listed
/// entry at a URI boundary; anything else falls back to the default so a
/// caller can never redirect to an arbitrary host.
pub fn resolve_redirect_uri<'a>(allow_list: &'a [String], requested: Option<&'a str>) -> &'a str {
    let default = allow_list.first().map(String::as_str).unwrap_or("");

    match requested {
        Some(uri) if allow_list.iter().any(|entry| matches_allowed(uri, entry)) => uri,
        _ => default,
    }
}

/// Boundary-aware prefix match: the candidate must equal the entry, or extend
/// it with '/' or '?'. A plain starts_with would also accept
/// "http://localhost:4200123" against "http://localhost:4200".
fn matches_allowed(candidate: &str, entry: &str) -> bool {
    match candidate.strip_prefix(entry) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allow_list() -> Vec<String> {
        vec![
            "https://a.example".to_string(),
            "http://localhost:4200".to_string(),
        ]
    }

    #[test]
    fn test_default_is_first_entry() {
        assert_eq!(resolve_redirect_uri(&allow_list(), None), "https://a.example");
    }

    #[test]
    fn test_override_with_path_is_accepted() {
        assert_eq!(
            resolve_redirect_uri(&allow_list(), Some("http://localhost:4200/bleh")),
            "http://localhost:4200/bleh"
        );
    }

    #[test]
    fn test_exact_match_is_accepted() {
        assert_eq!(
            resolve_redirect_uri(&allow_list(), Some("http://localhost:4200")),
            "http://localhost:4200"
        );
    }

    #[test]
    fn test_query_boundary_is_accepted() {
        assert_eq!(
            resolve_redirect_uri(&allow_list(), Some("https://a.example?next=1")),
            "https://a.example?next=1"
        );
    }

    #[test]
    fn test_suffixed_host_falls_back_to_default() {
        // Prefix-boundary property: a longer port/host must not match.
        assert_eq!(
            resolve_redirect_uri(&allow_list(), Some("http://localhost:4200123/x")),
            "https://a.example"
        );
    }

    #[test]
    fn test_unlisted_host_falls_back_to_default() {
        assert_eq!(
            resolve_redirect_uri(&allow_list(), Some("https://evil.example")),
            "https://a.example"
        );
    }
}
