//! Post-auth redirect guard for the `next` query parameter.

/// Where to go when `next` is missing or rejected.
pub const DEFAULT_NEXT_PATH: &str = "/";

const AUTH_PAGES: [&str; 2] = ["/login", "/signup"];

/// Validate a `next` parameter from `/login`, `/signup` or `/upgrade`.
///
/// The value must be a same-origin absolute path and must not lead back into
/// an auth page. Anything else resolves to [`DEFAULT_NEXT_PATH`].
#[must_use]
pub fn safe_next_path(raw: Option<&str>) -> String {
    let Some(candidate) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return DEFAULT_NEXT_PATH.to_string();
    };

    if !candidate.starts_with('/') || candidate.starts_with("//") || candidate.starts_with("/\\")
    {
        return DEFAULT_NEXT_PATH.to_string();
    }

    let path = candidate
        .split(['?', '#'])
        .next()
        .unwrap_or(candidate)
        .trim_end_matches('/');
    let loops_back = AUTH_PAGES
        .iter()
        .any(|page| path == *page || path.starts_with(&format!("{page}/")));

    if loops_back {
        DEFAULT_NEXT_PATH.to_string()
    } else {
        candidate.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_paths_pass_through() {
        assert_eq!(safe_next_path(Some("/account")), "/account");
        assert_eq!(
            safe_next_path(Some("/peptide/bpc-157?tab=safety")),
            "/peptide/bpc-157?tab=safety"
        );
        assert_eq!(safe_next_path(Some("  /upgrade ")), "/upgrade");
    }

    #[test]
    fn test_missing_or_empty_uses_default() {
        assert_eq!(safe_next_path(None), DEFAULT_NEXT_PATH);
        assert_eq!(safe_next_path(Some("   ")), DEFAULT_NEXT_PATH);
    }

    #[test]
    fn test_login_loop_is_rejected() {
        assert_eq!(safe_next_path(Some("/login?foo")), "/");
        assert_eq!(safe_next_path(Some("/login")), "/");
        assert_eq!(safe_next_path(Some("/login/")), "/");
        assert_eq!(safe_next_path(Some("/signup#top")), "/");
        assert_eq!(safe_next_path(Some("/signup/confirm")), "/");
    }

    #[test]
    fn test_similar_prefixes_are_allowed() {
        assert_eq!(safe_next_path(Some("/loginhelp")), "/loginhelp");
        assert_eq!(safe_next_path(Some("/signups")), "/signups");
    }

    #[test]
    fn test_external_targets_are_rejected() {
        assert_eq!(safe_next_path(Some("https://evil.example")), "/");
        assert_eq!(safe_next_path(Some("//evil.example/path")), "/");
        assert_eq!(safe_next_path(Some("/\\evil.example")), "/");
        assert_eq!(safe_next_path(Some("account")), "/");
    }
}
