/// Versioned API path every GitLab REST root ends with.
pub const API_PATH: &str = "/api/v4";

/// Used when no base address is configured.
pub const DEFAULT_API_ROOT: &str = "https://gitlab.com/api/v4";

/// Turn a configured GitLab address into a canonical API root.
///
/// Accepts either the instance address (`https://gitlab.example.com`) or an
/// address that already carries the API path. Trailing slashes are dropped and
/// `/api/v4` is appended once. Normalizing an already-normalized root returns it
/// unchanged.
pub fn normalize_api_url(base: &str) -> String {
    let trimmed = base.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return DEFAULT_API_ROOT.to_string();
    }

    if trimmed.ends_with(API_PATH) {
        trimmed.to_string()
    } else {
        format!("{}{}", trimmed, API_PATH)
    }
}

/// Join a normalized API root with an absolute endpoint path.
pub fn endpoint(root: &str, path: &str) -> String {
    format!("{}/{}", root.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appends_api_path() {
        assert_eq!(
            normalize_api_url("https://gitlab.example.com"),
            "https://gitlab.example.com/api/v4"
        );
    }

    #[test]
    fn test_strips_trailing_slashes() {
        assert_eq!(
            normalize_api_url("https://gitlab.example.com//"),
            "https://gitlab.example.com/api/v4"
        );
        assert_eq!(
            normalize_api_url("https://gitlab.example.com/api/v4/"),
            "https://gitlab.example.com/api/v4"
        );
    }

    #[test]
    fn test_keeps_existing_api_path() {
        assert_eq!(
            normalize_api_url("https://gitlab.example.com/api/v4"),
            "https://gitlab.example.com/api/v4"
        );
    }

    #[test]
    fn test_self_hosted_subpath() {
        assert_eq!(
            normalize_api_url("  https://example.com/gitlab  "),
            "https://example.com/gitlab/api/v4"
        );
    }

    #[test]
    fn test_empty_falls_back_to_default() {
        assert_eq!(normalize_api_url(""), DEFAULT_API_ROOT);
        assert_eq!(normalize_api_url(" / "), DEFAULT_API_ROOT);
    }

    #[test]
    fn test_idempotent() {
        for input in [
            "https://gitlab.example.com",
            "https://gitlab.example.com/",
            "https://gitlab.example.com/api/v4",
            "http://127.0.0.1:8080/gitlab/",
            "",
        ] {
            let once = normalize_api_url(input);
            assert_eq!(normalize_api_url(&once), once, "input: {:?}", input);
        }
    }

    #[test]
    fn test_endpoint_join() {
        assert_eq!(
            endpoint("https://gitlab.com/api/v4", "/projects/1/merge_requests/2/approve"),
            "https://gitlab.com/api/v4/projects/1/merge_requests/2/approve"
        );
        assert_eq!(
            endpoint("https://gitlab.com/api/v4/", "projects/1"),
            "https://gitlab.com/api/v4/projects/1"
        );
    }
}
