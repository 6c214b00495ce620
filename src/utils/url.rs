//! Server URL handling.

/// Normalize a user-supplied server address.
///
/// Bare `host:port` values get an `http://` scheme and trailing slashes are
/// dropped so endpoint paths can be appended directly.
///
/// ```
/// use parley::utils::url::normalize_server_url;
///
/// assert_eq!(normalize_server_url("127.0.0.1:4096"), "http://127.0.0.1:4096");
/// assert_eq!(normalize_server_url("https://chat.example.com/"), "https://chat.example.com");
/// ```
pub fn normalize_server_url(input: &str) -> String {
    let trimmed = input.trim().trim_end_matches('/');
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}

/// Join a server base URL and an endpoint name with exactly one slash.
///
/// ```
/// use parley::utils::url::endpoint_url;
///
/// assert_eq!(
///     endpoint_url("http://localhost:4096/", "/session_list"),
///     "http://localhost:4096/session_list"
/// );
/// ```
pub fn endpoint_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_adds_scheme_only_when_missing() {
        assert_eq!(normalize_server_url("localhost:4096"), "http://localhost:4096");
        assert_eq!(
            normalize_server_url("  http://localhost:4096//  "),
            "http://localhost:4096"
        );
        assert_eq!(
            normalize_server_url("https://example.com/base/"),
            "https://example.com/base"
        );
    }

    #[test]
    fn endpoint_url_keeps_base_path() {
        assert_eq!(
            endpoint_url("https://example.com/base", "session_chat"),
            "https://example.com/base/session_chat"
        );
        assert_eq!(
            endpoint_url("https://example.com/base///", "//app_info"),
            "https://example.com/base/app_info"
        );
    }
}
