//! Helpers for turning the configured server URL into endpoint URLs.

/// Strip trailing slashes so endpoints can be appended safely.
///
/// ```
/// use lumon::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("http://127.0.0.1:5000/"), "http://127.0.0.1:5000");
/// assert_eq!(normalize_base_url("https://plants.example.com/api///"), "https://plants.example.com/api");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

/// Join a base URL and an endpoint path with exactly one slash.
///
/// ```
/// use lumon::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("http://127.0.0.1:5000/", "/predict"),
///     "http://127.0.0.1:5000/predict"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{normalized_base}/{endpoint}")
}

/// Check that `base_url` names an http(s) server before it is saved.
pub fn validate_base_url(base_url: &str) -> Result<String, String> {
    let normalized = normalize_base_url(base_url);
    let rest = normalized
        .strip_prefix("http://")
        .or_else(|| normalized.strip_prefix("https://"))
        .ok_or_else(|| format!("'{base_url}' must start with http:// or https://"))?;
    if rest.is_empty() || rest.starts_with('/') {
        return Err(format!("'{base_url}' is missing a host name"));
    }
    Ok(normalized)
}
