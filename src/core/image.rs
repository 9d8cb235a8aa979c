//! Image URL normalization

use crate::core::api;

/// Shown when there is no stored image
pub const FALLBACK_IMAGE: &str = "assets/default-profile.png";

const STORED_PREFIXES: [&str; 3] = ["/image/", "images/", "uploads/"];

/// Map a stored image path to the URL the API serves it from.
///
/// Blank input gives [`FALLBACK_IMAGE`]; `http(s)://` and `data:` URLs pass
/// through. Anything else is reduced to its file name and served from
/// `{api_base}/image/{file}`.
#[must_use]
pub fn normalize_image_url(api_base: &str, raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return FALLBACK_IMAGE.to_string();
    };
    let lower = raw.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("data:") {
        return raw.to_string();
    }

    let mut path = raw.split(['?', '#']).next().unwrap_or(raw).replace('\\', "/");
    for prefix in STORED_PREFIXES {
        if let Some(rest) = path.strip_prefix(prefix) {
            path = rest.to_string();
        }
    }
    let Some(file) = path.rsplit('/').find(|s| !s.is_empty()) else {
        return FALLBACK_IMAGE.to_string();
    };
    format!("{}{}", api_base.trim_end_matches('/'), api::image_path(file))
}
