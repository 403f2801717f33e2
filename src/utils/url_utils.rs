//! URL normalization for incoming requests.

use crate::error::ReadError;
use crate::utils::constants::DEFAULT_SCHEME;

/// Ensure the URL carries an explicit `http://` or `https://` scheme.
///
/// Empty or whitespace-only input fails with `InvalidArgument`. Anything
/// without one of the two web schemes gets `https://` prepended. No further
/// validation happens here: a malformed host surfaces later as a navigation
/// failure.
pub fn normalize_url(raw: &str) -> Result<String, ReadError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ReadError::invalid_argument("url is required"));
    }

    if has_web_scheme(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{DEFAULT_SCHEME}{trimmed}"))
    }
}

/// Case-insensitive check for an `http://` or `https://` prefix
#[must_use]
pub fn has_web_scheme(url: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        url.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}
