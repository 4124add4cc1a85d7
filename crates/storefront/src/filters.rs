//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// URL prefix uploaded media is served under.
pub const MEDIA_URL: &str = "/media/";

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Public URL of a file stored under the media root.
///
/// Usage in templates: `{{ product.image|media_url }}` (inside an `if let`)
#[askama::filter_fn]
pub fn media_url(path: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(media_path(&path.to_string()))
}

fn media_path(path: &str) -> String {
    format!("{MEDIA_URL}{}", path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_path() {
        assert_eq!(media_path("products/a.png"), "/media/products/a.png");
        assert_eq!(media_path("/templates/b.png"), "/media/templates/b.png");
    }
}
