//! Redirect target validation.
//!
//! Both helpers only ever return local paths, so a crafted `next` parameter
//! or `Referer` header can't send the user to another site.

use axum::http::{HeaderMap, header::REFERER};

/// Return `next` if it is a local absolute path.
///
/// Rejects protocol-relative (`//host`) and backslash (`/\host`) forms that
/// browsers treat as another origin.
#[must_use]
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|n| {
        n.starts_with('/')
            && !n.starts_with("//")
            && !n.starts_with("/\\")
            && !n.chars().any(char::is_control)
    })
}

/// The path of a same-origin `Referer`, falling back to `/`.
///
/// `base_url` is the configured public origin, e.g. `https://shop.example.com`.
#[must_use]
pub fn back_or_home(headers: &HeaderMap, base_url: &str) -> String {
    headers
        .get(REFERER)
        .and_then(|v| v.to_str().ok())
        .and_then(|referer| referer.strip_prefix(base_url))
        .filter(|rest| rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'))
        .map(|rest| match rest {
            "" => "/".to_string(),
            r if r.starts_with('?') => format!("/{r}"),
            r => r.to_string(),
        })
        .and_then(|path| safe_next(Some(&path)).map(str::to_owned))
        .unwrap_or_else(|| "/".to_string())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    const BASE: &str = "https://shop.example.com";

    fn referer(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(REFERER, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/cart")), Some("/cart"));
        assert_eq!(safe_next(Some("/?category=3")), Some("/?category=3"));
        assert_eq!(safe_next(Some("//evil.example")), None);
        assert_eq!(safe_next(Some("/\\evil.example")), None);
        assert_eq!(safe_next(Some("https://evil.example/")), None);
        assert_eq!(safe_next(Some("")), None);
        assert_eq!(safe_next(None), None);
    }

    #[test]
    fn test_back_to_same_origin_referer() {
        assert_eq!(
            back_or_home(&referer("https://shop.example.com/products/4"), BASE),
            "/products/4"
        );
        assert_eq!(
            back_or_home(&referer("https://shop.example.com/?category=2"), BASE),
            "/?category=2"
        );
        assert_eq!(back_or_home(&referer("https://shop.example.com"), BASE), "/");
    }

    #[test]
    fn test_foreign_referer_goes_home() {
        assert_eq!(back_or_home(&referer("https://evil.example/x"), BASE), "/");
        assert_eq!(
            back_or_home(&referer("https://shop.example.com.evil.example/x"), BASE),
            "/"
        );
        assert_eq!(
            back_or_home(&referer("https://shop.example.com//evil.example"), BASE),
            "/"
        );
    }

    #[test]
    fn test_missing_referer_goes_home() {
        assert_eq!(back_or_home(&HeaderMap::new(), BASE), "/");
    }
}
