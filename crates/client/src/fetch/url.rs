//! The genre page URL template.

use url::Url;

/// Error type for genre URL resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("base URL must not carry a query or fragment: {0}")]
    NotABase(String),
}

/// Path segments of a genre listing page relative to the site root.
const GENRE_PATH: [&str; 2] = ["browse", "genre"];

/// Resolve the listing page URL for a genre: `<base>/browse/genre/<id>`.
///
/// The base keeps any path prefix. Hosts come out lowercased, so equivalent
/// bases map to the same cache key.
pub fn genre_url(base_url: &str, genre_id: i64) -> Result<Url, UrlError> {
    let mut url = Url::parse(base_url.trim()).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if url.query().is_some() || url.fragment().is_some() {
        return Err(UrlError::NotABase(url.to_string()));
    }

    let id = genre_id.to_string();
    url.path_segments_mut()
        .map_err(|()| UrlError::NotABase(base_url.to_string()))?
        .pop_if_empty()
        .extend(GENRE_PATH)
        .push(&id);

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genre_url_template() {
        let url = genre_url("https://www.netflix.com", 1365).unwrap();
        assert_eq!(url.as_str(), "https://www.netflix.com/browse/genre/1365");
    }

    #[test]
    fn test_genre_url_trailing_slash_and_prefix() {
        let url = genre_url("http://127.0.0.1:8080/mirror/", 0).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/mirror/browse/genre/0");

        let url = genre_url(" http://127.0.0.1:8080/mirror ", 3).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/mirror/browse/genre/3");
    }

    #[test]
    fn test_genre_url_same_key_for_equivalent_bases() {
        let a = genre_url("https://WWW.netflix.com/", 7).unwrap();
        let b = genre_url("https://www.netflix.com", 7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_genre_url_rejects_query_and_fragment() {
        let result = genre_url("https://www.netflix.com/?locale=en", 7);
        assert!(matches!(result, Err(UrlError::NotABase(_))));

        let result = genre_url("https://www.netflix.com/#rows", 7);
        assert!(matches!(result, Err(UrlError::NotABase(_))));
    }

    #[test]
    fn test_genre_url_unsupported_scheme() {
        let result = genre_url("file:///srv/mirror", 1);
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_genre_url_invalid_base() {
        assert!(matches!(genre_url("www.netflix.com", 1), Err(UrlError::InvalidUrl(_))));
        assert!(matches!(genre_url("   ", 1), Err(UrlError::InvalidUrl(_))));
    }
}
