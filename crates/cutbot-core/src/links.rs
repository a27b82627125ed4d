//! URL templating for the QR image service and the shortener's stats page.
//!
//! Nothing here performs network I/O.

use url::{form_urlencoded, Url};

pub const QR_SIZE: &str = "300x300";

/// Link to a rendered QR code image for `data`.
pub fn qr_code_link(qr_api_url: &str, data: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("size", QR_SIZE)
        .append_pair("data", data)
        .finish();
    let sep = if qr_api_url.contains('?') { '&' } else { '?' };
    format!("{qr_api_url}{sep}{query}")
}

/// Analytics page for a short link.
///
/// The stats URL layout is not a documented upstream contract; treat the
/// result as display text.
pub fn stats_link(stats_base: &str, short_url: &str, alias: Option<&str>) -> String {
    let path = match alias {
        Some(a) => a.to_string(),
        None => Url::parse(short_url)
            .map(|u| u.path().trim_start_matches('/').to_string())
            .unwrap_or_default(),
    };
    format!("{}/{path}/stats", stats_base.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_CUTTLY_STATS_BASE, DEFAULT_QR_API_URL};

    fn data_param(link: &str) -> Option<String> {
        let u = Url::parse(link).ok()?;
        u.query_pairs()
            .find(|(k, _)| k == "data")
            .map(|(_, v)| v.into_owned())
    }

    #[test]
    fn qr_link_has_expected_shape() {
        let link = qr_code_link(DEFAULT_QR_API_URL, "https://cutt.ly/abc");
        assert!(link.starts_with("https://api.qrserver.com/v1/create-qr-code/?size=300x300&data="));
        assert!(Url::parse(&link).is_ok());
    }

    #[test]
    fn qr_link_data_round_trips() {
        for short in [
            "https://cutt.ly/abc",
            "https://cutt.ly/my-alias",
            "https://example.com/path?x=1&y=2#frag",
            "http://example.com:8080/a b",
        ] {
            let link = qr_code_link(DEFAULT_QR_API_URL, short);
            assert_eq!(data_param(&link).as_deref(), Some(short), "link: {link}");
        }
    }

    #[test]
    fn qr_link_appends_to_existing_query() {
        let link = qr_code_link("https://qr.example.com/gen?fmt=png", "https://cutt.ly/x");
        assert!(link.starts_with("https://qr.example.com/gen?fmt=png&size=300x300&data="));
        assert_eq!(data_param(&link).as_deref(), Some("https://cutt.ly/x"));
    }

    #[test]
    fn stats_link_prefers_alias() {
        assert_eq!(
            stats_link(DEFAULT_CUTTLY_STATS_BASE, "https://cutt.ly/xyz", Some("mysite")),
            "https://cutt.ly/mysite/stats"
        );
    }

    #[test]
    fn stats_link_uses_short_url_path() {
        assert_eq!(
            stats_link(DEFAULT_CUTTLY_STATS_BASE, "https://cutt.ly/aB3dE", None),
            "https://cutt.ly/aB3dE/stats"
        );
        assert_eq!(
            stats_link("https://cutt.ly/", "not a url", None),
            "https://cutt.ly//stats"
        );
    }
}
