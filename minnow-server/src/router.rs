//! Request-line triage

const STATIC_PREFIX: &str = "GET /static/";
const STATS_PREFIX: &str = "GET /stats";
const CALC_PREFIX: &str = "GET /calc?";

/// Handler selected for a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Asset path with the leading `/static` removed
    StaticAsset(String),
    Stats,
    /// Everything after the first `?`, up to the end of the request text
    Calc(String),
    Unknown,
}

/// Match the raw request against the route prefixes, in priority order.
///
/// This is a prefix scan over the request text, not a URL parser. The text
/// ends at the first NUL byte, if any.
pub fn route(request: &[u8]) -> Route {
    let end = request.iter().position(|&b| b == 0).unwrap_or(request.len());
    let text = String::from_utf8_lossy(&request[..end]);

    if text.starts_with(STATIC_PREFIX) {
        let target = text["GET ".len()..]
            .split_whitespace()
            .next()
            .unwrap_or_default();
        let path = target.strip_prefix("/static").unwrap_or(target);
        Route::StaticAsset(path.to_string())
    } else if text.starts_with(STATS_PREFIX) {
        Route::Stats
    } else if text.starts_with(CALC_PREFIX) {
        let query = text
            .split_once('?')
            .map(|(_, query)| query)
            .unwrap_or_default();
        Route::Calc(query.to_string())
    } else {
        Route::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_route_strips_prefix() {
        assert_eq!(
            route(b"GET /static/hello.txt HTTP/1.1\r\nHost: x\r\n\r\n"),
            Route::StaticAsset("/hello.txt".to_string())
        );
        assert_eq!(
            route(b"GET /static/css/site.css HTTP/1.1"),
            Route::StaticAsset("/css/site.css".to_string())
        );
    }

    #[test]
    fn test_static_route_without_version() {
        assert_eq!(
            route(b"GET /static/a.bin"),
            Route::StaticAsset("/a.bin".to_string())
        );
        assert_eq!(route(b"GET /static/"), Route::StaticAsset("/".to_string()));
    }

    #[test]
    fn test_stats_is_a_prefix_match() {
        assert_eq!(route(b"GET /stats HTTP/1.1\r\n\r\n"), Route::Stats);
        assert_eq!(route(b"GET /statsfoo HTTP/1.1"), Route::Stats);
    }

    #[test]
    fn test_static_wins_over_stats() {
        // "GET /stat" is shared; the static prefix is checked first
        assert!(matches!(
            route(b"GET /static/stats HTTP/1.1"),
            Route::StaticAsset(_)
        ));
    }

    #[test]
    fn test_calc_query_runs_to_end_of_buffer() {
        assert_eq!(
            route(b"GET /calc?a=3&b=4 HTTP/1.1\r\nHost: localhost\r\n\r\n"),
            Route::Calc("a=3&b=4 HTTP/1.1\r\nHost: localhost\r\n\r\n".to_string())
        );
        assert_eq!(route(b"GET /calc?"), Route::Calc(String::new()));
    }

    #[test]
    fn test_request_ends_at_nul() {
        assert_eq!(
            route(b"GET /calc?x\0a=5 HTTP/1.1"),
            Route::Calc("x".to_string())
        );
        assert_eq!(
            route(b"GET /static/a.txt\0.png HTTP/1.1"),
            Route::StaticAsset("/a.txt".to_string())
        );
        assert_eq!(route(b"\0GET /stats HTTP/1.1"), Route::Unknown);
    }

    #[test]
    fn test_unknown_routes() {
        assert_eq!(route(b"GET /unknown/path HTTP/1.1"), Route::Unknown);
        assert_eq!(route(b"GET /calc HTTP/1.1"), Route::Unknown);
        assert_eq!(route(b"POST /stats HTTP/1.1"), Route::Unknown);
        assert_eq!(route(b"get /stats HTTP/1.1"), Route::Unknown);
        assert_eq!(route(b""), Route::Unknown);
        assert_eq!(route(&[0xff, 0xfe, 0x00]), Route::Unknown);
    }
}
