//! Route handlers: static files, statistics and the calculator

use crate::stats::StatsRegistry;
use bytes::Bytes;
use minnow_common::{StatsSnapshot, StaticFileConfig};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// What a handler produced for the connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `200 OK` with the given content type
    Content {
        content_type: &'static str,
        body: Bytes,
    },
    /// The fixed 404 literal
    NotFound,
}

impl Reply {
    fn html(body: String) -> Self {
        Reply::Content {
            content_type: "text/html",
            body: Bytes::from(body),
        }
    }
}

/// Read-only view of the static directory
#[derive(Debug, Clone)]
pub struct StaticRoot {
    root: PathBuf,
    contain_paths: bool,
}

impl StaticRoot {
    pub fn new(root: impl Into<PathBuf>, contain_paths: bool) -> Self {
        Self {
            root: root.into(),
            contain_paths,
        }
    }

    pub fn from_config(config: &StaticFileConfig) -> Self {
        Self::new(&config.root, config.contain_paths)
    }

    /// Join an asset path under the root.
    ///
    /// The path is not canonicalized, so `..` segments can leave the root
    /// unless `contain_paths` is set, in which case they resolve to nothing.
    pub fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));

        let escapes = |c: Component<'_>| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        };
        if self.contain_paths && relative.components().any(escapes) {
            return None;
        }

        Some(self.root.join(relative))
    }

    pub async fn read(&self, path: &str) -> Option<Vec<u8>> {
        let Some(full_path) = self.resolve(path) else {
            warn!("Rejected static path outside root: {}", path);
            return None;
        };

        match tokio::fs::read(&full_path).await {
            Ok(contents) => Some(contents),
            Err(e) => {
                debug!("Failed to read file {:?}: {}", full_path, e);
                None
            }
        }
    }
}

pub async fn serve_static(root: &StaticRoot, path: &str) -> Reply {
    match root.read(path).await {
        Some(contents) => Reply::Content {
            content_type: "application/octet-stream",
            body: Bytes::from(contents),
        },
        None => Reply::NotFound,
    }
}

pub async fn serve_stats(stats: &StatsRegistry) -> Reply {
    Reply::html(render_stats(&stats.snapshot().await))
}

pub fn render_stats(snapshot: &StatsSnapshot) -> String {
    format!(
        "<html><body><h1>Server Statistics</h1><p>Total requests: {}</p><p>Total \
         received bytes: {}</p><p>Total sent bytes: {}</p></body></html>",
        snapshot.total_requests, snapshot.bytes_received, snapshot.bytes_sent
    )
}

pub fn serve_calc(query: &str) -> Reply {
    let a = parse_query_param(query, "a");
    let b = parse_query_param(query, "b");
    let sum = a.wrapping_add(b);

    Reply::html(format!(
        "<html><body><h1>Calculation Result</h1><p>{} + {} = {}</p></body></html>",
        a, b, sum
    ))
}

/// Value of `key` in `query`, found by first-occurrence substring search.
///
/// The value starts one character past the key and is read up to the first
/// non-digit. A missing key or missing digits give 0.
pub fn parse_query_param(query: &str, key: &str) -> i32 {
    match query.find(key) {
        Some(start) => query
            .get(start + key.len() + 1..)
            .map(parse_leading_int)
            .unwrap_or(0),
        None => 0,
    }
}

fn parse_leading_int(s: &str) -> i32 {
    let s = s.trim_start_matches(|c: char| c.is_ascii_whitespace());
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i32, |acc, d| {
            acc.wrapping_mul(10).wrapping_add(i32::from(d - b'0'))
        });

    if negative {
        value.wrapping_neg()
    } else {
        value
    }
}
