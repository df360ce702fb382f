use serde::{Deserialize, Serialize};

/// Reverse-proxy style mapping from a dashboard path prefix to an upstream.
///
/// A path under `prefix` resolves to `upstream + rewrite + rest`, so an empty
/// `rewrite` strips the prefix entirely.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyRoute {
    pub prefix: String,
    pub upstream: String,
    #[serde(default)]
    pub rewrite: String,
}

impl ProxyRoute {
    pub fn new(prefix: &str, upstream: &str, rewrite: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            upstream: upstream.to_string(),
            rewrite: rewrite.to_string(),
        }
    }

    /// Map a dashboard path onto the upstream; paths outside the prefix don't resolve
    pub fn resolve(&self, path: &str) -> Option<String> {
        let rest = path.strip_prefix(self.prefix.as_str())?;
        if !(rest.is_empty() || rest.starts_with('/') || rest.starts_with('?')) {
            return None;
        }
        Some(format!(
            "{}{}{}",
            self.upstream.trim_end_matches('/'),
            self.rewrite.trim_end_matches('/'),
            rest
        ))
    }

    /// Upstream URL that the prefix itself maps to
    pub fn base_url(&self) -> String {
        format!(
            "{}{}",
            self.upstream.trim_end_matches('/'),
            self.rewrite.trim_end_matches('/')
        )
    }
}

/// The three backend routes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Routes {
    pub robot: ProxyRoute,
    pub metrics: ProxyRoute,
    pub logs: ProxyRoute,
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            robot: ProxyRoute::new("/api/robot", "http://robot.local", ""),
            metrics: ProxyRoute::new("/api/prometheus", "http://localhost:9090", ""),
            logs: ProxyRoute::new("/api/loki", "http://localhost:3100", "/loki/api/v1"),
        }
    }
}
