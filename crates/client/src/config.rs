use quietfinder_core::wire::{API_PREFIX, FEED_PATH};

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base HTTP URL of the API server, without a trailing slash.
    pub api_url: String,
    /// Full WebSocket URL of the live feed.
    pub ws_url: String,
}

impl ClientConfig {
    /// Build a config for `api_url`, deriving the feed URL from it.
    pub fn new(api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        let ws_url = derive_ws_url(&api_url);
        Self { api_url, ws_url }
    }

    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var               | Default                          |
    /// |-----------------------|----------------------------------|
    /// | `QUIETFINDER_API_URL` | `http://localhost:3000`          |
    /// | `QUIETFINDER_WS_URL`  | API URL with `ws(s)://` scheme + `/api/v1/ws` |
    pub fn from_env() -> Self {
        let api_url = std::env::var("QUIETFINDER_API_URL")
            .unwrap_or_else(|_| "http://localhost:3000".into());
        let mut config = Self::new(api_url);
        if let Ok(ws_url) = std::env::var("QUIETFINDER_WS_URL") {
            config.ws_url = ws_url;
        }
        config
    }
}

/// Map `http(s)://host` to `ws(s)://host/api/v1/ws`.
pub fn derive_ws_url(api_url: &str) -> String {
    let base = if let Some(rest) = api_url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = api_url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        api_url.to_string()
    };
    format!("{}{API_PREFIX}{FEED_PATH}", base.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_maps_to_ws() {
        assert_eq!(
            derive_ws_url("http://localhost:3000"),
            "ws://localhost:3000/api/v1/ws"
        );
    }

    #[test]
    fn https_maps_to_wss() {
        assert_eq!(
            derive_ws_url("https://spots.example.org"),
            "wss://spots.example.org/api/v1/ws"
        );
    }

    #[test]
    fn trailing_slash_is_dropped() {
        let config = ClientConfig::new("http://127.0.0.1:8080/");
        assert_eq!(config.api_url, "http://127.0.0.1:8080");
        assert_eq!(config.ws_url, "ws://127.0.0.1:8080/api/v1/ws");
    }
}
