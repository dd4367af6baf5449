//! HTTP proxy selection.

use serde::{Deserialize, Serialize};
use url::Url;

/// Proxy settings for HTTP(S) remotes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Proxy for `http://` remotes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_proxy: Option<String>,

    /// Proxy for `https://` remotes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub https_proxy: Option<String>,

    /// Comma-separated hosts that bypass the proxy.
    ///
    /// Entries match an exact host, a domain suffix (`example.com` or
    /// `.example.com`), a `host:port` pair, or `*` for every host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_proxy: Option<String>,
}

impl ProxyConfig {
    /// Returns the proxy to use for `url`, if any.
    pub fn proxy_for(&self, url: &Url) -> Option<&str> {
        let proxy = match url.scheme() {
            "https" => self.https_proxy.as_deref(),
            "http" => self.http_proxy.as_deref(),
            _ => None,
        }
        .filter(|proxy| !proxy.is_empty())?;

        let host = url.host_str()?;
        if self.bypasses(host, url.port_or_known_default()) {
            return None;
        }
        Some(proxy)
    }

    fn bypasses(&self, host: &str, port: Option<u16>) -> bool {
        let Some(no_proxy) = self.no_proxy.as_deref() else {
            return false;
        };
        let host = host.to_ascii_lowercase();

        no_proxy
            .split(',')
            .map(|entry| entry.trim().to_ascii_lowercase())
            .filter(|entry| !entry.is_empty())
            .any(|entry| {
                if entry == "*" {
                    return true;
                }

                let (name, entry_port) = match entry.rsplit_once(':') {
                    Some((name, p)) => match p.parse::<u16>() {
                        Ok(p) => (name.to_string(), Some(p)),
                        Err(_) => (entry.clone(), None),
                    },
                    None => (entry.clone(), None),
                };
                if entry_port.is_some() && entry_port != port {
                    return false;
                }

                let name = name.trim_start_matches('.');
                host == name || host.ends_with(&format!(".{}", name))
            })
    }
}
