//! Connection endpoint resolution (§3, §4.5.5, §6).

use std::path::PathBuf;

/// Either a TCP `(host, port)` pair or a local Unix-domain socket path. A
/// host string beginning with `/` selects the Unix form and suppresses the
/// port (§6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Tcp { host: String, port: u16 },
    Unix(PathBuf),
}

impl Endpoint {
    /// Builds an endpoint from an explicit host/port pair, applying the
    /// leading-`/` rule.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        let host = host.into();
        if host.starts_with('/') {
            Self::Unix(PathBuf::from(host))
        } else {
            Self::Tcp { host, port }
        }
    }

    /// Resolves the default endpoint from the process environment (§4.5.5):
    /// `MPD_HOST` (default `"localhost"`), and — only for TCP hosts —
    /// `MPD_PORT` (default `6600`).
    pub fn from_env() -> Self {
        let host = std::env::var("MPD_HOST").unwrap_or_else(|_| "localhost".to_string());
        if host.starts_with('/') {
            return Self::Unix(PathBuf::from(host));
        }
        let port = std::env::var("MPD_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        Self::Tcp { host, port }
    }
}

/// MPD's well-known default port (§6).
pub const DEFAULT_PORT: u16 = 6600;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // MPD_HOST/MPD_PORT are process-global; serialize the tests that touch
    // them so they don't interleave.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn leading_slash_selects_unix() {
        let e = Endpoint::new("/run/mpd/socket", 6600);
        assert_eq!(e, Endpoint::Unix(PathBuf::from("/run/mpd/socket")));
    }

    #[test]
    fn plain_host_selects_tcp() {
        let e = Endpoint::new("example.org", 7700);
        assert_eq!(
            e,
            Endpoint::Tcp {
                host: "example.org".to_string(),
                port: 7700
            }
        );
    }

    #[test]
    fn env_defaults_to_localhost_6600() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::remove_var("MPD_HOST");
        std::env::remove_var("MPD_PORT");
        assert_eq!(
            Endpoint::from_env(),
            Endpoint::Tcp {
                host: "localhost".to_string(),
                port: DEFAULT_PORT
            }
        );
    }

    #[test]
    fn env_overrides_host_and_port() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("MPD_HOST", "mpd.example.org");
        std::env::set_var("MPD_PORT", "6601");
        assert_eq!(
            Endpoint::from_env(),
            Endpoint::Tcp {
                host: "mpd.example.org".to_string(),
                port: 6601
            }
        );
        std::env::remove_var("MPD_HOST");
        std::env::remove_var("MPD_PORT");
    }

    #[test]
    fn unix_host_ignores_port_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("MPD_HOST", "/run/mpd/socket");
        std::env::set_var("MPD_PORT", "9999");
        assert_eq!(
            Endpoint::from_env(),
            Endpoint::Unix(PathBuf::from("/run/mpd/socket"))
        );
        std::env::remove_var("MPD_HOST");
        std::env::remove_var("MPD_PORT");
    }
}
