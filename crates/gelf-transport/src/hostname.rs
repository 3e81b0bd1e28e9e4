//! Defaults for the `host` and `facility` fields.

use std::env;
use std::path::Path;

use tracing::warn;

/// Hostname reported in every message.
///
/// Tries, in order: the `HOSTNAME` environment variable, the system hostname,
/// then falls back to `"unknown"`.
#[must_use]
pub fn get_hostname() -> String {
    if let Ok(hostname) = env::var("HOSTNAME") {
        if !hostname.is_empty() {
            return hostname;
        }
    }

    #[cfg(unix)]
    match nix::unistd::gethostname() {
        Ok(hostname) => match hostname.into_string() {
            Ok(hostname) if !hostname.is_empty() => return hostname,
            Ok(_) => {}
            Err(raw) => warn!("Ignoring non-UTF-8 system hostname {:?}", raw),
        },
        Err(e) => warn!("Failed to get system hostname: {}", e),
    }

    warn!("Could not determine hostname, using 'unknown'");
    "unknown".to_string()
}

/// Base name of the running executable, used as the default facility.
#[must_use]
pub fn default_facility() -> String {
    env::args()
        .next()
        .as_deref()
        .and_then(|arg0| Path::new(arg0).file_name())
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| "gelf".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hostname_is_never_empty() {
        assert!(!get_hostname().is_empty());
    }

    #[test]
    fn facility_is_executable_base_name() {
        let facility = default_facility();
        assert!(!facility.is_empty());
        assert!(!facility.contains('/'));
    }
}
