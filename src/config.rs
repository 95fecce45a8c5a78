use std::env;
use std::path::PathBuf;

/// Default `RPN_LOG` filter
pub(crate) const DEFAULT_LOG_FILTER: &str = "warn";

/// Startup settings, read once from the environment
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Config {
    /// RPN_TRACE=1: print each token and the stack after it
    pub(crate) trace: bool,
    /// RPN_BANNER=0 hides the interactive banner
    pub(crate) banner: bool,
    /// RPN_RC, else ~/.rpnrc
    pub(crate) rc_path: Option<PathBuf>,
    /// ~/.rpn_history
    pub(crate) history_path: Option<PathBuf>,
}

impl Config {
    pub(crate) fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build from any variable source
    pub(crate) fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let home = var("HOME").map(PathBuf::from);
        let rc_path = var("RPN_RC")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .or_else(|| home.as_ref().map(|h| h.join(".rpnrc")));

        Config {
            trace: var("RPN_TRACE").map(|v| is_enabled(&v)).unwrap_or(false),
            banner: var("RPN_BANNER").map(|v| is_enabled(&v)).unwrap_or(true),
            rc_path,
            history_path: home.map(|h| h.join(".rpn_history")),
        }
    }
}

fn is_enabled(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "0" | "false" | "no" | "off"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[("HOME", "/home/u")]);
        assert!(!cfg.trace);
        assert!(cfg.banner);
        assert_eq!(cfg.rc_path, Some(PathBuf::from("/home/u/.rpnrc")));
        assert_eq!(cfg.history_path, Some(PathBuf::from("/home/u/.rpn_history")));
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            ("HOME", "/home/u"),
            ("RPN_TRACE", "1"),
            ("RPN_BANNER", "0"),
            ("RPN_RC", "/tmp/custom.rc"),
        ]);
        assert!(cfg.trace);
        assert!(!cfg.banner);
        assert_eq!(cfg.rc_path, Some(PathBuf::from("/tmp/custom.rc")));
    }

    #[test]
    fn test_no_home() {
        let cfg = config(&[]);
        assert_eq!(cfg.rc_path, None);
        assert_eq!(cfg.history_path, None);
    }
}
