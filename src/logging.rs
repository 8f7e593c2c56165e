use tracing_subscriber::EnvFilter;

const DEFAULT_LEVEL: &str = "info";
const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// True when `DEBUG` is set to a truthy value (`1`, `true`, `yes`)
pub fn debug_enabled() -> bool {
    std::env::var("DEBUG")
        .map(|v| is_truthy(&v))
        .unwrap_or(false)
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes")
}

/// Pick the log level from `LOG_LEVEL` and `DEBUG`. Unknown levels fall back
/// to `info`.
pub fn resolve_level(log_level: Option<&str>, debug: bool) -> &'static str {
    if debug {
        return "debug";
    }
    let requested = log_level.map(|l| l.trim().to_lowercase()).unwrap_or_default();
    LEVELS
        .iter()
        .copied()
        .find(|level| *level == requested || (requested == "warning" && *level == "warn"))
        .unwrap_or(DEFAULT_LEVEL)
}

/// Install the global stderr subscriber. Calling it again is a no-op.
pub fn setup_logging() {
    let level = resolve_level(std::env::var("LOG_LEVEL").ok().as_deref(), debug_enabled());

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_level() {
        assert_eq!(resolve_level(None, false), "info");
        assert_eq!(resolve_level(Some("DEBUG"), false), "debug");
        assert_eq!(resolve_level(Some("warning"), false), "warn");
        assert_eq!(resolve_level(Some("verbose"), false), "info");
        assert_eq!(resolve_level(Some("error"), true), "debug");
    }

    #[test]
    fn test_truthy_values() {
        for value in ["1", "true", "YES", " True "] {
            assert!(is_truthy(value), "{}", value);
        }
        for value in ["", "0", "false", "no"] {
            assert!(!is_truthy(value), "{}", value);
        }
    }

    #[test]
    fn test_setup_is_idempotent() {
        setup_logging();
        setup_logging();
    }
}
