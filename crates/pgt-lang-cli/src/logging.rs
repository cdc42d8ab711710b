//! Diagnostics for `lang`. The listing goes to stdout; log records go to
//! stderr, so piping the output of `lang --json` stays valid JSON.

use std::sync::Once;

/// What `lang` logs.
///
/// `env_filter` comes from `--log-level` and uses `env_logger` filter syntax,
/// so `--log-level pgt_lang=trace` shows every classified source line.
/// Without the flag `RUST_LOG` applies, and without that only warnings.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

/// `--log-level` first, then `RUST_LOG`.
fn filter_spec(flag: Option<String>, env: Option<String>) -> Option<String> {
    flag.or(env).filter(|spec| !spec.trim().is_empty())
}

static INIT: Once = Once::new();

/// Install the logger for this run of `lang`. Only the first call counts.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        match filter_spec(config.env_filter, std::env::var("RUST_LOG").ok()) {
            Some(spec) => {
                builder.parse_filters(&spec);
            }
            None => {
                builder.filter_level(log::LevelFilter::Warn);
            }
        }

        builder.write_style(config.write_style);
        builder.target(env_logger::Target::Stderr);
        builder.init();

        log::debug!("lang {} logging to stderr", env!("CARGO_PKG_VERSION"));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_wins_over_environment() {
        let spec = filter_spec(Some("debug".into()), Some("trace".into()));
        assert_eq!(spec.as_deref(), Some("debug"));
    }

    #[test]
    fn environment_is_the_fallback() {
        assert_eq!(filter_spec(None, Some("pgt_lang=trace".into())).as_deref(), Some("pgt_lang=trace"));
        assert_eq!(filter_spec(None, None), None);
        assert_eq!(filter_spec(Some("  ".into()), None), None);
    }
}
