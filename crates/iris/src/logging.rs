//! Logging setup: `tracing-subscriber` on stderr, pretty or JSON.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the logging subsystem.
///
/// Logs go to stderr; stdout carries the JSON results. `RUST_LOG` overrides
/// the level chosen here.
pub fn init(verbose: bool, json_format: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));
    let registry = tracing_subscriber::registry().with(filter);

    if json_format {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Our crates at the chosen level; HTTP internals stay at warn.
fn default_directives(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    format!("warn,iris={level},iris_core={level}")
}

/// Initialize logging from the `[logging]` config section.
///
/// `--verbose` and `--json-logs` win over the file.
pub fn init_from_config(
    config: &iris_core::Config,
    verbose_override: bool,
    json_logs_override: bool,
) {
    init(
        wants_debug(config, verbose_override),
        wants_json(config, json_logs_override),
    );
}

fn wants_debug(config: &iris_core::Config, verbose_override: bool) -> bool {
    let level = config.logging.level.to_ascii_lowercase();
    verbose_override || level == "debug" || level == "trace"
}

fn wants_json(config: &iris_core::Config, json_logs_override: bool) -> bool {
    json_logs_override || config.logging.format.eq_ignore_ascii_case("json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_level_and_format() {
        let mut config = iris_core::Config::default();
        assert!(!wants_debug(&config, false));
        assert!(!wants_json(&config, false));

        config.logging.level = "TRACE".to_string();
        config.logging.format = "json".to_string();
        assert!(wants_debug(&config, false));
        assert!(wants_json(&config, false));
    }

    #[test]
    fn test_default_directives() {
        assert_eq!(default_directives(true), "warn,iris=debug,iris_core=debug");
        assert!(default_directives(false).contains("iris_core=info"));
    }

    #[test]
    fn test_flags_override_config() {
        let config = iris_core::Config::default();
        assert!(wants_debug(&config, true));
        assert!(wants_json(&config, true));
    }
}
