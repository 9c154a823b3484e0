//! Tracing setup for the `nsdk` binary.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// Environment variable holding the log level or filter spec.
pub const LOG_ENV_VAR: &str = "NSDK_LOG";

/// Crates whose events are shown by default.
const NSDK_TARGETS: [&str; 4] = ["nsdk_common", "nsdk_core", "nsdk_codegen", "nsdk_cli"];

/// Install the global fmt subscriber.
///
/// `NSDK_LOG` controls the level: "trace", "debug", "info", "warn", "error"
/// or a full tracing filter spec like "nsdk_core=debug,nsdk_cli=warn".
/// `verbose` lowers the default level to `debug` when `NSDK_LOG` is unset.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = build_filter(std::env::var(LOG_ENV_VAR).ok().as_deref(), default_level);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn build_filter(env_value: Option<&str>, default_level: &str) -> String {
    match env_value {
        Some(level) if is_plain_level(level) => targets_at(level),
        Some(spec) if !spec.trim().is_empty() => spec.to_string(),
        _ => targets_at(default_level),
    }
}

fn targets_at(level: &str) -> String {
    NSDK_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_level_applies_to_every_crate() {
        let filter = build_filter(Some("warn"), "info");
        assert_eq!(
            filter,
            "nsdk_common=warn,nsdk_core=warn,nsdk_codegen=warn,nsdk_cli=warn"
        );
    }

    #[test]
    fn full_spec_is_kept_verbatim() {
        assert_eq!(
            build_filter(Some("nsdk_core=trace"), "info"),
            "nsdk_core=trace"
        );
    }

    #[test]
    fn missing_variable_uses_default_level() {
        assert!(build_filter(None, "debug").starts_with("nsdk_common=debug"));
        assert!(build_filter(Some("  "), "info").contains("nsdk_cli=info"));
    }
}
