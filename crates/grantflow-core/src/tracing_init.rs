//! Logging setup shared by the server and the scripted client.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Filter directive enabling `level` for each of `targets`, with everything
/// else (hyper, tower-http, reqwest) held at `warn`.
pub fn filter_directive(targets: &[&str], level: &str) -> String {
    std::iter::once("warn".to_string())
        .chain(targets.iter().map(|t| format!("{t}={level}")))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the directive built from `targets` and `level`.
/// Output goes to stderr: the client's stdout carries only scenario results.
pub fn init_tracing(targets: &[&str], level: &str, log_json: bool) {
    let directive =
        std::env::var("RUST_LOG").unwrap_or_else(|_| filter_directive(targets, level));
    let env_filter = tracing_subscriber::EnvFilter::new(directive);
    let registry = tracing_subscriber::registry().with(env_filter);
    if log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_lists_each_target() {
        assert_eq!(
            filter_directive(&["grantflow_server", "grantflow_core"], "debug"),
            "warn,grantflow_server=debug,grantflow_core=debug"
        );
    }

    #[test]
    fn directive_without_targets_is_warn_only() {
        assert_eq!(filter_directive(&[], "info"), "warn");
    }
}
