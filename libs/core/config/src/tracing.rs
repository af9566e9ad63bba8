use crate::Environment;
use tracing::{debug, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Install color-eyre with a project-standard configuration.
///
/// Call this first in `main()` so startup failures (bad config, MongoDB
/// unreachable) are reported with location and span trace. Safe to call
/// multiple times.
///
/// Configuration:
/// - Shows file:line where errors occur
/// - Hides environment variables (less noise)
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Initialize tracing with environment-aware configuration and error span capture.
///
/// Sets up a `tracing-subscriber` registry with an `ErrorLayer` so errors
/// reported through color-eyre carry the active span trace.
///
/// - **Production** (`APP_ENV=production`): flattened JSON events for log
///   aggregation, default level `info`.
/// - **Development** (default): pretty-printed events, default level `debug`
///   with `tower_http` request spans.
///
/// `RUST_LOG` overrides the default filter (e.g. `RUST_LOG=domain_todos=trace`).
///
/// Safe to call more than once. Later calls leave the first subscriber in
/// place, which keeps tests that share a process quiet.
///
/// # Example
///
/// ```ignore
/// use core_config::{tracing::{init_tracing, install_color_eyre}, Environment};
///
/// install_color_eyre();
/// init_tracing(&Environment::from_env());
/// ```
pub fn init_tracing(environment: &Environment) {
    let is_production = environment.is_production();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if is_production {
            EnvFilter::new("info,mongodb=warn")
        } else {
            EnvFilter::new("debug,tower_http=debug,mongodb=info,hyper=info")
        }
    });

    let result = if is_production {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .flatten_event(true),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false)
                    .pretty(),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    };

    match result {
        Ok(_) => {
            info!(
                "Tracing initialized with ErrorLayer. Environment: {:?}",
                environment
            );
        }
        Err(_) => {
            debug!("Tracing already initialized, skipping re-initialization");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_development() {
        let env = Environment::Development;
        // Should not panic
        init_tracing(&env);
    }

    #[test]
    fn test_init_tracing_production() {
        let env = Environment::Production;
        // Should not panic
        init_tracing(&env);
    }

    #[test]
    fn test_init_tracing_multiple_calls() {
        // Should not panic when called multiple times
        let env = Environment::Development;
        init_tracing(&env);
        init_tracing(&env);
    }

    #[test]
    fn test_init_tracing_with_rust_log_env() {
        temp_env::with_var("RUST_LOG", Some("trace"), || {
            let env = Environment::Development;
            // Should not panic
            init_tracing(&env);
        });
    }

    #[test]
    fn test_init_tracing_production_with_custom_log_level() {
        temp_env::with_var("RUST_LOG", Some("warn"), || {
            let env = Environment::Production;
            // Should not panic
            init_tracing(&env);
        });
    }
}
