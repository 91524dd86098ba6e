use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install structured JSON logging on stdout.
///
/// `RUST_LOG` controls the filter, `default_filter` applies when it is unset.
/// Calling this twice is harmless: the second install is ignored.
pub fn init_telemetry(default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let formatting_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .json();

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(formatting_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_telemetry_can_be_initialised_twice() {
        init_telemetry("debug");
        init_telemetry("info");
        tracing::info!("telemetry initialised");
    }
}
