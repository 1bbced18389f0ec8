use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the stderr subscriber. `RUST_LOG` wins over `filter`; with
/// neither set the level is `info`.
pub fn init_logging(filter: Option<&str>) {
    let env_filter = match (std::env::var("RUST_LOG").is_ok(), filter) {
        (true, _) => EnvFilter::from_default_env(),
        (false, Some(f)) => EnvFilter::new(f),
        (false, None) => EnvFilter::new("info"),
    };

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(std::env::var_os("NO_COLOR").is_none()),
        )
        .with(env_filter)
        .try_init();
}
