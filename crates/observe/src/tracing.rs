use {
    std::sync::Once,
    time::macros::format_description,
    tracing::Level,
    tracing_subscriber::{
        EnvFilter,
        fmt::{time::UtcTime, writer::MakeWriterExt as _},
        prelude::*,
    },
};

/// Initializes the global tracing subscriber.
///
/// Events at or above `stderr_threshold` go to stderr, everything else to
/// stdout. Panics are routed through tracing as well.
///
/// Must only be called once per process.
pub fn initialize(env_filter: &str, stderr_threshold: Level, use_json: bool) {
    set_tracing_subscriber(env_filter, stderr_threshold, use_json);
    std::panic::set_hook(Box::new(crate::panic_hook::tracing_panic_hook));
}

/// Like [`initialize`] but may be called any number of times, only the first
/// call has an effect. Meant for tests.
pub fn initialize_reentrant(env_filter: &str) {
    static ONCE: Once = Once::new();
    ONCE.call_once(|| set_tracing_subscriber(env_filter, Level::ERROR, false));
}

fn set_tracing_subscriber(env_filter: &str, stderr_threshold: Level, use_json: bool) {
    let timer = UtcTime::new(format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
    ));
    let writer = std::io::stderr
        .with_max_level(stderr_threshold)
        .or_else(std::io::stdout);
    let layer = tracing_subscriber::fmt::layer()
        .with_timer(timer)
        .with_ansi(atty::is(atty::Stream::Stdout))
        .with_writer(writer);
    let filter = EnvFilter::new(env_filter);

    let result = if use_json {
        tracing_subscriber::registry()
            .with(layer.json().with_filter(filter))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(layer.with_filter(filter))
            .try_init()
    };
    if let Err(err) = result {
        eprintln!("tracing subscriber already initialized: {err}");
    }
}
