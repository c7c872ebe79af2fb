/// Logs panics through `tracing` so they end up in the same (possibly JSON)
/// stream as every other event.
pub fn tracing_panic_hook(panic: &std::panic::PanicHookInfo) {
    let thread = std::thread::current();
    let name = thread.name().unwrap_or("<unnamed>");
    let backtrace = std::backtrace::Backtrace::force_capture();
    tracing::error!("thread '{name}' {panic}\nstack backtrace:\n{backtrace}");
}
