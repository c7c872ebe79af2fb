use {std::time::Duration, tokio::sync::mpsc};

/// Forwards the latest value once no new value arrived for `delay`. Every
/// incoming value restarts the wait. A pending value is flushed right away
/// when the input closes.
pub fn debounce<T: Send + 'static>(
    mut input: mpsc::UnboundedReceiver<T>,
    delay: Duration,
) -> mpsc::UnboundedReceiver<T> {
    let (output, receiver) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Some(mut latest) = input.recv().await {
            let closed = loop {
                tokio::select! {
                    next = input.recv() => match next {
                        Some(next) => latest = next,
                        None => break true,
                    },
                    () = tokio::time::sleep(delay) => break false,
                }
            };
            if output.send(latest).is_err() || closed {
                return;
            }
        }
    });
    receiver
}
