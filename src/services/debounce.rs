use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

/// How long the input has to stay quiet before a value settles.
pub const QUIET_PERIOD: Duration = Duration::from_millis(300);

/// Under continuous typing a value is forced out this long after the first
/// pending input, so the filter never starves.
pub const MAX_WAIT: Duration = Duration::from_millis(2000);

/// Coalesces rapid input into settled values.
///
/// The UI pushes every raw keystroke; `emit` receives the latest value once
/// [`QUIET_PERIOD`] passes without newer input, or [`MAX_WAIT`] after the
/// first pending input, whichever comes first.
pub struct Debouncer {
    tx: mpsc::UnboundedSender<String>,
}

impl Debouncer {
    pub fn new<F>(emit: F) -> Self
    where
        F: Fn(String) + Send + 'static,
    {
        Self::with_timing(QUIET_PERIOD, MAX_WAIT, emit)
    }

    pub fn with_timing<F>(quiet: Duration, max_wait: Duration, emit: F) -> Self
    where
        F: Fn(String) + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        relm4::spawn(debounce_loop(rx, quiet, max_wait, emit));
        Self { tx }
    }

    /// Feed one raw input value. Cheap; called on every keystroke.
    pub fn push(&self, value: impl Into<String>) {
        let _ = self.tx.send(value.into());
    }
}

async fn debounce_loop<F>(
    mut rx: mpsc::UnboundedReceiver<String>,
    quiet: Duration,
    max_wait: Duration,
    emit: F,
) where
    F: Fn(String) + Send + 'static,
{
    while let Some(first) = rx.recv().await {
        let mut latest = first;
        let window_end = Instant::now() + max_wait;
        loop {
            let deadline = (Instant::now() + quiet).min(window_end);
            tokio::select! {
                next = rx.recv() => match next {
                    Some(value) => latest = value,
                    None => {
                        emit(latest);
                        return;
                    }
                },
                _ = sleep_until(deadline) => break,
            }
        }
        emit(latest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(
        quiet: Duration,
        max_wait: Duration,
    ) -> (
        mpsc::UnboundedSender<String>,
        mpsc::UnboundedReceiver<(String, Instant)>,
    ) {
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        tokio::spawn(debounce_loop(in_rx, quiet, max_wait, move |value| {
            let _ = out_tx.send((value, Instant::now()));
        }));
        (in_tx, out_rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_settles_after_quiet_period() {
        let (tx, mut rx) = start(QUIET_PERIOD, MAX_WAIT);
        let begin = Instant::now();

        tx.send("n".to_string()).unwrap();
        tx.send("ne".to_string()).unwrap();
        tx.send("neural".to_string()).unwrap();

        let (value, at) = rx.recv().await.unwrap();
        assert_eq!(value, "neural");
        assert_eq!(at.duration_since(begin), QUIET_PERIOD);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_wait_bounds_continuous_typing() {
        let (tx, mut rx) = start(QUIET_PERIOD, MAX_WAIT);
        let begin = Instant::now();

        // keystrokes every 150 ms, each resetting the quiet window; the
        // outer sender stays alive so the channel does not flush early
        let typist = tx.clone();
        tokio::spawn(async move {
            for i in 0..13 {
                tokio::time::sleep(Duration::from_millis(150)).await;
                if typist.send(format!("q{i}")).is_err() {
                    return;
                }
            }
        });

        // first keystroke lands at 150 ms; the forced emission follows
        // MAX_WAIT later carrying whatever was typed by then
        let (value, at) = rx.recv().await.unwrap();
        assert_eq!(value, "q12");
        assert_eq!(at.duration_since(begin), Duration::from_millis(150) + MAX_WAIT);
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_each_settle() {
        let (tx, mut rx) = start(QUIET_PERIOD, MAX_WAIT);

        tx.send("first".to_string()).unwrap();
        let (value, _) = rx.recv().await.unwrap();
        assert_eq!(value, "first");

        tokio::time::sleep(Duration::from_millis(500)).await;
        tx.send("second".to_string()).unwrap();
        let (value, _) = rx.recv().await.unwrap();
        assert_eq!(value, "second");
    }
}
