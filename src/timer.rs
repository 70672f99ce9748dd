use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use notifier::Notifier;

/// Repeating background message sender. The original plugin's poller
/// had no way to stop short of unloading the plugin; this handle keeps
/// a stop flag so the host can cancel it cleanly.
pub struct MessageTimer {
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl MessageTimer {
    /// Spawns a thread that sends `message` through the notifier every
    /// `interval` until canceled.
    pub fn start(interval: Duration, notifier: Arc<Notifier>, message: &str) -> MessageTimer {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let text = message.to_string();

        let handle = thread::spawn(move || {
            while sleep_unless_stopped(interval, &thread_stop) {
                info!("Message timer fired: {}", text);
                notifier.notify(&text);
            }
        });

        MessageTimer {
            stop: stop,
            handle: Some(handle),
        }
    }

    /// Stops the timer and waits for the thread to finish its current
    /// tick.
    pub fn cancel(mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Sleeps for `interval` in short slices, bailing out early when the
/// stop flag flips. Returns false once stopped so the timer loop ends
/// promptly instead of after a full interval.
fn sleep_unless_stopped(interval: Duration, stop: &AtomicBool) -> bool {
    let slice = Duration::from_millis(10);
    let mut slept = Duration::from_millis(0);
    while slept < interval {
        if stop.load(Ordering::SeqCst) {
            return false;
        }
        let remaining = interval - slept;
        let nap = if remaining < slice { remaining } else { slice };
        thread::sleep(nap);
        slept += nap;
    }
    !stop.load(Ordering::SeqCst)
}

impl Drop for MessageTimer {
    fn drop(&mut self) {
        // Let the thread wind down on its own if cancel() was skipped.
        self.stop.store(true, Ordering::SeqCst);
    }
}
