use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Interrupts a running solve after a time limit
///
/// A helper thread waits for the limit; stopping the helper before the limit cancels the
/// callback.
pub(crate) struct TimeoutHelper {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<bool>>,
}

impl TimeoutHelper {
    /// Start the helper; `on_timeout` runs on the helper thread once the limit is reached
    pub fn start<F>(limit: Duration, on_timeout: F) -> TimeoutHelper
    where
        F: FnOnce() + Send + 'static,
    {
        let (stop, rx) = mpsc::channel::<()>();
        let handle = thread::spawn(move || match rx.recv_timeout(limit) {
            Err(RecvTimeoutError::Timeout) => {
                on_timeout();
                true
            }
            _ => false,
        });
        TimeoutHelper {
            stop: Some(stop),
            handle: Some(handle),
        }
    }

    /// Stop the helper and return whether the limit was reached
    pub fn stop(mut self) -> bool {
        self.finish()
    }

    fn finish(&mut self) -> bool {
        // Dropping the sender wakes up the helper
        self.stop.take();
        match self.handle.take() {
            Some(h) => h.join().unwrap_or(false),
            None => false,
        }
    }
}

impl Drop for TimeoutHelper {
    fn drop(&mut self) {
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_expired() {
        let flag = Arc::new(AtomicBool::new(false));
        let f = flag.clone();
        let helper = TimeoutHelper::start(Duration::from_millis(1), move || {
            f.store(true, Ordering::SeqCst)
        });
        thread::sleep(Duration::from_millis(50));
        assert!(helper.stop());
        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn test_cancelled() {
        let flag = Arc::new(AtomicBool::new(false));
        let f = flag.clone();
        let helper = TimeoutHelper::start(Duration::from_secs(60), move || {
            f.store(true, Ordering::SeqCst)
        });
        assert!(!helper.stop());
        assert!(!flag.load(Ordering::SeqCst));
    }
}
