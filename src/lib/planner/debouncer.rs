use std::time::Duration;

use tokio::task::AbortHandle;

/// Runs only the last of a burst of scheduled commits, once it has been
/// left alone for its delay.
#[derive(Default)]
pub struct Debouncer {
    pending: Option<AbortHandle>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels whatever is pending and runs `commit` after `delay` unless
    /// cancelled in turn. Must be called from within a tokio runtime.
    pub fn schedule<F>(&mut self, commit: F, delay: Duration) -> AbortHandle
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            commit();
        })
        .abort_handle();
        self.pending = Some(handle.clone());
        handle
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    const QUIET: Duration = Duration::from_millis(300);

    fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) -> Box<dyn FnOnce() + Send>) {
        let committed = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&committed);
        let make = move |value: &'static str| -> Box<dyn FnOnce() + Send> {
            let sink = Arc::clone(&sink);
            Box::new(move || sink.lock().unwrap().push(value))
        };
        (committed, make)
    }

    #[tokio::test(start_paused = true)]
    async fn only_last_value_of_a_burst_is_committed() {
        let (committed, make) = recorder();
        let mut debouncer = Debouncer::new();

        debouncer.schedule(make("a"), QUIET);
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.schedule(make("ab"), QUIET);
        tokio::time::sleep(Duration::from_millis(299)).await;
        assert!(committed.lock().unwrap().is_empty());
        debouncer.schedule(make("abc"), QUIET);

        tokio::time::sleep(Duration::from_millis(301)).await;
        assert_eq!(*committed.lock().unwrap(), vec!["abc"]);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn returned_handle_cancels_the_commit() {
        let (committed, make) = recorder();
        let mut debouncer = Debouncer::new();

        let handle = debouncer.schedule(make("typed"), QUIET);
        assert!(debouncer.is_pending());
        handle.abort();

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(committed.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_cancels_pending_commit() {
        let (committed, make) = recorder();
        {
            let mut debouncer = Debouncer::new();
            debouncer.schedule(make("gone"), QUIET);
        }
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(committed.lock().unwrap().is_empty());
    }
}
