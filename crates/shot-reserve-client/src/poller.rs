//! Fixed-interval refresh of a shared [`PublicView`]

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{bounded, tick, Sender};
use crossbeam::select;
use parking_lot::Mutex;
use tracing::debug;

use crate::{Backend, PublicView};

/// Refresh period of the public page
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Background thread refreshing a view once at start and then every interval
///
/// Polling is not coordinated with claims; it only makes the displayed state
/// converge to the backend eventually.
pub struct Poller {
    shutdown: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl Poller {
    /// Start polling `view` every `interval`
    pub fn spawn<B>(view: Arc<Mutex<PublicView<B>>>, interval: Duration) -> io::Result<Self>
    where
        B: Backend + Send + 'static,
    {
        let (shutdown, shutdown_receiver) = bounded::<()>(1);
        let thread = thread::Builder::new()
            .name(String::from("poller"))
            .spawn(move || {
                view.lock().refresh();
                let ticker = tick(interval);
                loop {
                    select! {
                        recv(ticker) -> _ => {
                            debug!("polling public state");
                            view.lock().refresh();
                        }
                        // a message or a dropped sender both mean stop
                        recv(shutdown_receiver) -> _ => break,
                    }
                }
            })?;
        Ok(Self {
            shutdown: Some(shutdown),
            thread: Some(thread),
        })
    }

    /// Stop polling and wait for the thread to exit
    pub fn stop(mut self) {
        self.halt();
    }

    fn halt(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.halt();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use shot_reserve_core::{EventSettings, RequestKind};
    use uuid::Uuid;

    use super::*;
    use crate::ClientError;

    #[derive(Default)]
    struct Recording {
        settings_reads: AtomicUsize,
    }

    impl Backend for Recording {
        fn send(&self, kind: RequestKind, _: Option<Uuid>, _: Option<String>) -> Result<String, ClientError> {
            match kind {
                RequestKind::GetSettings => {
                    self.settings_reads.fetch_add(1, Ordering::SeqCst);
                    Ok(serde_json::to_string(&EventSettings::default())?)
                }
                RequestKind::GetInventory => Ok(String::from("[]")),
                _ => Err(ClientError::Transport(String::from("unexpected"))),
            }
        }
    }

    #[test]
    fn polls_immediately_and_on_every_tick() {
        let backend = Arc::new(Recording::default());
        let view = Arc::new(Mutex::new(PublicView::new(backend.clone())));

        let poller = Poller::spawn(view, Duration::from_millis(20)).unwrap();
        thread::sleep(Duration::from_millis(150));
        poller.stop();

        let reads = backend.settings_reads.load(Ordering::SeqCst);
        assert!(reads >= 3, "expected several refreshes, got {reads}");

        // no refreshes after stop
        thread::sleep(Duration::from_millis(60));
        assert_eq!(backend.settings_reads.load(Ordering::SeqCst), reads);
    }
}
