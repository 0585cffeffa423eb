//! Loading and notification signals raised by the client.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A transient message for the person driving the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    /// How long a front end should keep the notice visible.
    pub display_for: Duration,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            display_for: Duration::from_secs(5),
        }
    }

    /// Final failure of a call. Errors stay up longer than other notices.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            display_for: Duration::from_secs(8),
            ..Self::new(NoticeLevel::Error, message)
        }
    }
}

/// Receives the signals a call raises.
///
/// `loading_started` and `loading_finished` are paired exactly once per
/// logical call. `notify` is raised once when a call fails for good.
pub trait CallObserver: Send + Sync {
    fn loading_started(&self, action: &str);

    fn loading_finished(&self, action: &str);

    fn notify(&self, notice: &Notice);
}

/// Observer that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl CallObserver for TracingObserver {
    fn loading_started(&self, action: &str) {
        debug!(action, "loading started");
    }

    fn loading_finished(&self, action: &str) {
        debug!(action, "loading finished");
    }

    fn notify(&self, notice: &Notice) {
        match notice.level {
            NoticeLevel::Error => error!(message = %notice.message, "call failed"),
            NoticeLevel::Warning => warn!(message = %notice.message, "notice"),
            NoticeLevel::Info | NoticeLevel::Success => info!(message = %notice.message, "notice"),
        }
    }
}

/// Shared loading flag for a single-indicator front end.
///
/// Tracks how many calls are in flight, so the flag stays up until the last
/// concurrent call finishes. The most recent failure notice is published too.
#[derive(Debug, Clone)]
pub struct LoadingIndicator {
    in_flight: Arc<AtomicUsize>,
    loading: Arc<watch::Sender<bool>>,
    notices: Arc<watch::Sender<Option<Notice>>>,
}

impl Default for LoadingIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadingIndicator {
    pub fn new() -> Self {
        let (loading, _) = watch::channel(false);
        let (notices, _) = watch::channel(None);
        Self {
            in_flight: Arc::new(AtomicUsize::new(0)),
            loading: Arc::new(loading),
            notices: Arc::new(notices),
        }
    }

    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Watch the loading flag.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    /// Watch failure notices.
    pub fn subscribe_notices(&self) -> watch::Receiver<Option<Notice>> {
        self.notices.subscribe()
    }

    pub fn last_notice(&self) -> Option<Notice> {
        self.notices.borrow().clone()
    }
}

impl CallObserver for LoadingIndicator {
    // The counter is only touched inside `send_modify`, which holds the watch
    // lock, so the flag always agrees with the count.
    fn loading_started(&self, action: &str) {
        self.loading.send_modify(|loading| {
            let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            debug!(action, in_flight, "loading started");
            *loading = true;
        });
    }

    fn loading_finished(&self, action: &str) {
        self.loading.send_modify(|loading| {
            let in_flight = self
                .in_flight
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .map_or(0, |previous| previous - 1);
            debug!(action, in_flight, "loading finished");
            *loading = in_flight > 0;
        });
    }

    fn notify(&self, notice: &Notice) {
        TracingObserver.notify(notice);
        self.notices.send_replace(Some(notice.clone()));
    }
}

/// Ends the loading signal when dropped.
///
/// Holding one of these for the duration of a call pairs every
/// `loading_started` with exactly one `loading_finished`, whichever way the
/// call exits.
pub(crate) struct LoadingGuard<'a> {
    observer: &'a dyn CallObserver,
    action: &'a str,
}

impl<'a> LoadingGuard<'a> {
    pub(crate) fn start(observer: &'a dyn CallObserver, action: &'a str) -> Self {
        observer.loading_started(action);
        Self { observer, action }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.observer.loading_finished(self.action);
    }
}
