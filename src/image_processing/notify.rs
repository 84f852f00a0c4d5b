//! Listener registry for "image processed" events.
//!
//! Listeners are called in registration order on the UI context chosen by the
//! injected [`UiDispatcher`]. The batch waits until every listener has run
//! before the next file is converted. Delivery problems are logged and never
//! reach the batch driver.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, SyncSender};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::DispatchError;

/// Receives the source path of every successfully processed image
pub trait ImageProcessorListener: Send + Sync {
    fn processed_image(&self, path: &Path);
}

impl<F> ImageProcessorListener for F
where
    F: Fn(&Path) + Send + Sync,
{
    fn processed_image(&self, path: &Path) {
        self(path)
    }
}

/// Handle returned by [`ListenerRegistry::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Work shipped to the UI context
pub type UiJob = Box<dyn FnOnce() + Send + 'static>;

/// Runs a job on the designated UI context and blocks until it has run
pub trait UiDispatcher: Send + Sync {
    fn dispatch(&self, job: UiJob) -> Result<(), DispatchError>;
}

/// Runs jobs inline on the calling thread
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectDispatcher;

impl UiDispatcher for DirectDispatcher {
    fn dispatch(&self, job: UiJob) -> Result<(), DispatchError> {
        job();
        Ok(())
    }
}

struct Envelope {
    job: UiJob,
    done: SyncSender<()>,
}

/// Ships jobs to the thread that owns the matching [`UiJobQueue`]
pub struct ChannelDispatcher {
    sender: Sender<Envelope>,
    waker: Option<Box<dyn Fn() + Send + Sync>>,
}

/// UI-side end of a [`ChannelDispatcher`]
pub struct UiJobQueue {
    receiver: Receiver<Envelope>,
}

/// Create a dispatcher / queue pair for a UI event loop
pub fn ui_channel() -> (ChannelDispatcher, UiJobQueue) {
    let (sender, receiver) = mpsc::channel();
    (
        ChannelDispatcher {
            sender,
            waker: None,
        },
        UiJobQueue { receiver },
    )
}

impl ChannelDispatcher {
    /// Called after each job is queued, e.g. to request a repaint
    pub fn with_waker(mut self, waker: impl Fn() + Send + Sync + 'static) -> Self {
        self.waker = Some(Box::new(waker));
        self
    }
}

impl UiDispatcher for ChannelDispatcher {
    fn dispatch(&self, job: UiJob) -> Result<(), DispatchError> {
        let (done, finished) = mpsc::sync_channel(1);

        self.sender
            .send(Envelope { job, done })
            .map_err(|_| DispatchError::Unavailable)?;

        if let Some(waker) = &self.waker {
            waker();
        }

        finished.recv().map_err(|_| DispatchError::Abandoned)
    }
}

impl UiJobQueue {
    /// Run every queued job on the current thread; returns how many ran
    pub fn run_pending(&self) -> usize {
        let mut count = 0;
        while let Ok(envelope) = self.receiver.try_recv() {
            (envelope.job)();
            let _ = envelope.done.send(());
            count += 1;
        }
        count
    }
}

type Registered = (ListenerId, Arc<dyn ImageProcessorListener>);

/// Ordered, non-deduplicated set of listeners plus the dispatcher used to reach them
pub struct ListenerRegistry {
    next_id: AtomicU64,
    listeners: Mutex<Vec<Registered>>,
    dispatcher: Arc<dyn UiDispatcher>,
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new(Arc::new(DirectDispatcher))
    }
}

impl ListenerRegistry {
    pub fn new(dispatcher: Arc<dyn UiDispatcher>) -> Self {
        Self {
            next_id: AtomicU64::new(0),
            listeners: Mutex::new(Vec::new()),
            dispatcher,
        }
    }

    pub fn set_dispatcher(&mut self, dispatcher: Arc<dyn UiDispatcher>) {
        self.dispatcher = dispatcher;
    }

    pub fn subscribe(&self, listener: impl ImageProcessorListener + 'static) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push((id, Arc::new(listener)));
        id
    }

    /// Returns false if the id was not registered
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.lock();
        match listeners.iter().position(|(registered, _)| *registered == id) {
            Some(index) => {
                listeners.remove(index);
                true
            }
            None => false,
        }
    }

    /// Deliver `path` to every listener registered right now
    pub fn notify(&self, path: &Path) {
        let snapshot: Vec<Arc<dyn ImageProcessorListener>> =
            self.lock().iter().map(|(_, listener)| Arc::clone(listener)).collect();
        if snapshot.is_empty() {
            return;
        }

        let path = path.to_path_buf();
        let job: UiJob = Box::new(move || deliver(&snapshot, &path));

        if let Err(e) = self.dispatcher.dispatch(job) {
            tracing::warn!(error = %e, "Error while invoking listeners");
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Registered>> {
        // Listeners never run under the lock, so a poisoned list is still consistent
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn deliver(listeners: &[Arc<dyn ImageProcessorListener>], path: &Path) {
    for listener in listeners {
        let outcome = catch_unwind(AssertUnwindSafe(|| listener.processed_image(path)));
        if outcome.is_err() {
            tracing::error!(path = %path.display(), "listener panicked while handling processed image");
        }
    }
}
